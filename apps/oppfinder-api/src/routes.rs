use axum::{
	Json, Router,
	extract::{Path, Query, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use oppfinder_service::{
	AuthorBundle, DocumentHit, Error as ServiceError, Opportunity, OpportunityAuthorsRequest,
	Page, SearchAllRequest, SearchRequest, SearchResponse, UniqueFilters,
};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AuthorsResponse {
	pub authors: Vec<AuthorBundle>,
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/search/by-projects", post(search_by_projects))
		.route("/v1/search/by-authors", post(search_by_authors))
		.route("/v1/search/by-phrase", post(search_by_phrase))
		.route("/v1/search/all", get(search_all))
		.route("/v1/search/unique-filters", get(unique_filters))
		.route("/v1/search/by-opportunity", post(search_by_opportunity))
		.route("/v1/recommend/{id}", get(recommend))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search_by_projects(
	State(state): State<AppState>,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	let response = state.service.search_by_projects(payload).await?;

	Ok(Json(response))
}

async fn search_by_authors(
	State(state): State<AppState>,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	let response = state.service.search_by_authors(payload).await?;

	Ok(Json(response))
}

async fn search_by_phrase(
	State(state): State<AppState>,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	let response = state.service.search_by_phrase(payload).await?;

	Ok(Json(response))
}

async fn search_all(
	State(state): State<AppState>,
	Query(params): Query<SearchAllRequest>,
) -> Result<Json<Page<DocumentHit<Opportunity>>>, ApiError> {
	let response = state.service.search_all(params).await?;

	Ok(Json(response))
}

async fn unique_filters(State(state): State<AppState>) -> Result<Json<UniqueFilters>, ApiError> {
	let response = state.service.unique_filters().await?;

	Ok(Json(response))
}

async fn search_by_opportunity(
	State(state): State<AppState>,
	Json(payload): Json<OpportunityAuthorsRequest>,
) -> Result<Json<AuthorsResponse>, ApiError> {
	let authors = state.service.search_by_opportunity(payload).await?;

	Ok(Json(AuthorsResponse { authors }))
}

async fn recommend(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<SearchResponse>, ApiError> {
	let items = state.service.recommend_more_like_this(&id).await?;

	Ok(Json(SearchResponse { items }))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				json_error(StatusCode::BAD_REQUEST, "invalid_request", message),
			ServiceError::IndexQueryRejected { message } =>
				json_error(StatusCode::BAD_REQUEST, "index_query_rejected", message),
			ServiceError::NotFound { message } =>
				json_error(StatusCode::NOT_FOUND, "not_found", message),
			ServiceError::IndexUnavailable { message } =>
				json_error(StatusCode::SERVICE_UNAVAILABLE, "index_unavailable", message),
			ServiceError::Integrity { message } => {
				tracing::error!(error = %message, "Index and database are out of sync.");

				json_error(StatusCode::INTERNAL_SERVER_ERROR, "integrity_error", message)
			},
			ServiceError::Storage { message } => {
				tracing::error!(error = %message, "Storage request failed.");

				json_error(
					StatusCode::INTERNAL_SERVER_ERROR,
					"storage_error",
					"Internal storage error.",
				)
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}

fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
	ApiError::new(status, code, message)
}
