use futures::future;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use oppfinder_domain::{
	AggregateStrategy, HitGroup, IndexRequest, RankedAuthor, ScoredHit, rank_authors,
};
use oppfinder_storage::models::{Author, Project};

use crate::{
	Error, OppfinderService, Result,
	documents::{self, ProjectHit},
};

#[derive(Clone, Debug, Deserialize)]
pub struct OpportunityAuthorsRequest {
	pub document_id: String,
	#[serde(default)]
	pub max_results: Option<u32>,
	/// One of SUM, MAX, AVG, COUNT in any case. Absent means SUM.
	#[serde(default)]
	pub strategy: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AuthorView {
	pub author_id: i64,
	pub name: String,
	pub uco: String,
	#[serde(rename = "type")]
	pub r#type: Option<String>,
}
impl From<Author> for AuthorView {
	fn from(author: Author) -> Self {
		Self {
			author_id: author.author_id,
			name: author.name,
			uco: author.uco,
			r#type: author.r#type,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProjectView {
	pub project_id: i64,
	pub proj_id: Option<String>,
	pub reg_code: Option<String>,
	pub title: String,
	pub state: Option<String>,
	#[serde(serialize_with = "crate::time_serde::option::serialize")]
	pub date_begin: Option<OffsetDateTime>,
	#[serde(serialize_with = "crate::time_serde::option::serialize")]
	pub date_end: Option<OffsetDateTime>,
	pub muni_role: Option<String>,
	pub investor: Option<String>,
	pub department_name: Option<String>,
	pub annotation: Option<String>,
}
impl From<Project> for ProjectView {
	fn from(project: Project) -> Self {
		Self {
			project_id: project.project_id,
			proj_id: project.proj_id,
			reg_code: project.reg_code,
			title: project.title,
			state: project.state,
			date_begin: project.date_begin,
			date_end: project.date_end,
			muni_role: project.muni_role,
			investor: project.investor,
			department_name: project.department_name,
			annotation: project.annotation,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RelevantProject {
	pub project: ProjectView,
	pub score: f64,
}

/// One ranked author with the projects that made them relevant, best first.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AuthorBundle {
	pub author: AuthorView,
	pub relevant_projects: Vec<RelevantProject>,
	pub sum_score: f64,
	pub avg_score: f64,
	pub max_score: f64,
	pub count: u32,
}

impl OppfinderService {
	/// Researchers whose projects resemble the given opportunity, ranked by `strategy`.
	///
	/// Fails as a whole when an author known to the index is missing from the relational store.
	pub async fn search_by_opportunity(
		&self,
		req: OpportunityAuthorsRequest,
	) -> Result<Vec<AuthorBundle>> {
		let strategy = match req.strategy.as_deref().map(str::trim) {
			None | Some("") => AggregateStrategy::default(),
			Some(raw) => raw.parse::<AggregateStrategy>()?,
		};
		let document_id = req.document_id.trim();

		if document_id.is_empty() {
			return Err(Error::InvalidRequest {
				message: "Opportunity id must be non-empty.".to_string(),
			});
		}

		let max_results = self.result_limit(req.max_results);

		tracing::info!(document_id, %strategy, max_results, "Searching authors by opportunity.");

		let seed_index = &self.cfg.storage.index.opportunity_index;
		let project_index = &self.cfg.storage.index.project_index;
		let size = self.cfg.search.max_docs_size;
		let title_request = IndexRequest::new(
			project_index,
			self.queries.build_similarity_query_for_document(
				document_id,
				&self.queries.title_signal_fields(),
				seed_index,
			)?,
			size,
		);
		let body_request = IndexRequest::new(
			project_index,
			self.queries.build_similarity_query_for_document(
				document_id,
				&self.queries.body_signal_fields(),
				seed_index,
			)?,
			size,
		);
		let (title_hits, body_hits) =
			tokio::try_join!(self.project_hits(&title_request), self.project_hits(&body_request))?;
		let aggregated = self.aggregator.aggregate_by_score(vec![
			HitGroup::new(self.aggregator.title_group(), title_hits),
			HitGroup::new(&self.cfg.fields.description, body_hits),
		]);
		let ranked = rank_authors(aggregated, strategy, max_results);

		future::try_join_all(ranked.into_iter().map(|author| self.author_bundle(author))).await
	}

	async fn author_bundle(&self, ranked: RankedAuthor<ProjectHit>) -> Result<AuthorBundle> {
		let aggregate = ranked.aggregate;
		let author = self.backends.store.author_by_uco(&aggregate.author_key).await?.ok_or_else(
			|| Error::Integrity {
				message: format!(
					"Author {} is present in the project index but missing from the database.",
					aggregate.author_key
				),
			},
		)?;
		let mut relevant_projects = Vec::with_capacity(ranked.hits.len());

		for hit in ranked.hits {
			let Some(proj_id) = hit.payload.proj_id.as_deref() else {
				tracing::warn!(
					document_id = %hit.document_id,
					"Project hit has no project id. Skipping."
				);

				continue;
			};
			let Some(project) = self.backends.store.project_by_proj_id(proj_id).await? else {
				tracing::warn!(proj_id, "Indexed project was not found in the database. Skipping.");

				continue;
			};

			relevant_projects.push(RelevantProject { project: project.into(), score: hit.score });
		}

		Ok(AuthorBundle {
			author: author.into(),
			relevant_projects,
			sum_score: aggregate.sum_score,
			avg_score: aggregate.avg_score,
			max_score: aggregate.max_score,
			count: aggregate.count,
		})
	}

	async fn project_hits(&self, request: &IndexRequest) -> Result<Vec<ScoredHit<ProjectHit>>> {
		let hits = self.run_search(request).await?;
		let fields = self.queries.fields();

		Ok(documents::decode_hits(&request.index, hits, |source| {
			ProjectHit::from_source(&source, fields)
		}))
	}
}
