use std::collections::{HashMap, HashSet};

use futures::future;
use serde::{Deserialize, Serialize};

use oppfinder_domain::{
	AggregatedResult, FilterCriteria, HitGroup, IndexRequest, Query, ScoredHit, SortSpec,
};
use oppfinder_storage::{index::IndexHits, models::Project};

use crate::{
	Error, OppfinderService, Result,
	documents::{self, DocumentHit, Opportunity},
};

const PHRASE_HIT_SOURCE: &str = "phrase";

/// Input shared by the project, author, and phrase searches.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
	pub max_results: Option<u32>,
	#[serde(flatten)]
	pub filter: FilterCriteria,
	pub ucos: Vec<String>,
	pub project_ids: Vec<i64>,
	pub personalized: bool,
	pub phrase: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SearchResponse {
	pub items: Vec<AggregatedResult<Opportunity>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchAllRequest {
	pub page: u32,
	pub size: Option<u32>,
	pub sort_by: Option<String>,
	pub desc: bool,
	pub filter_field: Option<String>,
	pub filter_value: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Page<T> {
	pub items: Vec<T>,
	pub page: u32,
	pub size: u32,
	pub total: u64,
}

impl OppfinderService {
	/// Opportunities similar to the given projects, optionally reinforced by what their authors
	/// worked on elsewhere.
	pub async fn search_by_projects(&self, req: SearchRequest) -> Result<SearchResponse> {
		if req.project_ids.is_empty() {
			return Err(Error::InvalidRequest {
				message: "At least one project id is required.".to_string(),
			});
		}

		tracing::info!(
			projects = req.project_ids.len(),
			personalized = req.personalized,
			"Searching opportunities by projects."
		);

		let projects = self.load_projects(&req.project_ids).await?;
		let mut items = self.search_for_projects(&projects, &req.filter).await?;

		if req.personalized {
			let mut seen = HashSet::new();
			let ucos = projects
				.iter()
				.filter_map(|project| project.author_uco.as_deref())
				.filter(|uco| seen.insert(*uco))
				.collect::<Vec<_>>();
			let recommendations = future::try_join_all(
				ucos.iter().map(|uco| self.recommend_for_author(uco, &req.project_ids)),
			)
			.await?;

			for recommendation in &recommendations {
				items = self.aggregator.merge_recommendations(items, recommendation);
			}
		}

		items.truncate(self.result_limit(req.max_results));

		Ok(SearchResponse { items })
	}

	/// Opportunities similar to everything the given authors have worked on.
	pub async fn search_by_authors(&self, req: SearchRequest) -> Result<SearchResponse> {
		tracing::info!(
			authors = req.ucos.len(),
			projects = req.project_ids.len(),
			"Searching opportunities by authors."
		);

		let mut seen = HashSet::new();
		let ucos = req
			.ucos
			.iter()
			.map(|uco| uco.trim())
			.filter(|uco| !uco.is_empty() && seen.insert(*uco))
			.collect::<Vec<_>>();
		let per_author = future::try_join_all(
			ucos.iter().map(|uco| self.backends.store.projects_by_author_uco(uco)),
		)
		.await?;
		let projects = per_author.into_iter().flatten().collect::<Vec<_>>();

		if projects.is_empty() {
			return Err(Error::InvalidRequest {
				message: "No projects data found for the selected authors.".to_string(),
			});
		}

		let mut items = self.search_for_projects(&projects, &req.filter).await?;

		if !req.project_ids.is_empty() {
			let selected = self.load_projects(&req.project_ids).await?;
			let by_projects = self.search_for_projects(&selected, &req.filter).await?;

			items = self.aggregator.merge_recommendations(items, &by_projects);
		}

		items.truncate(self.result_limit(req.max_results));

		Ok(SearchResponse { items })
	}

	/// Full-text search. Results keep the index order.
	pub async fn search_by_phrase(&self, req: SearchRequest) -> Result<SearchResponse> {
		let normalized = self.normalizer.normalize(req.phrase.as_deref().unwrap_or_default());

		if normalized.is_empty() {
			return Err(Error::InvalidRequest {
				message: "Search phrase is empty after removing stop words.".to_string(),
			});
		}

		tracing::info!(phrase = %normalized, "Searching opportunities by phrase.");

		let query = self.queries.build_phrase_query(&normalized)?;
		let filter = self.queries.build_filter_query(&req.filter)?;
		let request = IndexRequest::new(
			&self.cfg.storage.index.opportunity_index,
			query,
			self.result_limit(req.max_results) as u32,
		)
		.with_post_filter(Query::Bool(filter));
		let hits = self.opportunity_hits(&request).await?;

		Ok(SearchResponse { items: AggregatedResult::ranked_in_order(hits, PHRASE_HIT_SOURCE) })
	}

	/// One page of all opportunities, optionally sorted and filtered on a single column.
	pub async fn search_all(
		&self,
		req: SearchAllRequest,
	) -> Result<Page<DocumentHit<Opportunity>>> {
		let size = self.result_limit(req.size) as u32;
		let filter = self.queries.build_optional_column_filter(
			non_blank(req.filter_field.as_deref()),
			non_blank(req.filter_value.as_deref()),
		)?;
		let sort = non_blank(req.sort_by.as_deref())
			.map(|field| SortSpec { field: field.to_string(), descending: req.desc });
		let mut request = IndexRequest::new(
			&self.cfg.storage.index.opportunity_index,
			self.queries.build_match_all_query(),
			size,
		)
		.with_page(req.page)
		.with_sort(sort);

		if let Some(filter) = filter {
			request = request.with_post_filter(filter);
		}

		let hits = self.run_search(&request).await?;
		let total = hits.total;
		let items = documents::decode_hits(&request.index, hits, documents::decode_opportunity)
			.into_iter()
			.map(|hit| DocumentHit {
				document_id: hit.document_id,
				score: hit.score,
				payload: hit.payload,
			})
			.collect();

		Ok(Page { items, page: req.page, size, total })
	}

	/// Runs the title and body similarity signals seeded by the given projects and aggregates them.
	pub(crate) async fn search_for_projects(
		&self,
		projects: &[Project],
		filter: &FilterCriteria,
	) -> Result<Vec<AggregatedResult<Opportunity>>> {
		let titles = projects.iter().map(|project| project.title.as_str()).collect::<Vec<_>>();
		let annotations = projects
			.iter()
			.filter_map(|project| project.processed_annotation.as_deref())
			.filter(|annotation| !annotation.trim().is_empty())
			.collect::<Vec<_>>();
		let post_filter = Query::Bool(self.queries.build_filter_query(filter)?);
		let index = &self.cfg.storage.index.opportunity_index;
		let size = self.cfg.search.max_docs_size;
		let title_request = IndexRequest::new(
			index,
			self.queries.build_similarity_query(&titles, &self.queries.title_signal_fields())?,
			size,
		)
		.with_post_filter(post_filter.clone());
		let body_request = if annotations.is_empty() {
			None
		} else {
			Some(
				IndexRequest::new(
					index,
					self.queries
						.build_similarity_query(&annotations, &self.queries.body_signal_fields())?,
					size,
				)
				.with_post_filter(post_filter),
			)
		};
		let body_search = async {
			match body_request.as_ref() {
				Some(request) => self.opportunity_hits(request).await.map(Some),
				None => Ok(None),
			}
		};
		let (title_hits, body_hits) =
			tokio::try_join!(self.opportunity_hits(&title_request), body_search)?;
		let mut groups = vec![HitGroup::new(self.aggregator.title_group(), title_hits)];

		if let Some(body_hits) = body_hits {
			groups.push(HitGroup::new(&self.cfg.fields.description, body_hits));
		}

		Ok(self.aggregator.aggregate_by_score(groups))
	}

	/// Loads projects in request order. Every id must exist.
	pub(crate) async fn load_projects(&self, project_ids: &[i64]) -> Result<Vec<Project>> {
		let rows = self.backends.store.projects_by_ids(project_ids).await?;
		let mut by_id = rows
			.into_iter()
			.map(|project| (project.project_id, project))
			.collect::<HashMap<_, _>>();
		let mut projects = Vec::with_capacity(project_ids.len());

		for project_id in project_ids {
			// Duplicate ids in the request resolve to one project.
			if projects.iter().any(|project: &Project| project.project_id == *project_id) {
				continue;
			}

			let project = by_id.remove(project_id).ok_or_else(|| Error::NotFound {
				message: format!("Project {project_id} was not found."),
			})?;

			projects.push(project);
		}

		Ok(projects)
	}

	pub(crate) async fn opportunity_hits(
		&self,
		request: &IndexRequest,
	) -> Result<Vec<ScoredHit<Opportunity>>> {
		let hits = self.run_search(request).await?;

		Ok(documents::decode_hits(&request.index, hits, documents::decode_opportunity))
	}

	pub(crate) async fn run_search(&self, request: &IndexRequest) -> Result<IndexHits> {
		Ok(self.backends.index.search(request).await?)
	}
}

fn non_blank(value: Option<&str>) -> Option<&str> {
	value.map(str::trim).filter(|value| !value.is_empty())
}
