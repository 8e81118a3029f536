pub mod documents;
pub mod filters;
pub mod opportunity;
pub mod recommend;
pub mod search;
pub mod time_serde;

mod error;

use std::{future::Future, pin::Pin, sync::Arc};

pub use documents::{DocumentHit, Opportunity, ProjectHit};
pub use error::{Error, Result};
pub use filters::UniqueFilters;
pub use opportunity::{
	AuthorBundle, AuthorView, OpportunityAuthorsRequest, ProjectView, RelevantProject,
};
pub use search::{Page, SearchAllRequest, SearchRequest, SearchResponse};

use oppfinder_config::Config;
use oppfinder_domain::{
	IndexRequest, QueryBuilder, ResultAggregator, TermsAggregationRequest, TextNormalizer,
};
use oppfinder_storage::{
	db::Db,
	index::{IndexClient, IndexHits},
	models::{Author, Project},
	queries,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Executes query descriptors against the external search index.
pub trait SearchIndex
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		request: &'a IndexRequest,
	) -> BoxFuture<'a, oppfinder_storage::Result<IndexHits>>;

	fn terms<'a>(
		&'a self,
		request: &'a TermsAggregationRequest,
	) -> BoxFuture<'a, oppfinder_storage::Result<Vec<String>>>;
}

/// Read access to the relational project and author records.
pub trait ProjectStore
where
	Self: Send + Sync,
{
	fn projects_by_ids<'a>(
		&'a self,
		project_ids: &'a [i64],
	) -> BoxFuture<'a, oppfinder_storage::Result<Vec<Project>>>;

	fn projects_by_author_uco<'a>(
		&'a self,
		uco: &'a str,
	) -> BoxFuture<'a, oppfinder_storage::Result<Vec<Project>>>;

	fn project_by_proj_id<'a>(
		&'a self,
		proj_id: &'a str,
	) -> BoxFuture<'a, oppfinder_storage::Result<Option<Project>>>;

	fn author_by_uco<'a>(
		&'a self,
		uco: &'a str,
	) -> BoxFuture<'a, oppfinder_storage::Result<Option<Author>>>;
}

#[derive(Clone)]
pub struct Backends {
	pub index: Arc<dyn SearchIndex>,
	pub store: Arc<dyn ProjectStore>,
}

pub struct OppfinderService {
	pub cfg: Config,
	pub backends: Backends,
	queries: QueryBuilder,
	aggregator: ResultAggregator,
	normalizer: TextNormalizer,
}
impl OppfinderService {
	pub fn new(cfg: Config, db: Db, index: IndexClient) -> Result<Self> {
		let backends = Backends { index: Arc::new(index), store: Arc::new(db) };

		Self::with_backends(cfg, backends)
	}

	/// Builds the service on caller-supplied backends. The stop-word file is read here, once.
	pub fn with_backends(cfg: Config, backends: Backends) -> Result<Self> {
		let queries = QueryBuilder::from_config(&cfg)?;
		let aggregator = ResultAggregator::from_config(&cfg);
		let normalizer = TextNormalizer::new(queries.stop_words());

		tracing::info!(
			stop_words = queries.stop_words().len(),
			opportunity_index = %cfg.storage.index.opportunity_index,
			project_index = %cfg.storage.index.project_index,
			"Search service initialized."
		);

		Ok(Self { cfg, backends, queries, aggregator, normalizer })
	}

	/// Requested result count, defaulted and capped by the configured page sizes.
	pub(crate) fn result_limit(&self, requested: Option<u32>) -> usize {
		let search = &self.cfg.search;

		requested.unwrap_or(search.default_page_size).min(search.max_page_size) as usize
	}
}

impl SearchIndex for IndexClient {
	fn search<'a>(
		&'a self,
		request: &'a IndexRequest,
	) -> BoxFuture<'a, oppfinder_storage::Result<IndexHits>> {
		Box::pin(IndexClient::search(self, request))
	}

	fn terms<'a>(
		&'a self,
		request: &'a TermsAggregationRequest,
	) -> BoxFuture<'a, oppfinder_storage::Result<Vec<String>>> {
		Box::pin(IndexClient::terms(self, request))
	}
}

impl ProjectStore for Db {
	fn projects_by_ids<'a>(
		&'a self,
		project_ids: &'a [i64],
	) -> BoxFuture<'a, oppfinder_storage::Result<Vec<Project>>> {
		Box::pin(queries::projects_by_ids(self, project_ids))
	}

	fn projects_by_author_uco<'a>(
		&'a self,
		uco: &'a str,
	) -> BoxFuture<'a, oppfinder_storage::Result<Vec<Project>>> {
		Box::pin(queries::projects_by_author_uco(self, uco))
	}

	fn project_by_proj_id<'a>(
		&'a self,
		proj_id: &'a str,
	) -> BoxFuture<'a, oppfinder_storage::Result<Option<Project>>> {
		Box::pin(queries::project_by_proj_id(self, proj_id))
	}

	fn author_by_uco<'a>(
		&'a self,
		uco: &'a str,
	) -> BoxFuture<'a, oppfinder_storage::Result<Option<Author>>> {
		Box::pin(queries::author_by_uco(self, uco))
	}
}
