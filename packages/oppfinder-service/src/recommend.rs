use oppfinder_domain::{AggregatedResult, HitGroup, IndexRequest};

use crate::{Error, OppfinderService, Result, documents::Opportunity};

impl OppfinderService {
	/// Opportunities similar to the author's other projects.
	///
	/// Projects in `exclude_project_ids` are left out of the seeds. An author with nothing left to
	/// seed from gets no recommendations.
	pub async fn recommend_for_author(
		&self,
		uco: &str,
		exclude_project_ids: &[i64],
	) -> Result<Vec<AggregatedResult<Opportunity>>> {
		let projects = self.backends.store.projects_by_author_uco(uco).await?;
		let seeds = projects
			.iter()
			.filter(|project| !exclude_project_ids.contains(&project.project_id))
			.filter_map(|project| project.processed_annotation.as_deref())
			.filter(|annotation| !annotation.trim().is_empty())
			.collect::<Vec<_>>();

		if seeds.is_empty() {
			tracing::info!(uco, "Author has no other annotated projects. No recommendations.");

			return Ok(Vec::new());
		}

		let query =
			self.queries.build_similarity_query(&seeds, &self.queries.body_signal_fields())?;
		let request = IndexRequest::new(
			&self.cfg.storage.index.opportunity_index,
			query,
			self.cfg.search.recommendation_size,
		);
		let hits = self.opportunity_hits(&request).await?;
		let group = HitGroup::new(&self.cfg.fields.description, hits);

		Ok(self.aggregator.aggregate_by_score(vec![group]))
	}

	/// Opportunities similar to an indexed opportunity.
	pub async fn recommend_more_like_this(
		&self,
		document_id: &str,
	) -> Result<Vec<AggregatedResult<Opportunity>>> {
		if document_id.trim().is_empty() {
			return Err(Error::InvalidRequest {
				message: "Opportunity id must be non-empty.".to_string(),
			});
		}

		tracing::info!(document_id, "Recommending similar opportunities.");

		let index = &self.cfg.storage.index.opportunity_index;
		let query = self.queries.build_similarity_query_for_document(
			document_id,
			&self.queries.title_signal_fields(),
			index,
		)?;
		let request = IndexRequest::new(index, query, self.cfg.search.recommendation_size);
		let hits = self.opportunity_hits(&request).await?;
		let group = HitGroup::new(&self.cfg.fields.description, hits);

		Ok(self.aggregator.aggregate_by_score(vec![group]))
	}
}
