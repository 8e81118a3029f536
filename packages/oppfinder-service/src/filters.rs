use std::collections::BTreeMap;

use oppfinder_domain::TermsAggregationRequest;

use crate::{OppfinderService, Result};

/// Distinct facet values keyed by the configured field name.
pub type UniqueFilters = BTreeMap<String, Vec<String>>;

impl OppfinderService {
	/// Helix, role, and expertise values present in the opportunity index.
	pub async fn unique_filters(&self) -> Result<UniqueFilters> {
		let index = &self.cfg.storage.index.opportunity_index;
		let size = self.cfg.search.max_agg_size;
		let fields = &self.cfg.fields;
		let helix = TermsAggregationRequest::new(index, &fields.helix, size);
		let role = TermsAggregationRequest::new(index, &fields.role, size);
		let expertise = TermsAggregationRequest::new(index, &fields.expertise, size);
		let (helixes, roles, expertises) = tokio::try_join!(
			self.backends.index.terms(&helix),
			self.backends.index.terms(&role),
			self.backends.index.terms(&expertise),
		)?;

		Ok(BTreeMap::from([
			(helix.field, helixes),
			(role.field, roles),
			(expertise.field, expertises),
		]))
	}
}
