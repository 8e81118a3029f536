use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Query;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SortSpec {
	pub field: String,
	#[serde(default)]
	pub descending: bool,
}

/// One search call against the external index. `size × page` is the offset of the result window.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexRequest {
	pub index: String,
	pub query: Query,
	pub post_filter: Option<Query>,
	pub size: u32,
	pub page: u32,
	pub sort: Option<SortSpec>,
}
impl IndexRequest {
	pub fn new(index: impl Into<String>, query: Query, size: u32) -> Self {
		Self { index: index.into(), query, post_filter: None, size, page: 0, sort: None }
	}

	/// An empty boolean filter matches everything and is dropped.
	pub fn with_post_filter(mut self, filter: Query) -> Self {
		self.post_filter = match filter {
			Query::Bool(bool_query) if bool_query.is_empty() => None,
			filter => Some(filter),
		};

		self
	}

	pub fn with_page(mut self, page: u32) -> Self {
		self.page = page;

		self
	}

	pub fn with_sort(mut self, sort: Option<SortSpec>) -> Self {
		self.sort = sort;

		self
	}

	pub fn offset(&self) -> u64 {
		u64::from(self.size) * u64::from(self.page)
	}

	pub fn to_body(&self) -> Value {
		let mut body = Map::new();

		body.insert("query".to_string(), self.query.to_value());
		body.insert("size".to_string(), Value::from(self.size));
		body.insert("from".to_string(), Value::from(self.offset()));

		if let Some(sort) = self.sort.as_ref() {
			let order = if sort.descending { "desc" } else { "asc" };
			let mut clause = Map::new();

			clause.insert(sort.field.clone(), serde_json::json!({ "order": order }));
			body.insert("sort".to_string(), Value::Array(vec![Value::Object(clause)]));
		}
		if let Some(filter) = self.post_filter.as_ref() {
			body.insert("post_filter".to_string(), filter.to_value());
		}

		Value::Object(body)
	}
}

/// Distinct values of one keyword field, read from a terms aggregation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TermsAggregationRequest {
	pub index: String,
	pub field: String,
	pub size: u32,
}
impl TermsAggregationRequest {
	pub fn new(index: impl Into<String>, field: impl Into<String>, size: u32) -> Self {
		Self { index: index.into(), field: field.into(), size }
	}

	pub fn aggregation_name(&self) -> String {
		format!("{}-agg", self.field)
	}

	pub fn to_body(&self) -> Value {
		let mut aggs = Map::new();

		aggs.insert(
			self.aggregation_name(),
			serde_json::json!({ "terms": { "field": self.field, "size": self.size } }),
		);

		serde_json::json!({ "size": 0, "aggs": aggs })
	}
}
