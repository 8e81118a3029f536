use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use oppfinder_config::{Config, Fields, Similarity};

use crate::{Error, Result, StopWords, text};

const WILDCARD_SPECIAL_CHARS: [char; 3] = ['\\', '*', '?'];

/// Structured query descriptor rendered into the index query DSL.
#[derive(Clone, Debug, PartialEq)]
pub enum Query {
	MatchAll,
	MoreLikeThis(MoreLikeThis),
	MultiMatch { query: String, fields: Vec<String> },
	Match { field: String, query: String },
	Terms { field: String, values: Vec<String> },
	Wildcard { field: String, value: String, case_insensitive: bool },
	Bool(BoolQuery),
}
impl Query {
	pub fn to_value(&self) -> Value {
		match self {
			Self::MatchAll => serde_json::json!({ "match_all": {} }),
			Self::MoreLikeThis(mlt) => serde_json::json!({ "more_like_this": mlt.to_value() }),
			Self::MultiMatch { query, fields } =>
				serde_json::json!({ "multi_match": { "query": query, "fields": fields } }),
			Self::Match { field, query } =>
				serde_json::json!({ "match": keyed(field, serde_json::json!({ "query": query })) }),
			Self::Terms { field, values } =>
				serde_json::json!({ "terms": keyed(field, serde_json::json!(values)) }),
			Self::Wildcard { field, value, case_insensitive } => serde_json::json!({
				"wildcard": keyed(
					field,
					serde_json::json!({ "value": value, "case_insensitive": case_insensitive }),
				)
			}),
			Self::Bool(bool_query) => serde_json::json!({ "bool": bool_query.to_value() }),
		}
	}
}
impl Serialize for Query {
	fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		self.to_value().serialize(serializer)
	}
}

/// Conjunction (`must`) and disjunction (`should`) of clauses. An empty query matches everything.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoolQuery {
	pub must: Vec<Query>,
	pub should: Vec<Query>,
}
impl BoolQuery {
	pub fn is_empty(&self) -> bool {
		self.must.is_empty() && self.should.is_empty()
	}

	pub fn clause_count(&self) -> usize {
		self.must.len() + self.should.len()
	}

	fn to_value(&self) -> Value {
		let mut out = Map::new();

		if !self.must.is_empty() {
			out.insert("must".to_string(), self.must.iter().map(Query::to_value).collect());
		}
		if !self.should.is_empty() {
			out.insert("should".to_string(), self.should.iter().map(Query::to_value).collect());
		}

		Value::Object(out)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct MoreLikeThis {
	pub fields: Vec<String>,
	pub like: Vec<LikeDocument>,
	pub max_query_terms: u32,
	pub min_doc_freq: u32,
	pub min_term_freq: u32,
	pub minimum_should_match: String,
	pub stop_words: StopWords,
}
impl MoreLikeThis {
	fn to_value(&self) -> Value {
		serde_json::json!({
			"fields": self.fields,
			"like": self.like.iter().map(LikeDocument::to_value).collect::<Vec<_>>(),
			"max_query_terms": self.max_query_terms,
			"min_doc_freq": self.min_doc_freq,
			"min_term_freq": self.min_term_freq,
			"minimum_should_match": self.minimum_should_match,
			"stop_words": self.stop_words.as_slice(),
		})
	}
}

/// Seed of a similarity query.
#[derive(Clone, Debug, PartialEq)]
pub enum LikeDocument {
	/// Free text analyzed as if it were the `field` of a document in `index`.
	Text { index: String, field: String, text: String },
	/// A document already stored in `index`.
	Indexed { index: String, id: String },
}
impl LikeDocument {
	fn to_value(&self) -> Value {
		match self {
			Self::Text { index, field, text } =>
				serde_json::json!({ "_index": index, "doc": keyed(field, Value::String(text.clone())) }),
			Self::Indexed { index, id } => serde_json::json!({ "_index": index, "_id": id }),
		}
	}
}

/// Facet filters for opportunity searches.
///
/// Values inside one list are OR'd, lists are AND'd, and empty lists are omitted. The optional
/// column filter must carry both a field and a value.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterCriteria {
	pub helixes: Vec<String>,
	pub roles: Vec<String>,
	pub expertises: Vec<String>,
	pub phrase_filter_field: Option<String>,
	pub phrase_filter_value: Option<String>,
}

/// Stateless translation of search intent into [`Query`] descriptors.
#[derive(Clone, Debug)]
pub struct QueryBuilder {
	fields: Fields,
	seed_index: String,
	similarity: Similarity,
	stop_words: StopWords,
}
impl QueryBuilder {
	/// `seed_index` is the index that free-text seeds are analyzed against.
	pub fn new(
		fields: Fields,
		seed_index: impl Into<String>,
		similarity: Similarity,
		stop_words: StopWords,
	) -> Self {
		Self { fields, seed_index: seed_index.into(), similarity, stop_words }
	}

	/// Loads the configured stop-word file, if any.
	pub fn from_config(cfg: &Config) -> Result<Self> {
		let stop_words = match cfg.similarity.stop_words_path.as_deref() {
			Some(path) => StopWords::load(path)?,
			None => StopWords::default(),
		};

		Ok(Self::new(
			cfg.fields.clone(),
			cfg.storage.index.opportunity_index.clone(),
			cfg.similarity.clone(),
			stop_words,
		))
	}

	pub fn fields(&self) -> &Fields {
		&self.fields
	}

	pub fn stop_words(&self) -> &StopWords {
		&self.stop_words
	}

	/// Fields searched by the title-weighted signal.
	pub fn title_signal_fields(&self) -> Vec<String> {
		vec![self.fields.description.clone(), self.fields.title.clone()]
	}

	/// Fields searched by the body signal.
	pub fn body_signal_fields(&self) -> Vec<String> {
		vec![self.fields.description.clone()]
	}

	pub fn build_similarity_query<S>(&self, seeds: &[S], fields: &[String]) -> Result<Query>
	where
		S: AsRef<str>,
	{
		if seeds.is_empty() {
			return Err(Error::invalid("Similarity query requires at least one seed."));
		}

		let like = seeds
			.iter()
			.map(|seed| text::collapse_whitespace(seed.as_ref()))
			.filter(|seed| !seed.is_empty())
			.map(|text| LikeDocument::Text {
				index: self.seed_index.clone(),
				field: self.fields.description.clone(),
				text,
			})
			.collect::<Vec<_>>();

		if like.is_empty() {
			return Err(Error::invalid("Similarity query requires at least one non-empty seed."));
		}

		self.more_like_this(fields, like)
	}

	pub fn build_similarity_query_for_document(
		&self,
		document_id: &str,
		fields: &[String],
		index: &str,
	) -> Result<Query> {
		let document_id = document_id.trim();

		if document_id.is_empty() {
			return Err(Error::invalid("Similarity query requires a document id."));
		}
		if index.trim().is_empty() {
			return Err(Error::invalid("Similarity query requires an index name."));
		}

		self.more_like_this(
			fields,
			vec![LikeDocument::Indexed { index: index.to_string(), id: document_id.to_string() }],
		)
	}

	/// Full-text match over title (boosted ×2) and description.
	pub fn build_phrase_query(&self, normalized_phrase: &str) -> Result<Query> {
		let phrase = text::collapse_whitespace(normalized_phrase);

		if phrase.is_empty() {
			return Err(Error::invalid("Search phrase must be non-empty."));
		}

		Ok(Query::MultiMatch {
			query: phrase,
			fields: vec![format!("{}^2", self.fields.title), self.fields.description.clone()],
		})
	}

	pub fn build_filter_query(&self, criteria: &FilterCriteria) -> Result<BoolQuery> {
		let mut filter = BoolQuery::default();

		for (field, values) in [
			(&self.fields.helix, &criteria.helixes),
			(&self.fields.role, &criteria.roles),
			(&self.fields.expertise, &criteria.expertises),
		] {
			if values.is_empty() {
				continue;
			}

			filter.must.push(Query::Terms { field: field.clone(), values: values.clone() });
		}

		if let Some(column) = self.build_optional_column_filter(
			criteria.phrase_filter_field.as_deref(),
			criteria.phrase_filter_value.as_deref(),
		)? {
			filter.must.push(column);
		}

		Ok(filter)
	}

	/// Case-insensitive "contains" filter on one column.
	///
	/// On the title field the wildcard is OR'd with a match query so tokenized matches are kept.
	pub fn build_column_filter(&self, field: &str, value: &str) -> Result<Query> {
		let field = field.trim();

		if field.is_empty() {
			return Err(Error::invalid("Filter field must be non-empty."));
		}

		let wildcard = Query::Wildcard {
			field: field.to_string(),
			value: format!("*{}*", escape_wildcard(value)),
			case_insensitive: true,
		};

		if field != self.fields.title {
			return Ok(wildcard);
		}

		Ok(Query::Bool(BoolQuery {
			must: Vec::new(),
			should: vec![
				wildcard,
				Query::Match { field: field.to_string(), query: value.to_string() },
			],
		}))
	}

	/// Column filter from an optional pair. Both halves absent yields `None`.
	pub fn build_optional_column_filter(
		&self,
		field: Option<&str>,
		value: Option<&str>,
	) -> Result<Option<Query>> {
		match (field, value) {
			(None, None) => Ok(None),
			(Some(field), Some(value)) => self.build_column_filter(field, value).map(Some),
			(Some(_), None) =>
				Err(Error::invalid("Filter field was given without a filter value.")),
			(None, Some(_)) =>
				Err(Error::invalid("Filter value was given without a filter field.")),
		}
	}

	pub fn build_match_all_query(&self) -> Query {
		Query::MatchAll
	}

	fn more_like_this(&self, fields: &[String], like: Vec<LikeDocument>) -> Result<Query> {
		if fields.is_empty() {
			return Err(Error::invalid("Similarity query requires at least one field."));
		}

		Ok(Query::MoreLikeThis(MoreLikeThis {
			fields: fields.to_vec(),
			like,
			max_query_terms: self.similarity.max_query_terms,
			min_doc_freq: self.similarity.min_doc_freq,
			min_term_freq: self.similarity.min_term_freq,
			minimum_should_match: self.similarity.minimum_should_match.clone(),
			stop_words: self.stop_words.clone(),
		}))
	}
}

fn keyed(key: &str, value: Value) -> Value {
	let mut map = Map::new();

	map.insert(key.to_string(), value);

	Value::Object(map)
}

fn escape_wildcard(value: &str) -> String {
	let mut out = String::with_capacity(value.len());

	for ch in value.chars() {
		if WILDCARD_SPECIAL_CHARS.contains(&ch) {
			out.push('\\');
		}

		out.push(ch);
	}

	out
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn builder() -> QueryBuilder {
		QueryBuilder::new(
			Fields::default(),
			"crowdhelix_data",
			Similarity::default(),
			StopWords::from_words(["the", "of"]),
		)
	}

	#[test]
	fn similarity_query_collapses_whitespace_and_applies_tuning() {
		let query = builder()
			.build_similarity_query(&["Graph  neural\n\tnetworks", "   "], &["description".to_string()])
			.expect("Failed to build similarity query.");

		assert_eq!(
			query.to_value(),
			json!({
				"more_like_this": {
					"fields": ["description"],
					"like": [{
						"_index": "crowdhelix_data",
						"doc": { "description": "Graph neural networks" }
					}],
					"max_query_terms": 50,
					"min_doc_freq": 1,
					"min_term_freq": 1,
					"minimum_should_match": "10%",
					"stop_words": ["the", "of"]
				}
			})
		);
	}

	#[test]
	fn similarity_query_rejects_empty_seeds() {
		let seeds: [&str; 0] = [];
		let err = builder()
			.build_similarity_query(&seeds, &["description".to_string()])
			.expect_err("Expected empty seed error.");

		assert!(matches!(err, Error::InvalidArgument { .. }));
	}

	#[test]
	fn similarity_query_rejects_blank_seeds() {
		let err = builder()
			.build_similarity_query(&[" ", "\n"], &["description".to_string()])
			.expect_err("Expected blank seed error.");

		assert!(err.to_string().contains("non-empty seed"), "Unexpected error: {err}");
	}

	#[test]
	fn document_similarity_query_references_indexed_document() {
		let builder = builder();
		let query = builder
			.build_similarity_query_for_document("opp-7", &builder.title_signal_fields(), "crowdhelix_data")
			.expect("Failed to build document query.");
		let value = query.to_value();

		assert_eq!(value["more_like_this"]["fields"], json!(["description", "title"]));
		assert_eq!(
			value["more_like_this"]["like"],
			json!([{ "_index": "crowdhelix_data", "_id": "opp-7" }])
		);
	}

	#[test]
	fn phrase_query_boosts_title() {
		let query = builder().build_phrase_query("solar energy").expect("Failed to build phrase.");

		assert_eq!(
			query.to_value(),
			json!({
				"multi_match": { "query": "solar energy", "fields": ["title^2", "description"] }
			})
		);
	}

	#[test]
	fn empty_criteria_yield_empty_filter() {
		let filter = builder()
			.build_filter_query(&FilterCriteria::default())
			.expect("Failed to build filter.");

		assert!(filter.is_empty());
		assert_eq!(filter.clause_count(), 0);
		assert_eq!(Query::Bool(filter).to_value(), json!({ "bool": {} }));
	}

	#[test]
	fn filter_ands_non_empty_term_lists() {
		let criteria = FilterCriteria {
			helixes: vec!["Academia".to_string(), "Industry".to_string()],
			expertises: vec!["AI".to_string()],
			..Default::default()
		};
		let filter = builder().build_filter_query(&criteria).expect("Failed to build filter.");

		assert_eq!(
			Query::Bool(filter).to_value(),
			json!({
				"bool": {
					"must": [
						{ "terms": { "helix": ["Academia", "Industry"] } },
						{ "terms": { "expertise": ["AI"] } }
					]
				}
			})
		);
	}

	#[test]
	fn filter_rejects_half_column_pair() {
		let criteria =
			FilterCriteria { phrase_filter_field: Some("role".to_string()), ..Default::default() };
		let err = builder().build_filter_query(&criteria).expect_err("Expected pairing error.");

		assert!(matches!(err, Error::InvalidArgument { .. }));
	}

	#[test]
	fn column_filter_on_title_adds_match_clause() {
		let query = builder().build_column_filter("title", "Horizon*").expect("Failed to build.");

		assert_eq!(
			query.to_value(),
			json!({
				"bool": {
					"should": [
						{ "wildcard": { "title": { "value": "*Horizon\\**", "case_insensitive": true } } },
						{ "match": { "title": { "query": "Horizon*" } } }
					]
				}
			})
		);
	}

	#[test]
	fn column_filter_on_other_field_is_plain_wildcard() {
		let query = builder().build_column_filter("role", "lead").expect("Failed to build.");

		assert_eq!(
			query.to_value(),
			json!({ "wildcard": { "role": { "value": "*lead*", "case_insensitive": true } } })
		);
	}

	#[test]
	fn match_all_renders_empty_object() {
		assert_eq!(builder().build_match_all_query().to_value(), json!({ "match_all": {} }));
	}
}
