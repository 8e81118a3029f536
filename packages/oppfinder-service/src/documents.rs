use serde::{Deserialize, Serialize};
use serde_json::Value;

use oppfinder_config::Fields;
use oppfinder_domain::{AuthoredHit, ScoredHit};
use oppfinder_storage::index::IndexHits;

/// A funding or collaboration opportunity as stored in the opportunity index.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
	#[serde(rename = "ID", default, skip_serializing_if = "Option::is_none")]
	pub id: Option<i64>,
	#[serde(default)]
	pub institution_name: Option<String>,
	#[serde(default)]
	pub institution_url: Option<String>,
	#[serde(default)]
	pub appendix_url: Option<String>,
	#[serde(default)]
	pub title: Option<String>,
	#[serde(default)]
	pub url: Option<String>,
	#[serde(default)]
	pub author: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(rename = "helix", default, deserialize_with = "one_or_many")]
	pub helixes: Vec<String>,
	#[serde(rename = "role", default, deserialize_with = "one_or_many")]
	pub roles: Vec<String>,
	#[serde(rename = "expertise", default, deserialize_with = "one_or_many")]
	pub expertises: Vec<String>,
}

/// A researcher project as stored in the project index.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ProjectHit {
	pub proj_id: Option<String>,
	pub title: Option<String>,
	pub description: Option<String>,
	#[serde(skip)]
	pub author_key: String,
}
impl ProjectHit {
	/// Reads the configured project-id, author-key, title, and description fields.
	pub fn from_source(source: &Value, fields: &Fields) -> Option<Self> {
		let object = source.as_object()?;
		let text = |field: &str| object.get(field).and_then(scalar_to_string);

		Some(Self {
			proj_id: text(&fields.project_id),
			title: text(&fields.title),
			description: text(&fields.description),
			author_key: text(&fields.author_key).unwrap_or_default(),
		})
	}
}
impl AuthoredHit for ProjectHit {
	fn author_key(&self) -> &str {
		&self.author_key
	}
}

/// A raw index hit with its decoded payload, used where scores are informational only.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DocumentHit<T> {
	pub document_id: String,
	pub score: Option<f64>,
	#[serde(flatten)]
	pub payload: T,
}

/// Decodes the `_source` of every hit, skipping hits that have none or cannot be decoded.
pub(crate) fn decode_hits<T, F>(index: &str, hits: IndexHits, decode: F) -> Vec<ScoredHit<T>>
where
	F: Fn(Value) -> Option<T>,
{
	let mut out = Vec::with_capacity(hits.hits.len());

	for hit in hits.hits {
		let Some(source) = hit.source else {
			tracing::warn!(index, document_id = %hit.id, "Index hit has no source. Skipping.");

			continue;
		};
		let Some(payload) = decode(source) else {
			tracing::warn!(index, document_id = %hit.id, "Index hit source is malformed. Skipping.");

			continue;
		};

		out.push(ScoredHit { document_id: hit.id, score: hit.score, payload });
	}

	out
}

pub(crate) fn decode_opportunity(source: Value) -> Option<Opportunity> {
	serde_json::from_value(source).ok()
}

fn scalar_to_string(value: &Value) -> Option<String> {
	match value {
		Value::String(raw) => {
			let trimmed = raw.trim();

			if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
		},
		Value::Number(number) => Some(number.to_string()),
		_ => None,
	}
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
	D: serde::Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum OneOrMany {
		One(String),
		Many(Vec<String>),
	}

	Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
		Some(OneOrMany::One(value)) => vec![value],
		Some(OneOrMany::Many(values)) => values,
		None => Vec::new(),
	})
}
