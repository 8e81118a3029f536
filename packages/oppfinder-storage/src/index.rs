// std
use std::time::Duration as StdDuration;

// crates.io
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use oppfinder_domain::{IndexRequest, TermsAggregationRequest};

use crate::{Error, Result};

const MAX_ERROR_BODY_CHARS: usize = 512;

/// One hit of a search response. `source` is the stored document, if the index returned it.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexHit {
	pub id: String,
	pub score: Option<f64>,
	pub source: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndexHits {
	pub total: u64,
	pub hits: Vec<IndexHit>,
}

/// HTTP client for an Elasticsearch-compatible index.
#[derive(Clone, Debug)]
pub struct IndexClient {
	client: Client,
	base_url: String,
}
impl IndexClient {
	pub fn new(cfg: &oppfinder_config::Index) -> Result<Self> {
		let client = Client::builder()
			.timeout(StdDuration::from_millis(cfg.timeout_ms))
			.build()
			.map_err(|err| Error::IndexUnavailable {
				message: format!("Failed to build index client: {err}."),
			})?;

		Ok(Self { client, base_url: cfg.url.trim_end_matches('/').to_string() })
	}

	pub async fn search(&self, request: &IndexRequest) -> Result<IndexHits> {
		let body = self.post_search(&request.index, &request.to_body()).await?;

		parse_search_response(&body)
	}

	/// Distinct non-blank keys of the requested terms aggregation, in bucket order.
	pub async fn terms(&self, request: &TermsAggregationRequest) -> Result<Vec<String>> {
		let body = self.post_search(&request.index, &request.to_body()).await?;
		let json: Value = serde_json::from_slice(&body).map_err(|err| Error::IndexRejected {
			status: StatusCode::OK.as_u16(),
			message: format!("Aggregation response is not valid JSON: {err}."),
		})?;

		parse_terms_response(&json, &request.aggregation_name())
	}

	async fn post_search(&self, index: &str, body: &Value) -> Result<Vec<u8>> {
		let url = format!("{}/{}/_search", self.base_url, index);
		let res =
			self.client.post(url).json(body).send().await.map_err(|err| Error::IndexUnavailable {
				message: format!("Index request failed: {err}."),
			})?;
		let status = res.status();
		let bytes = res.bytes().await.map_err(|err| Error::IndexUnavailable {
			message: format!("Failed to read index response: {err}."),
		})?;

		if !status.is_success() {
			return Err(Error::IndexRejected {
				status: status.as_u16(),
				message: error_reason(&bytes),
			});
		}

		Ok(bytes.to_vec())
	}
}

#[derive(Deserialize)]
struct SearchResponseWire {
	hits: HitsWire,
}

#[derive(Deserialize)]
struct HitsWire {
	#[serde(default)]
	total: Option<TotalWire>,
	#[serde(default)]
	hits: Vec<HitWire>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TotalWire {
	Object { value: u64 },
	Count(u64),
}

#[derive(Deserialize)]
struct HitWire {
	#[serde(rename = "_id")]
	id: String,
	#[serde(rename = "_score", default)]
	score: Option<f64>,
	#[serde(rename = "_source", default)]
	source: Option<Value>,
}

fn parse_search_response(body: &[u8]) -> Result<IndexHits> {
	let wire: SearchResponseWire = serde_json::from_slice(body).map_err(|err| {
		Error::IndexRejected {
			status: StatusCode::OK.as_u16(),
			message: format!("Search response has an unexpected shape: {err}."),
		}
	})?;
	let total = match wire.hits.total {
		Some(TotalWire::Object { value }) | Some(TotalWire::Count(value)) => value,
		None => 0,
	};
	let hits = wire
		.hits
		.hits
		.into_iter()
		.map(|hit| IndexHit { id: hit.id, score: hit.score, source: hit.source })
		.collect();

	Ok(IndexHits { total, hits })
}

fn parse_terms_response(json: &Value, aggregation_name: &str) -> Result<Vec<String>> {
	let buckets = json
		.get("aggregations")
		.and_then(|aggs| aggs.get(aggregation_name))
		.and_then(|agg| agg.get("buckets"))
		.and_then(Value::as_array)
		.ok_or_else(|| Error::IndexRejected {
			status: StatusCode::OK.as_u16(),
			message: format!("Aggregation response is missing {aggregation_name} buckets."),
		})?;
	let mut keys = Vec::with_capacity(buckets.len());

	for bucket in buckets {
		let key = match bucket.get("key") {
			Some(Value::String(key)) => key.trim().to_string(),
			Some(Value::Number(key)) => key.to_string(),
			_ => continue,
		};

		if !key.is_empty() {
			keys.push(key);
		}
	}

	Ok(keys)
}

/// Pulls `error.reason` out of an index error body, falling back to the raw text.
fn error_reason(body: &[u8]) -> String {
	if let Ok(json) = serde_json::from_slice::<Value>(body)
		&& let Some(reason) = json
			.get("error")
			.and_then(|error| error.get("reason").or_else(|| error.get("type")))
			.and_then(Value::as_str)
	{
		return reason.to_string();
	}

	let raw = String::from_utf8_lossy(body);

	if raw.trim().is_empty() {
		return "Index returned an empty error body.".to_string();
	}

	raw.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_hits_and_total() {
		let body = serde_json::json!({
			"hits": {
				"total": { "value": 42, "relation": "eq" },
				"hits": [
					{ "_id": "a", "_score": 3.5, "_source": { "title": "Alpha" } },
					{ "_id": "b", "_score": null }
				]
			}
		});
		let hits = parse_search_response(body.to_string().as_bytes()).expect("parse failed");

		assert_eq!(hits.total, 42);
		assert_eq!(hits.hits.len(), 2);
		assert_eq!(hits.hits[0].score, Some(3.5));
		assert_eq!(hits.hits[0].source.as_ref().and_then(|s| s["title"].as_str()), Some("Alpha"));
		assert_eq!(hits.hits[1].score, None);
		assert!(hits.hits[1].source.is_none());
	}

	#[test]
	fn legacy_numeric_total_is_accepted() {
		let body = br#"{"hits":{"total":7,"hits":[]}}"#;
		let hits = parse_search_response(body).expect("parse failed");

		assert_eq!(hits.total, 7);
	}

	#[test]
	fn missing_total_defaults_to_zero() {
		let hits = parse_search_response(br#"{"hits":{"hits":[]}}"#).expect("parse failed");

		assert_eq!(hits, IndexHits::default());
	}

	#[test]
	fn unexpected_shape_is_rejected() {
		let err = parse_search_response(br#"{"took":1}"#).expect_err("Expected rejection.");

		assert!(matches!(err, Error::IndexRejected { status: 200, .. }));
	}

	#[test]
	fn terms_skip_blank_keys_and_keep_order() {
		let json = serde_json::json!({
			"aggregations": {
				"role-agg": {
					"buckets": [
						{ "key": "Partner", "doc_count": 9 },
						{ "key": "  ", "doc_count": 4 },
						{ "key": "Coordinator", "doc_count": 2 }
					]
				}
			}
		});
		let keys = parse_terms_response(&json, "role-agg").expect("parse failed");

		assert_eq!(keys, vec!["Partner".to_string(), "Coordinator".to_string()]);
	}

	#[test]
	fn missing_aggregation_is_rejected() {
		let err = parse_terms_response(&serde_json::json!({}), "helix-agg")
			.expect_err("Expected rejection.");

		assert!(err.to_string().contains("helix-agg"));
	}

	#[test]
	fn error_reason_prefers_structured_reason() {
		let body = br#"{"error":{"type":"parsing_exception","reason":"Unknown key [mlt]"},"status":400}"#;

		assert_eq!(error_reason(body), "Unknown key [mlt]");
		assert_eq!(error_reason(b"gateway down"), "gateway down");
		assert_eq!(error_reason(b""), "Index returned an empty error body.");
	}
}
