use std::path::PathBuf;

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub fields: Fields,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub similarity: Similarity,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	pub index: Index,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

/// Connection settings for the external full-text/similarity index.
#[derive(Clone, Debug, Deserialize)]
pub struct Index {
	pub url: String,
	/// Index holding the funding/collaboration opportunities.
	#[serde(default = "default_opportunity_index")]
	pub opportunity_index: String,
	/// Index holding the researchers' projects.
	#[serde(default = "default_project_index")]
	pub project_index: String,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
}

/// Field names inside the indexed documents. These are configuration, not protocol.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Fields {
	pub title: String,
	pub description: String,
	pub helix: String,
	pub role: String,
	pub expertise: String,
	pub author_key: String,
	pub project_id: String,
}
impl Default for Fields {
	fn default() -> Self {
		Self {
			title: "title".to_string(),
			description: "description".to_string(),
			helix: "helix".to_string(),
			role: "role".to_string(),
			expertise: "expertise".to_string(),
			author_key: "uco".to_string(),
			project_id: "projId".to_string(),
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Search {
	/// Multiplier applied to scores from the title signal group.
	pub title_boost: f64,
	pub default_page_size: u32,
	pub max_page_size: u32,
	/// Hit window requested from the index for every similarity query.
	pub max_docs_size: u32,
	pub recommendation_size: u32,
	pub max_agg_size: u32,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			title_boost: 2.0,
			default_page_size: 20,
			max_page_size: 100,
			max_docs_size: 100,
			recommendation_size: 20,
			max_agg_size: 500,
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Similarity {
	pub max_query_terms: u32,
	pub min_doc_freq: u32,
	pub min_term_freq: u32,
	pub minimum_should_match: String,
	/// Optional. One stop word per line; absent means no stop words are sent to the index.
	pub stop_words_path: Option<PathBuf>,
}
impl Default for Similarity {
	fn default() -> Self {
		Self {
			max_query_terms: 50,
			min_doc_freq: 1,
			min_term_freq: 1,
			minimum_should_match: "10%".to_string(),
			stop_words_path: None,
		}
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_opportunity_index() -> String {
	"crowdhelix_data".to_string()
}

fn default_project_index() -> String {
	"mu_data".to_string()
}

fn default_timeout_ms() -> u64 {
	10_000
}
