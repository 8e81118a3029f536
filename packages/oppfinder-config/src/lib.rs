mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Fields, Index, Postgres, Search, Service, Similarity, Storage};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	for (label, value) in [
		("service.http_bind", &cfg.service.http_bind),
		("storage.postgres.dsn", &cfg.storage.postgres.dsn),
		("storage.index.url", &cfg.storage.index.url),
		("storage.index.opportunity_index", &cfg.storage.index.opportunity_index),
		("storage.index.project_index", &cfg.storage.index.project_index),
		("fields.title", &cfg.fields.title),
		("fields.description", &cfg.fields.description),
		("fields.helix", &cfg.fields.helix),
		("fields.role", &cfg.fields.role),
		("fields.expertise", &cfg.fields.expertise),
		("fields.author_key", &cfg.fields.author_key),
		("fields.project_id", &cfg.fields.project_id),
	] {
		if value.is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.index.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "storage.index.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if !cfg.search.title_boost.is_finite() {
		return Err(Error::Validation {
			message: "search.title_boost must be a finite number.".to_string(),
		});
	}
	if cfg.search.title_boost <= 0.0 {
		return Err(Error::Validation {
			message: "search.title_boost must be greater than zero.".to_string(),
		});
	}
	if cfg.search.default_page_size == 0 {
		return Err(Error::Validation {
			message: "search.default_page_size must be greater than zero.".to_string(),
		});
	}
	if cfg.search.default_page_size > cfg.search.max_page_size {
		return Err(Error::Validation {
			message: "search.default_page_size must be less than or equal to search.max_page_size."
				.to_string(),
		});
	}

	for (label, value) in [
		("search.max_docs_size", cfg.search.max_docs_size),
		("search.recommendation_size", cfg.search.recommendation_size),
		("search.max_agg_size", cfg.search.max_agg_size),
		("similarity.max_query_terms", cfg.similarity.max_query_terms),
	] {
		if value == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	if !is_valid_minimum_should_match(&cfg.similarity.minimum_should_match) {
		return Err(Error::Validation {
			message: "similarity.minimum_should_match must be a percentage in the range 0%-100% or a non-negative integer."
				.to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	for value in [
		&mut cfg.service.http_bind,
		&mut cfg.service.log_level,
		&mut cfg.storage.postgres.dsn,
		&mut cfg.storage.index.url,
		&mut cfg.storage.index.opportunity_index,
		&mut cfg.storage.index.project_index,
		&mut cfg.fields.title,
		&mut cfg.fields.description,
		&mut cfg.fields.helix,
		&mut cfg.fields.role,
		&mut cfg.fields.expertise,
		&mut cfg.fields.author_key,
		&mut cfg.fields.project_id,
		&mut cfg.similarity.minimum_should_match,
	] {
		let trimmed = value.trim();

		if trimmed.len() != value.len() {
			*value = trimmed.to_string();
		}
	}

	// The index URL is joined with "/{index}/_search".
	while cfg.storage.index.url.ends_with('/') {
		cfg.storage.index.url.pop();
	}

	if cfg
		.similarity
		.stop_words_path
		.as_deref()
		.map(|path| path.as_os_str().is_empty())
		.unwrap_or(false)
	{
		cfg.similarity.stop_words_path = None;
	}
}

fn is_valid_minimum_should_match(raw: &str) -> bool {
	match raw.strip_suffix('%') {
		Some(percent) => percent.parse::<u8>().map(|value| value <= 100).unwrap_or(false),
		None => raw.parse::<u32>().is_ok(),
	}
}
