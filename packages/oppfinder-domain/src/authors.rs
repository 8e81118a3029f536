use std::{collections::HashMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{AggregatedResult, Error, cmp_f64_desc};

/// Statistic used to order authors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AggregateStrategy {
	#[default]
	Sum,
	Max,
	Avg,
	Count,
}
impl AggregateStrategy {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Sum => "SUM",
			Self::Max => "MAX",
			Self::Avg => "AVG",
			Self::Count => "COUNT",
		}
	}
}
impl FromStr for AggregateStrategy {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		let value = raw.trim();

		[Self::Sum, Self::Max, Self::Avg, Self::Count]
			.into_iter()
			.find(|strategy| strategy.as_str().eq_ignore_ascii_case(value))
			.ok_or_else(|| Error::UnknownStrategy { value: raw.to_string() })
	}
}
impl fmt::Display for AggregateStrategy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Payloads that can be attributed to an author.
pub trait AuthoredHit {
	fn author_key(&self) -> &str;
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AuthorAggregate {
	pub author_key: String,
	pub sum_score: f64,
	pub avg_score: f64,
	pub max_score: f64,
	pub count: u32,
}
impl AuthorAggregate {
	fn from_scores(author_key: String, scores: impl Iterator<Item = f64>) -> Self {
		let mut sum_score = 0.0;
		let mut max_score = f64::NEG_INFINITY;
		let mut count = 0_u32;

		for score in scores {
			sum_score += score;
			max_score = max_score.max(score);
			count += 1;
		}

		let avg_score = if count == 0 { 0.0 } else { sum_score / f64::from(count) };

		if count == 0 {
			max_score = 0.0;
		}

		Self { author_key, sum_score, avg_score, max_score, count }
	}

	pub fn value(&self, strategy: AggregateStrategy) -> f64 {
		match strategy {
			AggregateStrategy::Sum => self.sum_score,
			AggregateStrategy::Max => self.max_score,
			AggregateStrategy::Avg => self.avg_score,
			AggregateStrategy::Count => f64::from(self.count),
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct RankedAuthor<T> {
	pub aggregate: AuthorAggregate,
	/// The author's own hits, best first.
	pub hits: Vec<AggregatedResult<T>>,
}

/// Groups hits by author, orders authors by `strategy`, and keeps the best `max_results`.
///
/// Authors tied on the selected statistic stay in first-encountered order. Hits without an
/// author key belong to no author and are ignored.
pub fn rank_authors<T>(
	results: Vec<AggregatedResult<T>>,
	strategy: AggregateStrategy,
	max_results: usize,
) -> Vec<RankedAuthor<T>>
where
	T: AuthoredHit,
{
	let mut groups: Vec<(String, Vec<AggregatedResult<T>>)> = Vec::new();
	let mut by_author: HashMap<String, usize> = HashMap::new();

	for result in results {
		let author_key = result.payload.author_key().trim();

		if author_key.is_empty() {
			continue;
		}

		match by_author.get(author_key) {
			Some(&idx) => groups[idx].1.push(result),
			None => {
				let author_key = author_key.to_string();

				by_author.insert(author_key.clone(), groups.len());
				groups.push((author_key, vec![result]));
			},
		}
	}

	let mut ranked = groups
		.into_iter()
		.map(|(author_key, hits)| RankedAuthor {
			aggregate: AuthorAggregate::from_scores(author_key, hits.iter().map(|hit| hit.score)),
			hits,
		})
		.collect::<Vec<_>>();

	ranked.sort_by(|a, b| cmp_f64_desc(a.aggregate.value(strategy), b.aggregate.value(strategy)));
	ranked.truncate(max_results);

	for author in &mut ranked {
		author.hits.sort_by(|a, b| cmp_f64_desc(a.score, b.score));
	}

	ranked
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Clone, Debug, PartialEq)]
	struct Project {
		author: &'static str,
	}
	impl AuthoredHit for Project {
		fn author_key(&self) -> &str {
			self.author
		}
	}

	fn hit(id: &str, author: &'static str, score: f64) -> AggregatedResult<Project> {
		AggregatedResult {
			document_id: id.to_string(),
			payload: Project { author },
			score,
			rank: 0,
			hit_source: "description".to_string(),
		}
	}

	fn order(ranked: &[RankedAuthor<Project>]) -> Vec<&str> {
		ranked.iter().map(|author| author.aggregate.author_key.as_str()).collect()
	}

	fn sample() -> Vec<AggregatedResult<Project>> {
		vec![hit("p1", "A", 10.0), hit("p2", "A", 20.0), hit("p3", "B", 5.0)]
	}

	#[test]
	fn aggregates_match_group_members() {
		let ranked = rank_authors(sample(), AggregateStrategy::Sum, 10);
		let a = &ranked[0].aggregate;

		assert_eq!(a.author_key, "A");
		assert_eq!(a.sum_score, 30.0);
		assert_eq!(a.max_score, 20.0);
		assert_eq!(a.avg_score, 15.0);
		assert_eq!(a.count, 2);
		assert_eq!(ranked[1].aggregate.count, 1);
	}

	#[test]
	fn every_strategy_ranks_heavier_author_first() {
		for strategy in [
			AggregateStrategy::Sum,
			AggregateStrategy::Max,
			AggregateStrategy::Avg,
			AggregateStrategy::Count,
		] {
			assert_eq!(order(&rank_authors(sample(), strategy, 10)), vec!["A", "B"]);
		}
	}

	#[test]
	fn strategy_changes_order() {
		let hits = vec![hit("p1", "u1", 10.0), hit("p2", "u1", 15.0), hit("p3", "u2", 20.0)];

		assert_eq!(order(&rank_authors(hits.clone(), AggregateStrategy::Max, 10)), vec!["u2", "u1"]);
		assert_eq!(order(&rank_authors(hits.clone(), AggregateStrategy::Avg, 10)), vec!["u2", "u1"]);
		assert_eq!(order(&rank_authors(hits.clone(), AggregateStrategy::Sum, 10)), vec!["u1", "u2"]);
		assert_eq!(order(&rank_authors(hits, AggregateStrategy::Count, 10)), vec!["u1", "u2"]);
	}

	#[test]
	fn ties_keep_first_encountered_author() {
		let hits = vec![hit("p1", "late", 1.0), hit("p2", "early", 3.0), hit("p3", "late", 2.0)];
		let ranked = rank_authors(hits, AggregateStrategy::Sum, 10);

		assert_eq!(order(&ranked), vec!["late", "early"]);
	}

	#[test]
	fn truncates_and_resorts_hits() {
		let hits = vec![hit("p1", "A", 1.0), hit("p2", "B", 50.0), hit("p3", "A", 9.0)];
		let ranked = rank_authors(hits, AggregateStrategy::Max, 1);

		assert_eq!(order(&ranked), vec!["B"]);

		let ranked = rank_authors(
			vec![hit("p1", "A", 1.0), hit("p3", "A", 9.0)],
			AggregateStrategy::Sum,
			5,
		);
		let ids = ranked[0].hits.iter().map(|hit| hit.document_id.as_str()).collect::<Vec<_>>();

		assert_eq!(ids, vec!["p3", "p1"]);
	}

	#[test]
	fn blank_author_keys_are_ignored() {
		let ranked = rank_authors(
			vec![hit("p1", " ", 99.0), hit("p2", "A", 1.0)],
			AggregateStrategy::Sum,
			5,
		);

		assert_eq!(order(&ranked), vec!["A"]);
	}

	#[test]
	fn strategy_parsing_is_closed() {
		assert_eq!("SUM".parse::<AggregateStrategy>().ok(), Some(AggregateStrategy::Sum));
		assert_eq!("avg".parse::<AggregateStrategy>().ok(), Some(AggregateStrategy::Avg));
		assert_eq!(" Count ".parse::<AggregateStrategy>().ok(), Some(AggregateStrategy::Count));
		assert!(matches!(
			"MEDIAN".parse::<AggregateStrategy>(),
			Err(Error::UnknownStrategy { value }) if value == "MEDIAN"
		));
	}
}
