use std::{cmp::Ordering, collections::HashMap};

use serde::Serialize;

use oppfinder_config::Config;

/// Tag set when more than one signal group matched the same document.
pub const MULTI_SIGNAL_HIT_SOURCE: &str = "doc and title";
/// Suffix appended to the hit source of a result reinforced by a recommendation.
pub const RECOMMENDATION_SUFFIX: &str = " (+recommendation)";

/// A hit returned by one index query. Identity is the index-assigned `document_id`.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredHit<T> {
	pub document_id: String,
	pub score: Option<f64>,
	pub payload: T,
}

/// Hits of one signal group, e.g. the title-weighted or the body query.
#[derive(Clone, Debug, PartialEq)]
pub struct HitGroup<T> {
	pub name: String,
	pub hits: Vec<ScoredHit<T>>,
}
impl<T> HitGroup<T> {
	pub fn new(name: impl Into<String>, hits: Vec<ScoredHit<T>>) -> Self {
		Self { name: name.into(), hits }
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AggregatedResult<T> {
	pub document_id: String,
	#[serde(flatten)]
	pub payload: T,
	pub score: f64,
	/// 1-based position after the final sort. Zero means not ranked yet.
	pub rank: u32,
	pub hit_source: String,
}
impl<T> AggregatedResult<T> {
	/// Keeps the index order and assigns ranks 1..N without re-sorting.
	pub fn ranked_in_order(hits: Vec<ScoredHit<T>>, hit_source: &str) -> Vec<Self> {
		hits.into_iter()
			.filter_map(|hit| {
				hit.score.map(|score| Self {
					document_id: hit.document_id,
					payload: hit.payload,
					score,
					rank: 0,
					hit_source: hit_source.to_string(),
				})
			})
			.enumerate()
			.map(|(idx, mut result)| {
				result.rank = idx as u32 + 1;

				result
			})
			.collect()
	}
}

/// Merges named hit groups into one deduplicated, weighted, ranked list.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultAggregator {
	title_group: String,
	title_boost: f64,
}
impl ResultAggregator {
	pub fn new(title_group: impl Into<String>, title_boost: f64) -> Self {
		Self { title_group: title_group.into(), title_boost }
	}

	pub fn from_config(cfg: &Config) -> Self {
		Self::new(cfg.fields.title.clone(), cfg.search.title_boost)
	}

	pub fn title_group(&self) -> &str {
		&self.title_group
	}

	pub fn weight(&self, group: &str) -> f64 {
		if group == self.title_group { self.title_boost } else { 1.0 }
	}

	/// Sums `score × weight(group)` per document across all groups.
	///
	/// Any repeat of a document id, even within one group, marks it as a multi-signal match.
	/// Documents that never received a score are dropped. Ties keep the order in which documents
	/// were first seen, walking the groups in the given order.
	pub fn aggregate_by_score<T>(&self, groups: Vec<HitGroup<T>>) -> Vec<AggregatedResult<T>> {
		struct Accumulated<T> {
			document_id: String,
			payload: T,
			score: Option<f64>,
			hit_source: String,
		}

		let mut entries: Vec<Accumulated<T>> = Vec::new();
		let mut by_id: HashMap<String, usize> = HashMap::new();

		for group in groups {
			let weight = self.weight(&group.name);

			for hit in group.hits {
				let weighted = hit.score.map(|score| score * weight);

				match by_id.get(&hit.document_id) {
					Some(&idx) => {
						let entry = &mut entries[idx];

						entry.score = match (entry.score, weighted) {
							(Some(total), Some(score)) => Some(total + score),
							(total, score) => total.or(score),
						};

						entry.hit_source = MULTI_SIGNAL_HIT_SOURCE.to_string();
					},
					None => {
						by_id.insert(hit.document_id.clone(), entries.len());
						entries.push(Accumulated {
							document_id: hit.document_id,
							payload: hit.payload,
							score: weighted,
							hit_source: group.name.clone(),
						});
					},
				}
			}
		}

		let results = entries
			.into_iter()
			.filter_map(|entry| {
				entry.score.map(|score| AggregatedResult {
					document_id: entry.document_id,
					payload: entry.payload,
					score,
					rank: 0,
					hit_source: entry.hit_source,
				})
			})
			.collect();

		rank(results)
	}

	/// Adds recommendation scores onto matching primary results.
	///
	/// Membership of `primary` never changes: recommendations for documents outside it are ignored.
	pub fn merge_recommendations<T, R>(
		&self,
		primary: Vec<AggregatedResult<T>>,
		recommendations: &[AggregatedResult<R>],
	) -> Vec<AggregatedResult<T>> {
		if primary.is_empty() {
			return primary;
		}

		let mut boosts: HashMap<&str, Vec<f64>> = HashMap::new();

		for recommendation in recommendations {
			boosts.entry(recommendation.document_id.as_str()).or_default().push(recommendation.score);
		}

		let merged = primary
			.into_iter()
			.map(|mut result| {
				if let Some(scores) = boosts.get(result.document_id.as_str()) {
					for score in scores {
						result.score += score;
						result.hit_source.push_str(RECOMMENDATION_SUFFIX);
					}
				}

				result
			})
			.collect();

		rank(merged)
	}
}

/// NaN-safe descending comparator. NaN sorts last.
pub fn cmp_f64_desc(a: f64, b: f64) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}

fn rank<T>(mut results: Vec<AggregatedResult<T>>) -> Vec<AggregatedResult<T>> {
	// `sort_by` is stable, which keeps first-seen order for equal scores.
	results.sort_by(|a, b| cmp_f64_desc(a.score, b.score));

	for (idx, result) in results.iter_mut().enumerate() {
		result.rank = idx as u32 + 1;
	}

	results
}

#[cfg(test)]
mod tests {
	use super::*;

	fn hit(id: &str, score: f64) -> ScoredHit<()> {
		ScoredHit { document_id: id.to_string(), score: Some(score), payload: () }
	}

	fn result(id: &str, score: f64) -> AggregatedResult<()> {
		AggregatedResult {
			document_id: id.to_string(),
			payload: (),
			score,
			rank: 0,
			hit_source: "description".to_string(),
		}
	}

	fn aggregator() -> ResultAggregator {
		ResultAggregator::new("title", 2.0)
	}

	fn summary<T>(results: &[AggregatedResult<T>]) -> Vec<(&str, f64, u32)> {
		results.iter().map(|r| (r.document_id.as_str(), r.score, r.rank)).collect()
	}

	#[test]
	fn title_hits_are_boosted_and_merged() {
		let results = aggregator().aggregate_by_score(vec![
			HitGroup::new("title", vec![hit("1", 2.0)]),
			HitGroup::new("description", vec![hit("1", 13.0), hit("2", 10.0)]),
		]);

		assert_eq!(summary(&results), vec![("1", 17.0, 1), ("2", 10.0, 2)]);
		assert_eq!(results[0].hit_source, MULTI_SIGNAL_HIT_SOURCE);
		assert_eq!(results[1].hit_source, "description");
	}

	#[test]
	fn boosted_title_can_overtake_body_score() {
		let results = aggregator().aggregate_by_score(vec![
			HitGroup::new("description", vec![hit("1", 13.0), hit("2", 10.0)]),
			HitGroup::new("title", vec![hit("1", 2.0), hit("2", 5.0)]),
		]);

		assert_eq!(summary(&results), vec![("2", 20.0, 1), ("1", 17.0, 2)]);
	}

	#[test]
	fn ties_keep_first_seen_order() {
		let results = aggregator().aggregate_by_score(vec![
			HitGroup::new("description", vec![hit("b", 4.0), hit("a", 4.0)]),
			HitGroup::new("title", vec![hit("c", 2.0)]),
		]);

		assert_eq!(summary(&results), vec![("b", 4.0, 1), ("a", 4.0, 2), ("c", 4.0, 3)]);
	}

	#[test]
	fn missing_scores_are_dropped_but_zero_is_kept() {
		let results = aggregator().aggregate_by_score(vec![HitGroup::new(
			"description",
			vec![
				ScoredHit { document_id: "none".to_string(), score: None, payload: () },
				hit("zero", 0.0),
			],
		)]);

		assert_eq!(summary(&results), vec![("zero", 0.0, 1)]);
	}

	#[test]
	fn missing_score_does_not_erase_other_group() {
		let results = aggregator().aggregate_by_score(vec![
			HitGroup::new(
				"title",
				vec![ScoredHit { document_id: "1".to_string(), score: None, payload: () }],
			),
			HitGroup::new("description", vec![hit("1", 3.0)]),
		]);

		assert_eq!(summary(&results), vec![("1", 3.0, 1)]);
	}

	#[test]
	fn repeat_within_one_group_is_multi_signal() {
		let results = aggregator().aggregate_by_score(vec![HitGroup::new(
			"description",
			vec![hit("1", 1.0), hit("1", 2.0), hit("2", 0.5)],
		)]);

		assert_eq!(summary(&results), vec![("1", 3.0, 1), ("2", 0.5, 2)]);
		assert_eq!(results[0].hit_source, MULTI_SIGNAL_HIT_SOURCE);
		assert_eq!(results[1].hit_source, "description");
	}

	#[test]
	fn empty_groups_yield_empty_result() {
		assert!(aggregator().aggregate_by_score::<()>(Vec::new()).is_empty());
		assert!(
			aggregator()
				.aggregate_by_score(vec![HitGroup::<()>::new("title", Vec::new())])
				.is_empty()
		);
	}

	#[test]
	fn ranks_are_contiguous_and_scores_descend() {
		let results = aggregator().aggregate_by_score(vec![
			HitGroup::new("description", vec![hit("1", 1.0), hit("2", 9.0), hit("3", 4.5)]),
			HitGroup::new("title", vec![hit("3", 3.0), hit("4", 0.5)]),
		]);

		for (idx, pair) in results.windows(2).enumerate() {
			assert!(pair[0].score >= pair[1].score);
			assert_eq!(pair[0].rank, idx as u32 + 1);
		}

		assert_eq!(results.last().map(|r| r.rank), Some(results.len() as u32));
	}

	#[test]
	fn recommendations_only_reinforce_primary_members() {
		let primary = vec![result("1", 10.0), result("2", 8.0), result("3", 7.0)];
		let recommendations = vec![result("3", 6.0), result("1", 2.0), result("4", 8.0)];
		let merged = aggregator().merge_recommendations(primary, &recommendations);

		assert_eq!(summary(&merged), vec![("3", 13.0, 1), ("1", 12.0, 2), ("2", 8.0, 3)]);
		assert_eq!(merged[0].hit_source, "description (+recommendation)");
		assert_eq!(merged[2].hit_source, "description");
	}

	#[test]
	fn merging_into_empty_primary_is_empty() {
		let recommendations = vec![result("1", 5.0)];

		assert!(aggregator().merge_recommendations::<(), ()>(Vec::new(), &recommendations).is_empty());
	}

	#[test]
	fn in_order_ranking_keeps_index_order() {
		let results = AggregatedResult::ranked_in_order(
			vec![
				hit("x", 3.0),
				ScoredHit { document_id: "y".to_string(), score: None, payload: () },
				hit("z", 5.0),
			],
			"phrase",
		);

		assert_eq!(summary(&results), vec![("x", 3.0, 1), ("z", 5.0, 2)]);
	}

	#[test]
	fn nan_sorts_last() {
		let mut scores = vec![f64::NAN, 1.0, 3.0];

		scores.sort_by(|a, b| cmp_f64_desc(*a, *b));

		assert_eq!(scores[0], 3.0);
		assert_eq!(scores[1], 1.0);
		assert!(scores[2].is_nan());
	}
}
