/// Hybrid scorer: weighted combination of normalized signals
///
/// Takes the canonical retrieval batch, extracts the four raw signals per
/// candidate, normalizes each signal column across the whole batch, and
/// combines them via the intent-resolved weights into one hybrid score per
/// candidate. Scoring is all-or-nothing per call: a malformed batch yields
/// a single `Ranker` error, never a partial list.

use serde::{Deserialize, Serialize};

use crate::errors::ApiRankError;
use crate::ranking::signals::{
    self, min_max_normalize, prescale_similarity, Record,
};
use crate::ranking::weights::{SignalWeights, WeightProfiles};

/// One candidate after scoring: normalized signals in [0, 1], the weighted
/// hybrid score, and the original metadata payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedRecord {
    pub id: String,
    pub similarity: f64,
    pub doc_quality: f64,
    pub recency: f64,
    pub popularity: f64,
    pub hybrid_score: f64,
    pub metadata: Record,
}

/// Scorer output: the resolved weights plus candidates sorted by
/// hybrid_score descending (stable — ties keep input order).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankOutput {
    pub weights: SignalWeights,
    pub ranked: Vec<RankedRecord>,
}

/// Hybrid scorer over an immutable weight-profile table.
#[derive(Debug, Clone, Default)]
pub struct HybridScorer {
    profiles: WeightProfiles,
}

impl HybridScorer {
    pub fn new(profiles: WeightProfiles) -> Self {
        HybridScorer { profiles }
    }

    /// Score and rank a retrieval batch for the given intent.
    ///
    /// Batch size is max(records, scores); the shorter side is padded with
    /// neutral defaults (empty record / 0.0 score) — no candidate is ever
    /// dropped here. An empty batch returns an empty ranked list with the
    /// resolved weights still populated.
    pub fn score(
        &self,
        records: &[Record],
        sim_scores: &[f64],
        intent: Option<&str>,
    ) -> Result<RankOutput, ApiRankError> {
        let weights = self.profiles.resolve(intent);
        let n = records.len().max(sim_scores.len());
        if n == 0 {
            return Ok(RankOutput {
                weights,
                ranked: Vec::new(),
            });
        }

        let empty = Record::new();
        let record_at = |i: usize| records.get(i).unwrap_or(&empty);

        // Raw signal columns, padded to n
        let raw_sim: Vec<f64> = (0..n)
            .map(|i| prescale_similarity(sim_scores.get(i).copied().unwrap_or(0.0)))
            .collect();
        let raw_quality: Vec<f64> = (0..n).map(|i| signals::quality_signal(record_at(i))).collect();
        let raw_pop: Vec<f64> = (0..n).map(|i| signals::popularity_signal(record_at(i))).collect();
        let raw_recency: Vec<f64> = (0..n).map(|i| signals::recency_signal(record_at(i))).collect();

        for col in [&raw_sim, &raw_quality, &raw_pop, &raw_recency] {
            if col.iter().any(|v| !v.is_finite()) {
                return Err(ApiRankError::Ranker(
                    "non-finite signal value in batch".to_string(),
                ));
            }
        }

        let sim_norm = min_max_normalize(&raw_sim);
        let q_norm = min_max_normalize(&raw_quality);
        let pop_norm = min_max_normalize(&raw_pop);
        let rec_norm = min_max_normalize(&raw_recency);

        let mut ranked: Vec<RankedRecord> = (0..n)
            .map(|i| {
                let hybrid = weights.similarity * sim_norm[i]
                    + weights.doc_quality * q_norm[i]
                    + weights.recency * rec_norm[i]
                    + weights.popularity * pop_norm[i];
                let md = record_at(i);
                RankedRecord {
                    id: record_id(md, i),
                    similarity: round6(sim_norm[i]),
                    doc_quality: round6(q_norm[i]),
                    recency: round6(rec_norm[i]),
                    popularity: round6(pop_norm[i]),
                    hybrid_score: round6(hybrid),
                    metadata: md.clone(),
                }
            })
            .collect();

        // Stable sort: ties keep input-relative order
        ranked.sort_by(|a, b| {
            b.hybrid_score
                .partial_cmp(&a.hybrid_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(RankOutput { weights, ranked })
    }
}

/// Candidate id from the usual id fields, else a synthesized positional one.
fn record_id(record: &Record, index: usize) -> String {
    for key in ["id", "doc_id", "api_id"] {
        match record.get(key) {
            Some(serde_json::Value::String(s)) if !s.is_empty() => return s.clone(),
            Some(serde_json::Value::Number(n)) => return n.to_string(),
            _ => {}
        }
    }
    format!("doc_{}", index)
}

fn round6(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(v: serde_json::Value) -> Vec<Record> {
        v.as_array()
            .unwrap()
            .iter()
            .map(|r| r.as_object().unwrap().clone())
            .collect()
    }

    fn scorer() -> HybridScorer {
        HybridScorer::default()
    }

    #[test]
    fn test_empty_batch_returns_weights_and_no_records() {
        let out = scorer().score(&[], &[], Some("latest")).unwrap();
        assert!(out.ranked.is_empty());
        assert!((out.weights.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_batch_size_is_max_of_both_sides() {
        let recs = records(json!([{"id": "a"}, {"id": "b"}]));
        // more scores than records: padded with empty records
        let out = scorer().score(&recs, &[0.9, 0.8, 0.7, 0.6], None).unwrap();
        assert_eq!(out.ranked.len(), 4);
        // more records than scores: padded with 0.0 scores
        let out = scorer().score(&recs, &[0.9], None).unwrap();
        assert_eq!(out.ranked.len(), 2);
    }

    #[test]
    fn test_padded_candidates_get_synthesized_ids() {
        let out = scorer().score(&[], &[0.5, 0.4], None).unwrap();
        let ids: Vec<&str> = out.ranked.iter().map(|r| r.id.as_str()).collect();
        assert!(ids.contains(&"doc_0"));
        assert!(ids.contains(&"doc_1"));
    }

    #[test]
    fn test_popularity_intent_dominates_on_similarity_tie() {
        let recs = records(json!([
            {"id": "a", "doc_quality": 1.0, "popularity": 0.0, "last_updated": "2024-01-01"},
            {"id": "b", "doc_quality": 0.0, "popularity": 1.0, "last_updated": "2024-01-01"},
        ]));
        let out = scorer().score(&recs, &[0.9, 0.9], Some("popular")).unwrap();
        assert_eq!(out.ranked[0].id, "b");
        assert_eq!(out.ranked[1].id, "a");
    }

    #[test]
    fn test_latest_intent_prefers_newer() {
        let recs = records(json!([
            {"id": "old", "last_updated": "2020-01-01", "popularity": 100},
            {"id": "new", "last_updated": "2024-06-01", "popularity": 0},
        ]));
        let out = scorer().score(&recs, &[0.8, 0.8], Some("latest")).unwrap();
        assert_eq!(out.ranked[0].id, "new");
    }

    #[test]
    fn test_ranking_is_deterministic() {
        let recs = records(json!([
            {"id": "a", "doc_quality": 0.3, "popularity": 12},
            {"id": "b", "doc_quality": 0.9, "popularity": 3},
            {"id": "c", "doc_quality": 0.5, "popularity": 7},
        ]));
        let first = scorer().score(&recs, &[0.7, 0.6, 0.9], Some("recommend")).unwrap();
        let second = scorer().score(&recs, &[0.7, 0.6, 0.9], Some("recommend")).unwrap();
        let ids = |o: &RankOutput| o.ranked.iter().map(|r| r.id.clone()).collect::<Vec<_>>();
        let hybrids = |o: &RankOutput| o.ranked.iter().map(|r| r.hybrid_score).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(hybrids(&first), hybrids(&second));
    }

    #[test]
    fn test_ties_keep_input_order() {
        // Identical candidates: every signal degenerates to 0.5, all hybrid
        // scores equal, so the stable sort must preserve input order.
        let recs = records(json!([
            {"id": "first", "doc_quality": 0.5},
            {"id": "second", "doc_quality": 0.5},
            {"id": "third", "doc_quality": 0.5},
        ]));
        let out = scorer().score(&recs, &[0.5, 0.5, 0.5], None).unwrap();
        let ids: Vec<&str> = out.ranked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_normalized_signals_within_unit_interval() {
        let recs = records(json!([
            {"id": "a", "popularity": 5000, "doc_quality": 0.1, "last_updated": "2021-03-04"},
            {"id": "b", "popularity": 3, "doc_quality": 0.8, "last_updated": "2023-11-30"},
            {"id": "c"},
        ]));
        let out = scorer().score(&recs, &[0.95, -0.2, 0.1], None).unwrap();
        for r in &out.ranked {
            for v in [r.similarity, r.doc_quality, r.recency, r.popularity] {
                assert!((0.0..=1.0).contains(&v), "{} out of range", v);
            }
        }
    }

    #[test]
    fn test_non_finite_similarity_is_a_ranker_error() {
        let recs = records(json!([{"id": "a"}]));
        let err = scorer().score(&recs, &[f64::NAN], None).unwrap_err();
        assert_eq!(err.code(), "RANKER_ERROR");
    }

    #[test]
    fn test_numeric_id_field_is_stringified() {
        let recs = records(json!([{"id": 42}]));
        let out = scorer().score(&recs, &[0.5], None).unwrap();
        assert_eq!(out.ranked[0].id, "42");
    }

    #[test]
    fn test_hybrid_score_rounded_to_six_decimals() {
        let recs = records(json!([
            {"id": "a", "popularity": 1},
            {"id": "b", "popularity": 2},
            {"id": "c", "popularity": 3},
        ]));
        let out = scorer().score(&recs, &[0.1, 0.2, 0.3], None).unwrap();
        for r in &out.ranked {
            let rescaled = r.hybrid_score * 1e6;
            assert!((rescaled - rescaled.round()).abs() < 1e-6);
        }
    }
}
