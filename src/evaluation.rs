/// Ranking quality metrics for the evaluate pipeline
///
/// Standard top-k retrieval metrics over predicted id lists vs. a set of
/// relevant ids: precision@k, recall@k, and binary-gain NDCG@k. All pure
/// functions; degenerate inputs (k = 0, empty relevant set) return 0.0
/// instead of panicking.

use std::collections::HashSet;

pub fn precision_at_k(predicted: &[String], relevant: &[String], k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let relevant: HashSet<&str> = relevant.iter().map(String::as_str).collect();
    let hits = predicted
        .iter()
        .take(k)
        .filter(|p| relevant.contains(p.as_str()))
        .count();
    hits as f64 / k as f64
}

pub fn recall_at_k(predicted: &[String], relevant: &[String], k: usize) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    let relevant_set: HashSet<&str> = relevant.iter().map(String::as_str).collect();
    let hits = predicted
        .iter()
        .take(k)
        .filter(|p| relevant_set.contains(p.as_str()))
        .count();
    hits as f64 / relevant_set.len() as f64
}

/// NDCG@k with binary gain: 1 if the predicted id is relevant, else 0.
/// Returns 0.0 when no relevant id appears in the top k (zero ideal DCG).
pub fn ndcg_at_k(predicted: &[String], relevant: &[String], k: usize) -> f64 {
    let relevant: HashSet<&str> = relevant.iter().map(String::as_str).collect();
    let gains: Vec<f64> = predicted
        .iter()
        .take(k)
        .map(|p| if relevant.contains(p.as_str()) { 1.0 } else { 0.0 })
        .collect();

    let mut ideal = gains.clone();
    ideal.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    let ideal_dcg = dcg(&ideal);
    if ideal_dcg == 0.0 {
        return 0.0;
    }
    dcg(&gains) / ideal_dcg
}

fn dcg(gains: &[f64]) -> f64 {
    gains
        .iter()
        .enumerate()
        .map(|(i, g)| (2f64.powf(*g) - 1.0) / ((i + 2) as f64).log2())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_precision_at_k() {
        let predicted = ids(&["a", "b", "c", "d"]);
        let relevant = ids(&["a", "c", "z"]);
        assert!((precision_at_k(&predicted, &relevant, 4) - 0.5).abs() < 1e-10);
        assert!((precision_at_k(&predicted, &relevant, 1) - 1.0).abs() < 1e-10);
        assert_eq!(precision_at_k(&predicted, &relevant, 0), 0.0);
    }

    #[test]
    fn test_recall_at_k() {
        let predicted = ids(&["a", "b", "c"]);
        let relevant = ids(&["a", "c", "z"]);
        assert!((recall_at_k(&predicted, &relevant, 3) - 2.0 / 3.0).abs() < 1e-10);
        assert_eq!(recall_at_k(&predicted, &[], 3), 0.0);
    }

    #[test]
    fn test_ndcg_perfect_ranking_is_one() {
        let predicted = ids(&["a", "b", "c"]);
        let relevant = ids(&["a", "b"]);
        assert!((ndcg_at_k(&predicted, &relevant, 3) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_ndcg_penalizes_late_hits() {
        let relevant = ids(&["a"]);
        let early = ndcg_at_k(&ids(&["a", "x", "y"]), &relevant, 3);
        let late = ndcg_at_k(&ids(&["x", "y", "a"]), &relevant, 3);
        assert!((early - 1.0).abs() < 1e-10);
        assert!(late < early);
        assert!(late > 0.0);
    }

    #[test]
    fn test_ndcg_no_hits_is_zero() {
        assert_eq!(ndcg_at_k(&ids(&["x", "y"]), &ids(&["a"]), 2), 0.0);
    }
}
