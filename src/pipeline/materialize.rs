/// Result materialization: ranked records to the canonical output shape
///
/// Each ranked record is validated through a serde round trip into
/// `RankedDocument` (absent numerics default to 0.0, absent metadata to an
/// empty map). A conversion failure for one record never aborts the batch —
/// the fallback builds a minimally populated document from best-effort field
/// access, so the output always contains exactly as many documents as ranked
/// records.

use serde::{Deserialize, Serialize};

use crate::ranking::signals::Record;
use crate::ranking::RankedRecord;

/// Canonical output document with a validated, defaulted field set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedDocument {
    #[serde(default = "default_id")]
    pub id: String,
    #[serde(default)]
    pub similarity: f64,
    #[serde(default)]
    pub doc_quality: f64,
    #[serde(default)]
    pub recency: f64,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub hybrid_score: f64,
    #[serde(default)]
    pub metadata: Record,
}

fn default_id() -> String {
    "unknown".to_string()
}

/// Materialize a whole ranked batch. Output length always equals input length.
pub fn materialize_all(ranked: &[RankedRecord]) -> Vec<RankedDocument> {
    ranked.iter().map(materialize_one).collect()
}

/// Materialize one record, falling back to best-effort field access when the
/// serde round trip fails (e.g. a non-finite score serializing to null).
pub fn materialize_one(record: &RankedRecord) -> RankedDocument {
    serde_json::to_value(record)
        .and_then(serde_json::from_value)
        .unwrap_or_else(|_| fallback_document(record))
}

fn fallback_document(record: &RankedRecord) -> RankedDocument {
    RankedDocument {
        id: record.id.clone(),
        similarity: finite_or_zero(record.similarity),
        doc_quality: finite_or_zero(record.doc_quality),
        recency: finite_or_zero(record.recency),
        popularity: finite_or_zero(record.popularity),
        hybrid_score: finite_or_zero(record.hybrid_score),
        metadata: record.metadata.clone(),
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(hybrid: f64) -> RankedRecord {
        RankedRecord {
            id: "a".to_string(),
            similarity: 0.5,
            doc_quality: 0.5,
            recency: 0.5,
            popularity: 0.5,
            hybrid_score: hybrid,
            metadata: Record::new(),
        }
    }

    #[test]
    fn test_materialize_preserves_fields() {
        let doc = materialize_one(&ranked(0.75));
        assert_eq!(doc.id, "a");
        assert_eq!(doc.hybrid_score, 0.75);
        assert!(doc.metadata.is_empty());
    }

    #[test]
    fn test_non_finite_score_falls_back_to_zero() {
        // NaN serializes to null, which fails f64 deserialization; the
        // fallback path must still produce a document
        let doc = materialize_one(&ranked(f64::NAN));
        assert_eq!(doc.id, "a");
        assert_eq!(doc.hybrid_score, 0.0);
        assert_eq!(doc.similarity, 0.5);
    }

    #[test]
    fn test_batch_count_is_preserved() {
        let batch = vec![ranked(0.1), ranked(f64::INFINITY), ranked(0.3)];
        assert_eq!(materialize_all(&batch).len(), 3);
    }
}
