/// Defensive adapter for raw retriever output
///
/// Classifies the unconstrained JSON a retriever returns into an explicit
/// sum type, then produces the canonical (records, scores) batch with an
/// exhaustive match. Unknown shapes silently degrade to an empty batch —
/// the fail-soft policy is an explicit, testable branch, and this function
/// never errors.

use serde_json::Value;

use crate::ranking::signals::Record;
use crate::retrieval::RetrievalBatch;

/// The shapes the adapter accepts from a retriever.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRetrieval {
    /// `[records, scores]` — the documented contract.
    Pair(Value, Value),
    /// A bare array of records; scores synthesized downstream.
    RecordsOnly(Vec<Value>),
    /// `null` or an empty array.
    Empty,
    /// Anything else — degraded to an empty batch.
    Unknown,
}

/// Classify a raw JSON value into one of the accepted shapes.
pub fn classify(raw: Value) -> RawRetrieval {
    match raw {
        Value::Null => RawRetrieval::Empty,
        Value::Array(items) => match items.len() {
            0 => RawRetrieval::Empty,
            2 => {
                let mut it = items.into_iter();
                // Both slots opaque here; coercion happens per side below
                RawRetrieval::Pair(it.next().unwrap_or(Value::Null), it.next().unwrap_or(Value::Null))
            }
            _ => RawRetrieval::RecordsOnly(items),
        },
        _ => RawRetrieval::Unknown,
    }
}

/// Normalize raw retriever output into the canonical batch.
pub fn normalize_output(raw: Value) -> RetrievalBatch {
    match classify(raw) {
        RawRetrieval::Pair(records, scores) => RetrievalBatch {
            records: coerce_records(records),
            scores: coerce_scores(scores),
        },
        RawRetrieval::RecordsOnly(items) => RetrievalBatch {
            records: items.into_iter().map(coerce_record).collect(),
            scores: Vec::new(),
        },
        RawRetrieval::Empty | RawRetrieval::Unknown => RetrievalBatch::default(),
    }
}

/// Coerce the records slot of a pair: null → empty, array → element-wise,
/// single object → one-element list.
fn coerce_records(value: Value) -> Vec<Record> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.into_iter().map(coerce_record).collect(),
        Value::Object(map) => vec![map],
        _ => Vec::new(),
    }
}

/// Non-object entries become empty records so batch count is preserved.
fn coerce_record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}

/// Coerce the scores slot of a pair: null → empty, array → numeric
/// element-wise (non-numeric entries become 0.0), single number → one-element
/// list.
fn coerce_scores(value: Value) -> Vec<f64> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .into_iter()
            .map(|v| v.as_f64().unwrap_or(0.0))
            .collect(),
        Value::Number(n) => vec![n.as_f64().unwrap_or(0.0)],
        _ => Vec::new(),
    }
}
