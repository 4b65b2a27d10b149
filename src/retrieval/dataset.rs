/// File-backed dataset retriever
///
/// Loads a JSON array of API records once and scores candidates by
/// case-insensitive token overlap between the query and each record's name
/// and description. Stands in for the real vector retriever in the CLI and
/// tests — same loose contract, no index or embeddings required.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::ranking::signals::Record;
use crate::retrieval::Retriever;

pub struct DatasetRetriever {
    records: Vec<Record>,
}

impl DatasetRetriever {
    /// Load the dataset from a JSON file containing an array of objects.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset from '{}'", path.display()))?;
        let value: Value = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse dataset JSON from '{}'", path.display()))?;
        let records = value
            .as_array()
            .context("Dataset root must be a JSON array")?
            .iter()
            .filter_map(|v| v.as_object().cloned())
            .collect::<Vec<Record>>();

        tracing::info!(count = records.len(), path = %path.display(), "Dataset loaded");
        Ok(DatasetRetriever { records })
    }

    /// Build a retriever directly from records (tests, in-memory datasets).
    pub fn from_records(records: Vec<Record>) -> Self {
        DatasetRetriever { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl Retriever for DatasetRetriever {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Value, anyhow::Error> {
        if query.trim().is_empty() {
            anyhow::bail!("Query must be a non-empty string");
        }

        let query_tokens = tokenize(query);
        let mut scored: Vec<(usize, f64)> = self
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| (i, overlap_score(&query_tokens, r)))
            .collect();

        // Highest overlap first; index tiebreak keeps the order deterministic
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(top_k);

        let records: Vec<Value> = scored
            .iter()
            .map(|(i, _)| Value::Object(self.records[*i].clone()))
            .collect();
        let scores: Vec<f64> = scored.iter().map(|(_, s)| *s).collect();

        Ok(json!([records, scores]))
    }
}

fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Fraction of query tokens appearing in the record's name + description.
fn overlap_score(query_tokens: &HashSet<String>, record: &Record) -> f64 {
    if query_tokens.is_empty() {
        return 0.0;
    }
    let mut text = String::new();
    for key in ["name", "api_name", "description", "summary"] {
        if let Some(s) = record.get(key).and_then(Value::as_str) {
            text.push_str(s);
            text.push(' ');
        }
    }
    let record_tokens = tokenize(&text);
    let hits = query_tokens.intersection(&record_tokens).count();
    hits as f64 / query_tokens.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> DatasetRetriever {
        let records = json!([
            {"id": "auth", "name": "Auth API", "description": "user authentication and token generation"},
            {"id": "weather", "name": "Weather API", "description": "current weather forecasts"},
            {"id": "pay", "name": "Payments API", "description": "payment processing"},
        ]);
        DatasetRetriever::from_records(
            records
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v.as_object().unwrap().clone())
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_retrieve_returns_pair_shape() {
        let raw = sample().retrieve("user authentication", 2).await.unwrap();
        let batch = crate::retrieval::normalize_output(raw);
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.scores.len(), 2);
        assert_eq!(batch.records[0]["id"], "auth");
        assert!(batch.scores[0] > batch.scores[1]);
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected() {
        assert!(sample().retrieve("   ", 5).await.is_err());
    }

    #[tokio::test]
    async fn test_top_k_truncates() {
        let raw = sample().retrieve("api", 1).await.unwrap();
        let batch = crate::retrieval::normalize_output(raw);
        assert_eq!(batch.records.len(), 1);
    }

    #[test]
    fn test_overlap_score_bounds() {
        let r = sample();
        let tokens = tokenize("weather forecasts today");
        for rec in &r.records {
            let s = overlap_score(&tokens, rec);
            assert!((0.0..=1.0).contains(&s));
        }
    }
}
