/// Retrieval abstraction layer
///
/// The retriever is an external, independently evolving collaborator — its
/// return contract is intentionally loose (raw JSON), and the adapter in
/// this module canonicalizes whatever shape comes back. All downstream
/// ranking stages may assume the canonical `RetrievalBatch`.

use async_trait::async_trait;
use serde_json::Value;

use crate::ranking::signals::Record;

pub mod adapter;
pub mod dataset;

pub use adapter::{normalize_output, RawRetrieval};
pub use dataset::DatasetRetriever;

/// Canonical retrieval output: parallel candidate records and similarity
/// scores. The sides may differ in length — the scorer pads, never drops.
#[derive(Debug, Clone, Default)]
pub struct RetrievalBatch {
    pub records: Vec<Record>,
    pub scores: Vec<f64>,
}

impl RetrievalBatch {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.scores.is_empty()
    }
}

/// Core abstraction over the vector retriever.
///
/// Implementations must be Send + Sync to support concurrent requests; the
/// pipeline adds no locking of its own. The raw JSON return value is
/// normalized by `normalize_output` — implementors are free to return a
/// `[records, scores]` pair, a bare records array, or null.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Retrieve up to `top_k` candidates for the query.
    ///
    /// `query` must be a non-empty string; implementations should reject
    /// empty queries with an error.
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Value, anyhow::Error>;
}
