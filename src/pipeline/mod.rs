/// Pipeline request/response types
///
/// Every entry point returns the same envelope: request id, ok/error status,
/// optional {code, message} error, and a JSON payload. The envelope is
/// created at pipeline entry, filled by successive stages, and immutable
/// once returned.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod materialize;
pub mod orchestrator;

// Re-export key types for convenience
pub use materialize::RankedDocument;
pub use orchestrator::Pipeline;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendRequest {
    /// Caller-supplied correlation id; generated when absent
    pub request_id: Option<String>,
    pub query: String,
    /// Free-form intent label, e.g. "latest", "popular"
    pub intent: Option<String>,
    #[serde(default = "default_recommend_top_k")]
    pub top_k: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub request_id: Option<String>,
    pub query: String,
    pub intent: Option<String>,
    #[serde(default = "default_ask_top_k")]
    pub top_k: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub request_id: Option<String>,
    pub query: String,
    /// Relevant candidate ids used as ground truth for the metrics
    pub ground_truth: Vec<String>,
    #[serde(default = "default_recommend_top_k")]
    pub top_k: usize,
}

fn default_recommend_top_k() -> usize {
    10
}

fn default_ask_top_k() -> usize {
    5
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

/// The uniform success/error wrapper returned by every pipeline entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub request_id: String,
    pub status: Status,
    pub error: Option<ErrorInfo>,
    pub payload: Value,
}

impl Envelope {
    pub fn ok(request_id: String, payload: Value) -> Self {
        Envelope {
            request_id,
            status: Status::Ok,
            error: None,
            payload,
        }
    }

    pub fn error(request_id: String, code: &str, message: String, payload: Value) -> Self {
        Envelope {
            request_id,
            status: Status::Error,
            error: Some(ErrorInfo {
                code: code.to_string(),
                message,
            }),
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_serializes_lowercase_status() {
        let env = Envelope::ok("rid".into(), json!({}));
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v["status"], "ok");
        assert_eq!(v["error"], Value::Null);
    }

    #[test]
    fn test_request_top_k_defaults() {
        let r: RecommendRequest = serde_json::from_value(json!({"query": "q"})).unwrap();
        assert_eq!(r.top_k, 10);
        let a: AskRequest = serde_json::from_value(json!({"query": "q"})).unwrap();
        assert_eq!(a.top_k, 5);
    }
}
