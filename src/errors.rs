/// Domain-specific error types for apirank
///
/// Pipeline failures carry a stable wire code so the response envelope can
/// report them uniformly regardless of which stage failed.

#[derive(Debug, thiserror::Error)]
pub enum ApiRankError {
    #[error("Retriever error: {0}")]
    Retriever(String),

    #[error("Ranker error: {0}")]
    Ranker(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiRankError {
    /// Stable wire code used in the response envelope's `error.code` field.
    pub fn code(&self) -> &'static str {
        match self {
            ApiRankError::Retriever(_) => "RETRIEVER_ERROR",
            ApiRankError::Ranker(_) => "RANKER_ERROR",
            ApiRankError::Validation { .. } => "VALIDATION_ERROR",
            ApiRankError::Config(_) => "CONFIG_ERROR",
            ApiRankError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Helper to create validation errors with field names
    pub fn validation(field: &str, message: &str) -> Self {
        ApiRankError::Validation {
            message: message.to_string(),
            field: Some(field.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_codes_are_stable() {
        assert_eq!(ApiRankError::Retriever("x".into()).code(), "RETRIEVER_ERROR");
        assert_eq!(ApiRankError::Ranker("x".into()).code(), "RANKER_ERROR");
        assert_eq!(
            ApiRankError::validation("query", "empty").code(),
            "VALIDATION_ERROR"
        );
    }
}
