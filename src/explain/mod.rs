/// Explanation generation for the top-ranked candidate
///
/// The explainer is a collaborator seam: given one ranked record it returns
/// a human-readable justification string. It has no effect on ranking and
/// must never be assumed infallible — the orchestrator downgrades a failed
/// explanation to degraded content instead of failing the request.

use crate::ranking::RankedRecord;

pub trait Explainer: Send + Sync {
    fn explain(&self, top: &RankedRecord) -> Result<String, anyhow::Error>;
}

/// Deterministic template-based explainer: renders the hybrid score and a
/// per-signal component breakdown for the top result.
#[derive(Debug, Clone, Default)]
pub struct TemplateExplainer;

impl Explainer for TemplateExplainer {
    fn explain(&self, top: &RankedRecord) -> Result<String, anyhow::Error> {
        let name = top
            .metadata
            .get("name")
            .or_else(|| top.metadata.get("api_name"))
            .and_then(serde_json::Value::as_str)
            .unwrap_or(&top.id);

        let msg = format!(
            "API '{name}' ranked highest with a hybrid score of {score:.3}.\n\
             It balances semantic match ({sim:.2}), quality ({quality:.2}), \
             recency ({recency:.2}), and popularity ({pop:.2}).\n\n\
             Component breakdown:\n\
             - Similarity: {sim:.2}\n\
             - Quality: {quality:.2}\n\
             - Recency: {recency:.2}\n\
             - Popularity: {pop:.2}\n\n\
             This reflects adaptive weighting tuned to the user's intent.",
            name = name,
            score = top.hybrid_score,
            sim = top.similarity,
            quality = top.doc_quality,
            recency = top.recency,
            pop = top.popularity,
        );
        Ok(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::signals::Record;
    use serde_json::json;

    fn ranked(metadata: serde_json::Value) -> RankedRecord {
        RankedRecord {
            id: "doc_0".to_string(),
            similarity: 0.9,
            doc_quality: 0.5,
            recency: 0.25,
            popularity: 1.0,
            hybrid_score: 0.731,
            metadata: metadata.as_object().cloned().unwrap_or_else(Record::new),
        }
    }

    #[test]
    fn test_uses_metadata_name() {
        let text = TemplateExplainer
            .explain(&ranked(json!({"name": "Auth API"})))
            .unwrap();
        assert!(text.contains("API 'Auth API'"));
        assert!(text.contains("0.731"));
    }

    #[test]
    fn test_falls_back_to_id_without_name() {
        let text = TemplateExplainer.explain(&ranked(json!({}))).unwrap();
        assert!(text.contains("API 'doc_0'"));
    }
}
