/// Pipeline orchestration: RETRIEVE → RANK → (EXPLAIN) → MATERIALIZE → RESPOND
///
/// Three entry points (recommend, ask, evaluate) share the same stage flow
/// and failure policy: retrieval or ranking failure is terminal for the
/// request and produces an error envelope with the elapsed timings; an
/// explanation failure (ask only) is downgraded to degraded content. No
/// internal error escapes past this boundary — every entry point returns a
/// well-formed envelope.

use std::sync::Arc;
use std::time::Instant;

use serde_json::{json, Value};
use uuid::Uuid;

use crate::errors::ApiRankError;
use crate::evaluation::{ndcg_at_k, precision_at_k, recall_at_k};
use crate::explain::Explainer;
use crate::pipeline::materialize::{materialize_all, materialize_one};
use crate::pipeline::{AskRequest, Envelope, EvaluateRequest, RecommendRequest};
use crate::ranking::{HybridScorer, RankOutput, RankedRecord};
use crate::retrieval::{normalize_output, RetrievalBatch, Retriever};

pub struct Pipeline {
    retriever: Arc<dyn Retriever>,
    scorer: HybridScorer,
    explainer: Arc<dyn Explainer>,
}

impl Pipeline {
    pub fn new(
        retriever: Arc<dyn Retriever>,
        scorer: HybridScorer,
        explainer: Arc<dyn Explainer>,
    ) -> Self {
        Pipeline {
            retriever,
            scorer,
            explainer,
        }
    }

    // -----------------------------------------------------------------------
    // Recommend
    // -----------------------------------------------------------------------

    pub async fn recommend(&self, req: RecommendRequest) -> Envelope {
        let request_id = ensure_request_id(req.request_id.clone());
        let t0 = Instant::now();
        tracing::info!(
            request_id = %request_id,
            query = %req.query,
            intent = ?req.intent,
            top_k = req.top_k,
            "Recommend pipeline started"
        );

        let batch = match self.retrieve(&request_id, &req.query, req.top_k).await {
            Ok(batch) => batch,
            Err(e) => {
                return Envelope::error(
                    request_id,
                    e.code(),
                    e.to_string(),
                    json!({
                        "query": req.query,
                        "intent": req.intent,
                        "results": [],
                        "timing": timing_ms(t0.elapsed().as_millis(), 0, 0),
                    }),
                );
            }
        };
        let retrieval_ms = t0.elapsed().as_millis();

        let t1 = Instant::now();
        let rank_out = match self.rank(&request_id, &batch, req.intent.as_deref()) {
            Ok(out) => out,
            Err(e) => {
                return Envelope::error(
                    request_id,
                    e.code(),
                    e.to_string(),
                    json!({
                        "query": req.query,
                        "intent": req.intent,
                        "results": [],
                        "timing": timing_ms(retrieval_ms, t1.elapsed().as_millis(), 0),
                    }),
                );
            }
        };
        let ranking_ms = t1.elapsed().as_millis();

        let results = materialize_all(truncated(&rank_out.ranked, req.top_k));
        tracing::info!(
            request_id = %request_id,
            results = results.len(),
            retrieval_ms = retrieval_ms as u64,
            ranking_ms = ranking_ms as u64,
            "Recommend pipeline done"
        );

        Envelope::ok(
            request_id,
            json!({
                "query": req.query,
                "intent": req.intent,
                "results": results,
                "weights": rank_out.weights,
                "timing": timing_ms(retrieval_ms, ranking_ms, 0),
            }),
        )
    }

    // -----------------------------------------------------------------------
    // Ask (explain top result)
    // -----------------------------------------------------------------------

    pub async fn ask(&self, req: AskRequest) -> Envelope {
        let request_id = ensure_request_id(req.request_id.clone());
        let t0 = Instant::now();
        tracing::info!(
            request_id = %request_id,
            query = %req.query,
            top_k = req.top_k,
            "Ask pipeline started"
        );

        let batch = match self.retrieve(&request_id, &req.query, req.top_k).await {
            Ok(batch) => batch,
            Err(e) => {
                return Envelope::error(
                    request_id,
                    e.code(),
                    e.to_string(),
                    json!({
                        "answer": "",
                        "source": null,
                        "explanation": null,
                        "timing": timing_ms(t0.elapsed().as_millis(), 0, 0),
                    }),
                );
            }
        };
        let retrieval_ms = t0.elapsed().as_millis();

        let t1 = Instant::now();
        let rank_out = match self.rank(&request_id, &batch, req.intent.as_deref()) {
            Ok(out) => out,
            Err(e) => {
                return Envelope::error(
                    request_id,
                    e.code(),
                    e.to_string(),
                    json!({
                        "answer": "",
                        "source": null,
                        "explanation": null,
                        "timing": timing_ms(retrieval_ms, t1.elapsed().as_millis(), 0),
                    }),
                );
            }
        };
        let ranking_ms = t1.elapsed().as_millis();

        // Empty results are not a failure for ask
        let Some(top) = rank_out.ranked.first() else {
            return Envelope::ok(
                request_id,
                json!({
                    "answer": "No relevant results found.",
                    "source": null,
                    "explanation": null,
                    "timing": timing_ms(retrieval_ms, ranking_ms, 0),
                }),
            );
        };

        // Explanation failure is degraded content, never a request failure
        let t2 = Instant::now();
        let (explanation, compose_ms) = match self.explainer.explain(top) {
            Ok(text) => (text, t2.elapsed().as_millis()),
            Err(e) => {
                tracing::error!(request_id = %request_id, error = %e, "Explainability failed");
                (e.to_string(), 0)
            }
        };

        let top_doc = materialize_one(top);
        tracing::info!(
            request_id = %request_id,
            top_doc = %top_doc.id,
            "Ask pipeline done"
        );

        Envelope::ok(
            request_id,
            json!({
                "answer": explanation,
                "source": {"document": top_doc, "excerpt": ""},
                "explanation": explanation,
                "timing": timing_ms(retrieval_ms, ranking_ms, compose_ms),
            }),
        )
    }

    // -----------------------------------------------------------------------
    // Evaluate
    // -----------------------------------------------------------------------

    pub async fn evaluate(&self, req: EvaluateRequest) -> Envelope {
        let request_id = ensure_request_id(req.request_id.clone());
        let t0 = Instant::now();
        tracing::info!(
            request_id = %request_id,
            query = %req.query,
            top_k = req.top_k,
            "Evaluate pipeline started"
        );

        let batch = match self.retrieve(&request_id, &req.query, req.top_k).await {
            Ok(batch) => batch,
            Err(e) => return Envelope::error(request_id, e.code(), e.to_string(), Value::Null),
        };
        let retrieval_ms = t0.elapsed().as_millis();

        let t1 = Instant::now();
        let rank_out = match self.rank(&request_id, &batch, None) {
            Ok(out) => out,
            Err(e) => return Envelope::error(request_id, e.code(), e.to_string(), Value::Null),
        };
        let ranking_ms = t1.elapsed().as_millis();

        let ranked = truncated(&rank_out.ranked, req.top_k);
        let results = materialize_all(ranked);

        let t2 = Instant::now();
        let predicted: Vec<String> = ranked.iter().map(|r| r.id.clone()).collect();
        let metrics = json!({
            "precision@k": precision_at_k(&predicted, &req.ground_truth, req.top_k),
            "recall@k": recall_at_k(&predicted, &req.ground_truth, req.top_k),
            "ndcg@k": ndcg_at_k(&predicted, &req.ground_truth, req.top_k),
        });
        let eval_ms = t2.elapsed().as_millis();

        tracing::info!(
            request_id = %request_id,
            results = results.len(),
            "Evaluate pipeline done"
        );

        Envelope::ok(
            request_id,
            json!({
                "query": req.query,
                "ground_truth": req.ground_truth,
                "metrics": metrics,
                "results": results,
                "timing": {
                    "retrieval_ms": retrieval_ms as u64,
                    "ranking_ms": ranking_ms as u64,
                    "eval_ms": eval_ms as u64,
                },
            }),
        )
    }

    // -----------------------------------------------------------------------
    // Shared stages
    // -----------------------------------------------------------------------

    async fn retrieve(
        &self,
        request_id: &str,
        query: &str,
        top_k: usize,
    ) -> Result<RetrievalBatch, ApiRankError> {
        match self.retriever.retrieve(query, top_k).await {
            Ok(raw) => {
                let batch = normalize_output(raw);
                tracing::info!(
                    request_id = %request_id,
                    records = batch.records.len(),
                    "Retriever returned items"
                );
                Ok(batch)
            }
            Err(e) => {
                tracing::error!(request_id = %request_id, error = %e, "Retriever failed");
                Err(ApiRankError::Retriever(e.to_string()))
            }
        }
    }

    fn rank(
        &self,
        request_id: &str,
        batch: &RetrievalBatch,
        intent: Option<&str>,
    ) -> Result<RankOutput, ApiRankError> {
        self.scorer
            .score(&batch.records, &batch.scores, intent)
            .map_err(|e| {
                tracing::error!(request_id = %request_id, error = %e, "Ranker failed");
                e
            })
    }
}

/// Honor the caller-supplied request id, else generate a UUID v4.
fn ensure_request_id(req_id: Option<String>) -> String {
    match req_id {
        Some(id) if !id.trim().is_empty() => id,
        _ => Uuid::new_v4().to_string(),
    }
}

fn truncated(ranked: &[RankedRecord], top_k: usize) -> &[RankedRecord] {
    &ranked[..ranked.len().min(top_k)]
}

fn timing_ms(retrieval: u128, ranking: u128, compose: u128) -> Value {
    json!({
        "retrieval_ms": retrieval as u64,
        "ranking_ms": ranking as u64,
        "compose_ms": compose as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_request_id_honors_caller() {
        assert_eq!(ensure_request_id(Some("abc".into())), "abc");
    }

    #[test]
    fn test_ensure_request_id_generates_uuid_for_blank() {
        let id = ensure_request_id(Some("  ".into()));
        assert!(Uuid::parse_str(&id).is_ok());
        let id = ensure_request_id(None);
        assert!(Uuid::parse_str(&id).is_ok());
    }
}
