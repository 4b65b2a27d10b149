use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::sync::Arc;

use apirank::audit::AuditLog;
use apirank::config::Config;
use apirank::explain::TemplateExplainer;
use apirank::logging;
use apirank::pipeline::{AskRequest, Envelope, EvaluateRequest, Pipeline, RecommendRequest};
use apirank::ranking::HybridScorer;
use apirank::retrieval::DatasetRetriever;

#[derive(Parser)]
#[command(name = "apirank", version, about = "Adaptive hybrid ranking for semantic API search")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override the dataset path from config
    #[arg(long, global = true)]
    dataset: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank candidates for a query and print the full result list
    Recommend {
        /// Natural language query
        query: String,
        /// Intent label emphasizing a signal: latest, popular, reliable, recommend
        #[arg(long)]
        intent: Option<String>,
        /// Maximum results to return
        #[arg(long)]
        top_k: Option<usize>,
        /// Correlation id (generated when omitted)
        #[arg(long)]
        request_id: Option<String>,
    },
    /// Rank candidates and explain the top result
    Ask {
        query: String,
        #[arg(long)]
        intent: Option<String>,
        #[arg(long)]
        top_k: Option<usize>,
        #[arg(long)]
        request_id: Option<String>,
    },
    /// Rank candidates and score the ranking against known relevant ids
    Evaluate {
        query: String,
        /// Comma-separated relevant candidate ids
        #[arg(long, value_delimiter = ',', required = true)]
        ground_truth: Vec<String>,
        #[arg(long)]
        top_k: Option<usize>,
        #[arg(long)]
        request_id: Option<String>,
    },
    /// Print recent audit log entries
    Logs {
        /// Maximum entries to print
        #[arg(long, default_value_t = 100)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Parse CLI args
    let cli = Cli::parse();

    // 2. Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Config error (using defaults): {}", e);
        Config::default()
    });

    // 3. Initialize logging FIRST — stderr only, stdout is reserved for the
    //    JSON response envelope
    logging::init_logging(&config);

    let audit = config.audit_log.as_ref().map(AuditLog::new);

    if let Commands::Logs { limit } = &cli.command {
        let entries = match &audit {
            Some(log) => log.read_recent(*limit)?,
            None => Vec::new(),
        };
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    // 4. Wire the pipeline: dataset retriever + hybrid scorer + explainer
    let dataset_path = cli.dataset.as_deref().unwrap_or(&config.dataset_path);
    let retriever = Arc::new(DatasetRetriever::load(dataset_path)?);
    let pipeline = Pipeline::new(
        retriever,
        HybridScorer::default(),
        Arc::new(TemplateExplainer),
    );

    let envelope: Envelope = match cli.command {
        Commands::Recommend {
            query,
            intent,
            top_k,
            request_id,
        } => {
            let top_k = top_k.unwrap_or(config.default_top_k);
            let env = pipeline
                .recommend(RecommendRequest {
                    request_id,
                    query: query.clone(),
                    intent: intent.clone(),
                    top_k,
                })
                .await;
            audit_entry(&audit, "recommend", &env, &query, intent.as_deref(), top_k);
            env
        }
        Commands::Ask {
            query,
            intent,
            top_k,
            request_id,
        } => {
            let top_k = top_k.unwrap_or(5);
            let env = pipeline
                .ask(AskRequest {
                    request_id,
                    query: query.clone(),
                    intent: intent.clone(),
                    top_k,
                })
                .await;
            audit_entry(&audit, "ask", &env, &query, intent.as_deref(), top_k);
            env
        }
        Commands::Evaluate {
            query,
            ground_truth,
            top_k,
            request_id,
        } => {
            let top_k = top_k.unwrap_or(config.default_top_k);
            let env = pipeline
                .evaluate(EvaluateRequest {
                    request_id,
                    query: query.clone(),
                    ground_truth,
                    top_k,
                })
                .await;
            audit_entry(&audit, "evaluate", &env, &query, None, top_k);
            env
        }
        Commands::Logs { .. } => unreachable!("handled above"),
    };

    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

/// Best-effort audit append — a failed write is logged, never fatal.
fn audit_entry(
    audit: &Option<AuditLog>,
    kind: &str,
    envelope: &Envelope,
    query: &str,
    intent: Option<&str>,
    top_k: usize,
) {
    let Some(log) = audit else { return };
    let entry = json!({
        "type": kind,
        "request_id": envelope.request_id,
        "query": query,
        "intent": intent.unwrap_or("none"),
        "top_k": top_k,
    });
    if let Err(e) = log.append(&entry) {
        tracing::warn!(error = %e, "Failed to append audit log entry");
    }
}
