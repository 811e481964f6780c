//! Ask command handler.
//!
//! Answers a single question, optionally ingesting a document first so the
//! question can be answered from its contents.

use clap::Args;
use skydoc_agent::Agent;
use skydoc_core::{config::AppConfig, AppError, AppResult};
use std::path::PathBuf;

/// Ask a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Document to load before answering
    #[arg(short, long)]
    pub document: Option<PathBuf>,

    /// Output as JSON with classification and evidence
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::debug!("Ask command options: {:?}", self);

        let agent = Agent::from_config(config)?;

        if let Some(ref document) = self.document {
            let commit = agent.ingest(document).await?;
            tracing::info!(
                source = %commit.source,
                chunks = commit.chunk_count,
                "Document loaded"
            );
        }

        let response = agent.answer(&self.query).await?;

        if self.json {
            let output = serde_json::json!({
                "answer": response.answer,
                "classification": response.classification,
                "degraded": response.degraded,
                "evidence": response.evidence,
            });

            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("{}", response.answer);
        }

        Ok(())
    }
}
