//! Ask command handler.
//!
//! Runs a single question-answering turn and prints the streamed
//! answer followed by any statute citations.

use crate::commands::{build_pipeline, format_sources, trailing_answer};
use clap::Args;
use mevzuat_chat::{SessionContext, TurnOutcome};
use mevzuat_core::{AppConfig, AppError, AppResult};
use std::io::Write;

/// Ask a single question and print the answer
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Output as JSON (suppresses streaming)
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let pipeline = build_pipeline(config)?;
        let mut session = SessionContext::new();

        // Stream fragments to stdout as they arrive; the callback
        // receives the full partial, so only the new suffix is printed
        let mut printed = 0usize;
        let streaming = !self.json;
        let outcome = pipeline
            .run_turn(&mut session, &self.question, |partial| {
                if streaming {
                    print!("{}", &partial[printed..]);
                    std::io::stdout().flush().ok();
                    printed = partial.len();
                }
            })
            .await?;

        if self.json {
            self.print_json(config, &outcome)?;
        } else {
            if let Some(text) = trailing_answer(&outcome.answer, printed, outcome.degraded) {
                print!("{}", text);
            }
            println!();

            if let Some(badge) = &outcome.partition_badge {
                eprintln!("\n[{}]", badge);
            }

            let sources = format_sources(&outcome.sources);
            if !sources.is_empty() {
                println!("\nKullanılan Referanslar:");
                for source in &sources {
                    println!("  {}", source);
                }
            }

            if !outcome.citations.is_empty() {
                println!("\nİlgili Mevzuat:");
                for citation in &outcome.citations {
                    println!(
                        "  {} — {} (indir: {})",
                        citation.display_name, citation.canonical_url, citation.download_url
                    );
                }
            }
        }

        Ok(())
    }

    /// Emit the full outcome as structured JSON.
    fn print_json(&self, config: &AppConfig, outcome: &TurnOutcome) -> AppResult<()> {
        let output = serde_json::json!({
            "answer": outcome.answer,
            "model": config.model,
            "provider": config.provider,
            "routing": {
                "mode": outcome.decision.mode,
                "partitions": outcome.decision.partition_keys,
                "badge": outcome.partition_badge,
            },
            "citations": outcome.citations,
            "sources": outcome.sources.iter().map(|p| {
                serde_json::json!({
                    "partition": p.partition_key,
                    "file": p.source_file,
                    "page": p.page_number,
                    "order": p.relevance_order,
                })
            }).collect::<Vec<_>>(),
            "degraded": outcome.degraded,
        });

        let json = serde_json::to_string_pretty(&output)
            .map_err(|e| AppError::Serialization(e.to_string()))?;
        println!("{}", json);

        Ok(())
    }
}
