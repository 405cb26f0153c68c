//! Command handlers for the Mevzuat Assistant CLI.
//!
//! This module organizes all CLI commands into separate submodules and
//! provides the shared pipeline construction used by the `ask` and
//! `chat` commands.

pub mod ask;
pub mod chat;
pub mod partitions;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use partitions::PartitionsCommand;

use mevzuat_chat::{Pipeline, PipelineOptions};
use mevzuat_core::{AppConfig, AppError, AppResult};
use mevzuat_llm::create_client;
use mevzuat_retrieval::{PartitionRegistry, PassageResult, StatuteTable, WeaviateClient};
use std::sync::Arc;

/// Load the partition registry from the configured file, or fall back
/// to the built-in defaults.
pub fn load_registry(config: &AppConfig) -> AppResult<PartitionRegistry> {
    match &config.registry_file {
        Some(path) => PartitionRegistry::from_yaml(path),
        None => Ok(PartitionRegistry::default_registry()),
    }
}

/// Load the statute citation table from the configured file, or fall
/// back to the built-in defaults.
pub fn load_statutes(config: &AppConfig) -> AppResult<StatuteTable> {
    match &config.statute_file {
        Some(path) => StatuteTable::from_yaml(path),
        None => Ok(StatuteTable::default_table()),
    }
}

/// Construct the question-answering pipeline from configuration.
pub fn build_pipeline(config: &AppConfig) -> AppResult<Pipeline> {
    config.validate()?;

    let registry = load_registry(config)?;
    let statutes = load_statutes(config)?;

    let store = Arc::new(WeaviateClient::new(
        &config.store_url,
        config.store_api_key.clone(),
    ));

    let llm = create_client(&config.provider, None, config.api_key.as_deref())
        .map_err(AppError::Config)?;

    Ok(Pipeline::new(
        registry,
        statutes,
        store,
        llm,
        PipelineOptions {
            model: config.model.clone(),
            classifier_model: config.classifier_model.clone(),
            fast_classifier: config.fast_classifier,
        },
    ))
}

/// Answer text still to print once streaming has ended.
///
/// The no-results and degraded answers are never streamed, so when
/// nothing was printed the full answer is returned. A stream that
/// failed after emitting fragments still gets the degraded notice,
/// on its own line below the partial text, so the user is never left
/// with a silently truncated answer.
pub fn trailing_answer(answer: &str, printed: usize, degraded: bool) -> Option<String> {
    if printed == 0 {
        Some(answer.to_string())
    } else if degraded {
        Some(format!("\n{}", answer))
    } else {
        None
    }
}

/// Deduplicated `file (Sayfa N)` source labels, in retrieval order.
pub fn format_sources(sources: &[PassageResult]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();

    for passage in sources {
        let label = format!("{} (Sayfa {})", passage.source_file, passage.page_number);
        if !labels.contains(&label) {
            labels.push(label);
        }
    }

    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(file: &str, page: u32) -> PassageResult {
        PassageResult {
            content: "metin".to_string(),
            source_file: file.to_string(),
            page_number: page,
            partition_key: "rent_law".to_string(),
            relevance_order: 1,
        }
    }

    #[test]
    fn test_trailing_answer_nothing_streamed() {
        assert_eq!(
            trailing_answer("tam cevap", 0, false).as_deref(),
            Some("tam cevap")
        );
    }

    #[test]
    fn test_trailing_answer_after_clean_stream() {
        assert_eq!(trailing_answer("tam cevap", 9, false), None);
    }

    #[test]
    fn test_trailing_answer_degraded_after_partial_stream() {
        // The degraded notice must still reach the user below the
        // already-printed fragments
        assert_eq!(
            trailing_answer("hata bildirimi", 9, true).as_deref(),
            Some("\nhata bildirimi")
        );
    }

    #[test]
    fn test_trailing_answer_degraded_without_fragments() {
        assert_eq!(
            trailing_answer("hata bildirimi", 0, true).as_deref(),
            Some("hata bildirimi")
        );
    }

    #[test]
    fn test_format_sources_dedupes_in_order() {
        let sources = vec![
            passage("tbk.pdf", 12),
            passage("tbk.pdf", 12),
            passage("is_kanunu.pdf", 3),
            passage("tbk.pdf", 30),
        ];

        assert_eq!(
            format_sources(&sources),
            vec![
                "tbk.pdf (Sayfa 12)",
                "is_kanunu.pdf (Sayfa 3)",
                "tbk.pdf (Sayfa 30)",
            ]
        );
    }

    #[test]
    fn test_format_sources_empty() {
        assert!(format_sources(&[]).is_empty());
    }
}
