//! Context assembler.
//!
//! Merges per-partition passages into one size-bounded prompt context:
//! passages are grouped under partition-name headers, at most two per
//! partition, each truncated to a fixed character budget. Worst-case
//! context size is therefore `partitions × 2 × 600` characters no
//! matter how wide the retrieval fan-out was.

use crate::registry::PartitionRegistry;
use crate::retrieve::PassageResult;

/// Maximum passages emitted per partition block.
pub const PASSAGES_PER_PARTITION: usize = 2;

/// Character budget per passage.
pub const PASSAGE_CHAR_BUDGET: usize = 600;

/// Assemble the prompt context from retrieved passages.
///
/// Partition blocks appear in the order their first passage was
/// retrieved, which follows the dispatch order of the target set.
pub fn assemble_context(passages: &[PassageResult], registry: &PartitionRegistry) -> String {
    let mut blocks: Vec<(String, Vec<&PassageResult>)> = Vec::new();

    for passage in passages {
        match blocks.iter_mut().find(|(key, _)| *key == passage.partition_key) {
            Some((_, group)) => group.push(passage),
            None => blocks.push((passage.partition_key.clone(), vec![passage])),
        }
    }

    let mut context = String::new();

    for (key, group) in &blocks {
        let label = registry
            .get(key)
            .map(|p| p.display_name.clone())
            .unwrap_or_else(|| key.clone());

        context.push_str(&format!("### {}\n", label));

        for passage in group.iter().take(PASSAGES_PER_PARTITION) {
            context.push_str(&format!(
                "--- KAYNAK: {} (Sayfa {}) ---\n{}\n",
                passage.source_file,
                passage.page_number,
                truncate_chars(&passage.content, PASSAGE_CHAR_BUDGET)
            ));
        }

        context.push('\n');
    }

    context
}

/// Truncate text to a character budget, respecting UTF-8 boundaries.
fn truncate_chars(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(budget).collect();
        format!("{}...", truncated)
    }
}
