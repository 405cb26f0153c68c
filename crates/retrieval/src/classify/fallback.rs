//! Model-based fallback classifier.
//!
//! Issues one bounded, non-streaming generation call that enumerates
//! the partition keys with their descriptions and asks for exactly one
//! key back. The response is validated against the registry before it
//! is trusted; anything unrecognized, malformed, or failed degrades to
//! `unresolved` and never aborts the turn.

use crate::classify::{ClassificationDecision, RouteMode};
use crate::registry::PartitionRegistry;
use mevzuat_llm::{ChatRequest, LlmClient};

/// Marker the model returns when no partition fits.
pub const INDETERMINATE: &str = "belirsiz";

/// Output cap for the routing call; a partition key is a single short
/// token.
const MAX_OUTPUT_TOKENS: u32 = 20;

/// Classify a query with a generation call.
pub async fn classify_fallback(
    client: &dyn LlmClient,
    model: &str,
    query: &str,
    registry: &PartitionRegistry,
) -> ClassificationDecision {
    let request = ChatRequest::new(model)
        .with_system(build_instruction(registry))
        .with_user(query)
        .with_temperature(0.0)
        .with_max_tokens(MAX_OUTPUT_TOKENS);

    let response = match client.complete(&request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Fallback classifier call failed: {}", e);
            return ClassificationDecision::unresolved();
        }
    };

    match parse_response(&response.content, registry) {
        Some(key) => {
            tracing::info!(partition = %key, "Fallback classifier resolved query");
            ClassificationDecision::single(RouteMode::Fallback, key)
        }
        None => {
            tracing::debug!(response = %response.content, "Fallback classifier inconclusive");
            ClassificationDecision::unresolved()
        }
    }
}

/// Build the routing instruction enumerating all partitions.
fn build_instruction(registry: &PartitionRegistry) -> String {
    let mut instruction = String::from(
        "Sen bir hukuki soru yönlendiricisisin. Kullanıcının sorusunu aşağıdaki \
         kategorilerden tam olarak birine ata.\n\nKategoriler:\n",
    );

    for partition in registry.all() {
        instruction.push_str(&format!(
            "- {}: {} ({})\n",
            partition.key, partition.display_name, partition.description
        ));
    }

    instruction.push_str(&format!(
        "\nYalnızca kategori anahtarını yaz, başka hiçbir şey yazma. \
         Soru hiçbir kategoriye uymuyorsa \"{}\" yaz.",
        INDETERMINATE
    ));

    instruction
}

/// Validate a model response against the registry.
///
/// Returns the matched partition key, or `None` for the indeterminate
/// marker and for anything unrecognized.
fn parse_response(content: &str, registry: &PartitionRegistry) -> Option<String> {
    let token = content
        .trim()
        .split_whitespace()
        .next()?
        .trim_matches(|c: char| !c.is_alphanumeric() && c != '_')
        .to_lowercase();

    if token.is_empty() || token == INDETERMINATE {
        return None;
    }

    registry.get(&token).map(|p| p.key.clone())
}
