//! Answer synthesizer.
//!
//! Issues one streaming generation request and concatenates the
//! incoming fragments in arrival order. After every fragment the caller
//! sees the monotonically growing partial answer through a callback, so
//! any rendering surface can update incrementally without the
//! synthesizer knowing about it. There is no mid-stream cancellation;
//! a stream error is returned to the caller, who decides how to
//! degrade.

use futures::StreamExt;
use mevzuat_core::AppResult;
use mevzuat_llm::{ChatMessage, ChatRequest, LlmClient};

/// Sampling temperature for answer synthesis.
pub const SYNTHESIS_TEMPERATURE: f32 = 0.3;

/// Stream one answer and return the terminal full text.
///
/// `on_partial` is invoked with the complete partial answer after each
/// fragment that carries text.
pub async fn synthesize<F>(
    client: &dyn LlmClient,
    model: &str,
    messages: Vec<ChatMessage>,
    mut on_partial: F,
) -> AppResult<String>
where
    F: FnMut(&str) + Send,
{
    let request = ChatRequest::new(model)
        .with_messages(messages)
        .with_temperature(SYNTHESIS_TEMPERATURE)
        .with_streaming();

    let mut stream = client.stream(&request).await?;
    let mut answer = String::new();

    while let Some(result) = stream.next().await {
        let chunk = result?;

        if !chunk.content.is_empty() {
            answer.push_str(&chunk.content);
            on_partial(&answer);
        }

        if chunk.done {
            break;
        }
    }

    tracing::info!(chars = answer.len(), "Answer stream completed");

    Ok(answer)
}
