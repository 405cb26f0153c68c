//! Generation-service integration crate for the Mevzuat Assistant.
//!
//! This crate provides a provider-agnostic abstraction for chat
//! completions. Two call shapes are supported through a unified
//! trait-based interface:
//! - non-streaming, bounded-output completions (used by the fallback
//!   classifier)
//! - streaming completions (used by the answer synthesizer)
//!
//! # Providers
//! - **OpenAI**: hosted chat-completions API (default)
//! - **Ollama**: local runtime via its OpenAI-compatible endpoint
//!
//! # Example
//! ```no_run
//! use mevzuat_llm::{ChatRequest, LlmClient, providers::OpenAiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAiClient::new("sk-...");
//! let request = ChatRequest::new("gpt-4o")
//!     .with_system("Kısa cevap ver.")
//!     .with_user("Merhaba!");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{
    ChatMessage, ChatRequest, ChatResponse, ChatStream, ChatStreamChunk, LlmClient, LlmUsage, Role,
};
pub use factory::create_client;
pub use providers::OpenAiClient;
