//! Generation-service provider implementations.

mod openai;

pub use openai::OpenAiClient;
