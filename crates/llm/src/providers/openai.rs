//! OpenAI-compatible chat-completions provider.
//!
//! Speaks the `/chat/completions` API shape, which is also served by
//! Ollama's OpenAI-compatible endpoint. Streaming responses arrive as
//! server-sent events (`data: {json}` lines, terminated by
//! `data: [DONE]`).

use crate::client::{
    ChatMessage, ChatRequest, ChatResponse, ChatStream, ChatStreamChunk, LlmClient, LlmUsage,
};
use futures::StreamExt;
use mevzuat_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Default hosted endpoint.
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Chat-completions API request format.
#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

/// Non-streaming API response format.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    model: String,
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Streaming API chunk format.
#[derive(Debug, Deserialize)]
struct ApiStreamChunk {
    choices: Vec<ApiStreamChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiStreamChoice {
    #[serde(default)]
    delta: ApiDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ApiDelta {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat client.
pub struct OpenAiClient {
    /// Base URL for the API
    base_url: String,

    /// Bearer token, if the endpoint requires one
    api_key: Option<String>,

    /// HTTP client
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a client against the hosted OpenAI endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, Some(api_key.into()))
    }

    /// Create a client against a custom OpenAI-compatible endpoint.
    pub fn with_base_url(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// Convert ChatRequest to the wire format.
    fn to_api_request(&self, request: &ChatRequest, stream: bool) -> ApiRequest {
        ApiRequest {
            model: request.model.clone(),
            messages: request.messages.clone(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream,
        }
    }

    /// POST a request body to the chat-completions endpoint.
    async fn send(&self, body: &ApiRequest) -> AppResult<reqwest::Response> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut builder = self.client.post(&url).json(body);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Chat API error ({}): {}",
                status, error_text
            )));
        }

        Ok(response)
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        tracing::info!("Sending completion request to {}", self.base_url);
        tracing::debug!("Request model: {}", request.model);

        let api_request = self.to_api_request(request, false);
        let response = self.send(&api_request).await?;

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse response: {}", e)))?;

        let content = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AppError::Llm("Response contained no choices".to_string()))?;

        let usage = api_response
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        tracing::info!("Received completion ({} tokens)", usage.total_tokens);

        Ok(ChatResponse {
            content,
            model: api_response.model,
            usage,
        })
    }

    async fn stream(&self, request: &ChatRequest) -> AppResult<ChatStream> {
        tracing::info!("Starting streaming request to {}", self.base_url);

        let api_request = self.to_api_request(request, true);
        let response = self.send(&api_request).await?;

        // Buffer raw bytes and only decode complete SSE lines, so that
        // multi-byte UTF-8 sequences split across network chunks are
        // reassembled correctly.
        let byte_stream = response.bytes_stream();
        let stream = futures::stream::unfold(
            (byte_stream, Vec::<u8>::new(), false),
            |(mut bytes, mut buffer, finished)| async move {
                if finished {
                    return None;
                }

                loop {
                    if let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                        let line_bytes: Vec<u8> = buffer.drain(..=pos).collect();
                        let line = String::from_utf8_lossy(&line_bytes);
                        let line = line.trim();

                        let Some(payload) = line.strip_prefix("data:") else {
                            continue;
                        };
                        let payload = payload.trim();

                        if payload == "[DONE]" {
                            let chunk = ChatStreamChunk {
                                content: String::new(),
                                done: true,
                                usage: None,
                            };
                            return Some((Ok(chunk), (bytes, buffer, true)));
                        }

                        return match parse_stream_payload(payload) {
                            Ok(chunk) => {
                                let done = chunk.done;
                                Some((Ok(chunk), (bytes, buffer, done)))
                            }
                            Err(e) => Some((Err(e), (bytes, buffer, true))),
                        };
                    }

                    match bytes.next().await {
                        Some(Ok(data)) => buffer.extend_from_slice(&data),
                        Some(Err(e)) => {
                            let err = AppError::Llm(format!("Stream error: {}", e));
                            return Some((Err(err), (bytes, buffer, true)));
                        }
                        None => {
                            // Stream ended without an explicit [DONE]
                            let chunk = ChatStreamChunk {
                                content: String::new(),
                                done: true,
                                usage: None,
                            };
                            return Some((Ok(chunk), (bytes, buffer, true)));
                        }
                    }
                }
            },
        );

        Ok(Box::pin(stream))
    }
}

/// Parse one SSE payload line into a stream chunk.
fn parse_stream_payload(payload: &str) -> AppResult<ChatStreamChunk> {
    let api_chunk: ApiStreamChunk = serde_json::from_str(payload)
        .map_err(|e| AppError::Llm(format!("Failed to parse stream chunk: {}", e)))?;

    let (content, done) = api_chunk
        .choices
        .into_iter()
        .next()
        .map(|c| (c.delta.content.unwrap_or_default(), c.finish_reason.is_some()))
        .unwrap_or((String::new(), false));

    Ok(ChatStreamChunk {
        content,
        done,
        usage: api_chunk
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens)),
    })
}
