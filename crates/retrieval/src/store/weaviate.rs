//! Weaviate vector-store client.
//!
//! Talks to Weaviate's GraphQL endpoint and issues hybrid queries:
//! https://weaviate.io/developers/weaviate/search/hybrid

use crate::store::{SearchHit, StoreError, VectorSearch};
use serde::Serialize;

/// GraphQL request body.
#[derive(Debug, Serialize)]
struct GraphQlRequest {
    query: String,
}

/// Weaviate client over the GraphQL HTTP endpoint.
pub struct WeaviateClient {
    /// Base URL of the Weaviate instance
    base_url: String,

    /// Optional API key
    api_key: Option<String>,

    /// HTTP client
    client: reqwest::Client,
}

impl WeaviateClient {
    /// Create a new client.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// Build the GraphQL hybrid query for one collection.
    fn build_query(collection: &str, query: &str, limit: usize, alpha: f32) -> String {
        // The user query is embedded as a GraphQL string literal; JSON
        // string encoding produces a correctly escaped, quoted literal.
        let escaped = serde_json::to_string(query).unwrap_or_else(|_| "\"\"".to_string());

        format!(
            "{{ Get {{ {collection}(hybrid: {{query: {escaped}, alpha: {alpha}}}, limit: {limit}) \
             {{ content filename page_number _additional {{ score }} }} }} }}"
        )
    }

    /// Parse one GraphQL response into search hits.
    fn parse_response(
        collection: &str,
        body: &serde_json::Value,
    ) -> Result<Vec<SearchHit>, StoreError> {
        if let Some(errors) = body.get("errors").and_then(|e| e.as_array()) {
            let message = errors
                .iter()
                .filter_map(|e| e.get("message").and_then(|m| m.as_str()))
                .collect::<Vec<_>>()
                .join("; ");

            // Weaviate reports unknown collections as GraphQL field errors
            if message.contains("Cannot query field") || message.contains("not found") {
                return Err(StoreError::NotFound(collection.to_string()));
            }
            return Err(StoreError::Search(message));
        }

        let objects = body
            .get("data")
            .and_then(|d| d.get("Get"))
            .and_then(|g| g.get(collection))
            .and_then(|c| c.as_array())
            .ok_or_else(|| StoreError::NotFound(collection.to_string()))?;

        let hits = objects
            .iter()
            .map(|obj| SearchHit {
                content: obj
                    .get("content")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                source_file: obj
                    .get("filename")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                page_number: obj
                    .get("page_number")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(1) as u32,
                score: parse_score(obj.get("_additional").and_then(|a| a.get("score"))),
            })
            .collect();

        Ok(hits)
    }
}

/// Weaviate reports hybrid scores as JSON strings; tolerate numbers too.
fn parse_score(value: Option<&serde_json::Value>) -> f32 {
    match value {
        Some(serde_json::Value::String(s)) => s.parse().unwrap_or(0.0),
        Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(0.0) as f32,
        _ => 0.0,
    }
}

#[async_trait::async_trait]
impl VectorSearch for WeaviateClient {
    async fn hybrid_search(
        &self,
        collection: &str,
        query: &str,
        limit: usize,
        alpha: f32,
    ) -> Result<Vec<SearchHit>, StoreError> {
        // Collection names come from the registry, but guard against
        // GraphQL injection through malformed configuration anyway.
        if !collection.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(StoreError::Search(format!(
                "invalid collection name: {}",
                collection
            )));
        }

        tracing::debug!(collection, limit, alpha, "Running hybrid search");

        let request = GraphQlRequest {
            query: Self::build_query(collection, query, limit, alpha),
        };

        let url = format!("{}/v1/graphql", self.base_url);
        let mut builder = self.client.post(&url).json(&request);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| StoreError::Search(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(StoreError::NotFound(collection.to_string()));
            }
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StoreError::Search(format!(
                "Weaviate error ({}): {}",
                status, error_text
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| StoreError::Search(format!("malformed response: {}", e)))?;

        Self::parse_response(collection, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_query_escapes_user_input() {
        let query = WeaviateClient::build_query("KiraDoc", "kira \"artışı\"", 4, 0.5);
        assert!(query.contains("KiraDoc(hybrid:"));
        assert!(query.contains(r#""kira \"artışı\"""#));
        assert!(query.contains("limit: 4"));
        assert!(query.contains("alpha: 0.5"));
    }

    #[test]
    fn test_parse_response_hits() {
        let body = json!({
            "data": {
                "Get": {
                    "KiraDoc": [
                        {
                            "content": "Kira bedeli artışı...",
                            "filename": "tbk.pdf",
                            "page_number": 12,
                            "_additional": {"score": "0.82"}
                        },
                        {
                            "content": "Tahliye taahhüdü...",
                            "filename": "tbk.pdf",
                            "page_number": 30,
                            "_additional": {"score": 0.61}
                        }
                    ]
                }
            }
        });

        let hits = WeaviateClient::parse_response("KiraDoc", &body).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].source_file, "tbk.pdf");
        assert_eq!(hits[0].page_number, 12);
        assert!((hits[0].score - 0.82).abs() < 1e-6);
        assert!((hits[1].score - 0.61).abs() < 1e-6);
    }

    #[test]
    fn test_parse_response_unknown_collection() {
        let body = json!({
            "errors": [{"message": "Cannot query field \"YokDoc\" on type \"GetObjectsObj\""}]
        });

        match WeaviateClient::parse_response("YokDoc", &body) {
            Err(StoreError::NotFound(collection)) => assert_eq!(collection, "YokDoc"),
            other => panic!("Expected NotFound, got {:?}", other.map(|h| h.len())),
        }
    }

    #[test]
    fn test_parse_response_other_error() {
        let body = json!({
            "errors": [{"message": "vector search: connection refused"}]
        });

        assert!(matches!(
            WeaviateClient::parse_response("KiraDoc", &body),
            Err(StoreError::Search(_))
        ));
    }

    #[test]
    fn test_invalid_collection_name_rejected() {
        let client = WeaviateClient::new("http://localhost:8080", None);
        let result = futures::executor::block_on(client.hybrid_search(
            "Kira Doc { content }",
            "kira",
            4,
            0.5,
        ));
        assert!(matches!(result, Err(StoreError::Search(_))));
    }
}
