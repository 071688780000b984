//! Assistant service HTTP client implementation

use reqassist_core::session::ReviewStats;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Error type for client operations
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Chat request body
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

/// A reply from the assistant service
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    /// Reply text
    pub response: String,
    /// Optional review counters attached to the reply
    #[serde(default)]
    pub stats: Option<ReviewStats>,
}

/// Client for the assistant completion endpoint
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client; falls back to the local development address
    /// when no base URL is given
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.unwrap_or_else(|| "http://localhost:5000".to_string()),
        }
    }

    /// Base URL the client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one user message and wait for the reply.
    ///
    /// A single best-effort attempt: any non-success status, transport
    /// failure, or malformed body is an error.
    pub async fn chat(&self, message: &str) -> ClientResult<ChatReply> {
        let url = format!("{}/api/chat", self.base_url);
        debug!("Sending chat request to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { message })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::Api(format!("HTTP {}: {}", status, error_text)));
        }

        Ok(response.json::<ChatReply>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_chat_success_with_stats() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat")
            .match_body(Matcher::Json(serde_json::json!({"message": "hello"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"response":"hi there","stats":{"approved":4,"inReview":2,"disapproved":1}}"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(Some(server.url()));
        let reply = client.chat("hello").await.unwrap();

        assert_eq!(reply.response, "hi there");
        let stats = reply.stats.unwrap();
        assert_eq!(stats.approved, 4);
        assert_eq!(stats.in_review, 2);
        assert_eq!(stats.disapproved, 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_chat_success_without_stats() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"response":"plain reply"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(Some(server.url()));
        let reply = client.chat("hello").await.unwrap();

        assert_eq!(reply.response, "plain reply");
        assert!(reply.stats.is_none());
    }

    #[tokio::test]
    async fn test_chat_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/chat")
            .with_status(500)
            .with_body("internal failure")
            .create_async()
            .await;

        let client = ApiClient::new(Some(server.url()));
        let err = client.chat("hello").await.unwrap_err();

        let message = err.to_string();
        assert!(message.contains("500"), "unexpected error: {}", message);
        assert!(message.contains("internal failure"));
    }

    #[tokio::test]
    async fn test_chat_malformed_body_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("not json")
            .create_async()
            .await;

        let client = ApiClient::new(Some(server.url()));
        assert!(client.chat("hello").await.is_err());
    }

    #[test]
    fn test_default_base_url() {
        let client = ApiClient::new(None);
        assert_eq!(client.base_url(), "http://localhost:5000");
    }
}
