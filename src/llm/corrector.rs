//! Core [`Corrector`] trait and the [`OllamaCorrector`] implementation.
//!
//! `OllamaCorrector` calls a local Ollama server's `/api/chat` (or
//! `/api/generate`) route.  All connection details come from [`LlmConfig`].

use async_trait::async_trait;
use thiserror::Error;

use crate::config::LlmConfig;

use super::prompt::CorrectionRequest;
use super::response::{parse_response, CorrectionResult};

// ---------------------------------------------------------------------------
// CorrectionError
// ---------------------------------------------------------------------------

/// Errors that can occur during a correction call.
#[derive(Debug, Error)]
pub enum CorrectionError {
    /// The endpoint could not be reached, timed out, or answered with a
    /// non-success status.
    #[error("correction service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The endpoint answered but the body does not have the expected shape.
    #[error("malformed correction response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for CorrectionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            CorrectionError::MalformedResponse(e.to_string())
        } else {
            CorrectionError::ServiceUnavailable(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Corrector trait
// ---------------------------------------------------------------------------

/// Async trait for grammar/spelling correction of one piece of text.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn Corrector>`.  A call is a single attempt; there is no retry.
#[async_trait]
pub trait Corrector: Send + Sync {
    async fn correct(&self, text: &str) -> Result<CorrectionResult, CorrectionError>;
}

// ---------------------------------------------------------------------------
// OllamaCorrector
// ---------------------------------------------------------------------------

/// Sends text to a local Ollama server for correction.
pub struct OllamaCorrector {
    client: reqwest::Client,
    config: LlmConfig,
}

impl OllamaCorrector {
    /// Build an `OllamaCorrector` from config.
    ///
    /// Only the connect timeout is set on the HTTP client; the overall
    /// deadline is enforced by the caller (see
    /// [`Workflow`](crate::workflow::Workflow)).  A default client is used as
    /// a last-resort fallback if the builder fails.
    pub fn from_config(config: &LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }
}

#[async_trait]
impl Corrector for OllamaCorrector {
    async fn correct(&self, text: &str) -> Result<CorrectionResult, CorrectionError> {
        let request = CorrectionRequest::from_config(&self.config, text);
        let url = self.config.url();

        log::debug!(
            "llm: POST {url} (model={}, stream={}, len={})",
            request.model(),
            request.stream(),
            text.len()
        );

        let response = self
            .client
            .post(&url)
            .json(&request.body(self.config.endpoint))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(CorrectionError::ServiceUnavailable(format!(
                "HTTP {status}: {}",
                detail.trim()
            )));
        }

        // Read the whole body first; both response modes are parsed only
        // once the server has finished.
        let body = response.text().await?;
        let result = parse_response(&body, self.config.endpoint, self.config.response_mode)?;

        log::debug!(
            "llm: done={} eval_count={:?} total_duration_ns={:?}",
            result.done,
            result.metadata.eval_count,
            result.metadata.total_duration
        );

        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Endpoint, ResponseMode};
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn config_for(base_url: String) -> LlmConfig {
        LlmConfig {
            base_url,
            ..LlmConfig::default()
        }
    }

    #[tokio::test]
    async fn chat_request_and_response() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat")
            .match_body(Matcher::PartialJson(json!({
                "model": "mistral",
                "stream": false,
                "messages": [
                    { "role": "system" },
                    { "role": "user", "content": "Their are three apple's." }
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"model":"mistral","message":{"role":"assistant","content":"There are three apples."},"done":true,"eval_count":6}"#,
            )
            .create_async()
            .await;

        let corrector = OllamaCorrector::from_config(&config_for(server.url()));
        let result = corrector.correct("Their are three apple's.").await.unwrap();

        assert_eq!(result.text, "There are three apples.");
        assert!(result.done);
        assert_eq!(result.metadata.eval_count, Some(6));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn generate_lines_mode() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/generate")
            .match_body(Matcher::PartialJson(json!({
                "stream": true,
                "prompt": "teh"
            })))
            .with_status(200)
            .with_header("content-type", "application/x-ndjson")
            .with_body("{\"response\":\"t\",\"done\":false}\n{\"response\":\"he\",\"done\":true}\n")
            .create_async()
            .await;

        let mut config = config_for(server.url());
        config.endpoint = Endpoint::Generate;
        config.response_mode = ResponseMode::Lines;

        let result = OllamaCorrector::from_config(&config)
            .correct("teh")
            .await
            .unwrap();

        assert_eq!(result.text, "the");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_service_unavailable() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(404)
            .with_body(r#"{"error":"model 'mistral' not found"}"#)
            .create_async()
            .await;

        let err = OllamaCorrector::from_config(&config_for(server.url()))
            .correct("x")
            .await
            .unwrap_err();

        match err {
            CorrectionError::ServiceUnavailable(msg) => assert!(msg.contains("404")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_content_is_malformed() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_body(r#"{"message":{"role":"assistant"},"done":true}"#)
            .create_async()
            .await;

        let err = OllamaCorrector::from_config(&config_for(server.url()))
            .correct("x")
            .await
            .unwrap_err();

        assert!(matches!(err, CorrectionError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn connection_refused_is_service_unavailable() {
        // Bind and immediately drop a listener to get a port nobody serves.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let err = OllamaCorrector::from_config(&config_for(format!("http://127.0.0.1:{port}")))
            .correct("x")
            .await
            .unwrap_err();

        assert!(matches!(err, CorrectionError::ServiceUnavailable(_)));
    }

    #[test]
    fn corrector_is_object_safe() {
        let corrector: Box<dyn Corrector> =
            Box::new(OllamaCorrector::from_config(&LlmConfig::default()));
        drop(corrector);
    }
}
