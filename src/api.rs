//! Generative-text API interaction.
//!
//! This module provides the interface the summarizer uses to talk to a hosted
//! language model.
//!
//! # Architecture
//!
//! - [`TextGenerator`]: Core trait defining one async prompt/completion call
//! - [`GeminiClient`]: Implementation backed by the Gemini `generateContent` REST endpoint
//!
//! Calls are never retried. A failed call is reported once and the caller
//! substitutes fallback text.

use crate::error::GenerateError;
use crate::utils::join_endpoint;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{instrument, warn};
use url::Url;

/// Trait for async text generation.
///
/// Implementors send a prompt to a model and return its completion. The
/// abstraction lets the pipeline run against fakes in tests.
pub trait TextGenerator {
    /// Send `prompt` to the model and return the completion text.
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

#[derive(Serialize, Deserialize, Debug)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Serialize, Deserialize, Debug)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Debug)]
struct GeminiRequest<'a> {
    contents: [GeminiRequestContent<'a>; 1],
}

#[derive(Serialize, Debug)]
struct GeminiRequestContent<'a> {
    parts: [GeminiRequestPart<'a>; 1],
}

#[derive(Serialize, Debug)]
struct GeminiRequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize, Debug)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Deserialize, Debug)]
struct GeminiError {
    message: String,
}

/// Client for a single Gemini model.
///
/// The API key is configured once at startup. Without one, every call fails
/// with [`GenerateError::MissingApiKey`] and no request is sent.
pub struct GeminiClient {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .finish()
    }
}

impl GeminiClient {
    pub fn new(client: Client, base_url: &str, model: &str, api_key: Option<String>) -> Result<Self, GenerateError> {
        let endpoint = join_endpoint(base_url, &format!("v1beta/models/{model}:generateContent"))?;
        Ok(Self {
            client,
            endpoint,
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }
}

impl TextGenerator for GeminiClient {
    #[instrument(level = "info", skip_all)]
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let api_key = self.api_key.as_deref().ok_or(GenerateError::MissingApiKey)?;
        let request = GeminiRequest {
            contents: [GeminiRequestContent {
                parts: [GeminiRequestPart { text: prompt }],
            }],
        };

        let t0 = Instant::now();
        let res = self
            .client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;
        let status = res.status();
        let body = res.json::<GeminiResponse>().await;
        let dt = t0.elapsed();

        let body = match body {
            Ok(body) => body,
            Err(e) if !status.is_success() => {
                warn!(elapsed_ms = dt.as_millis() as u64, %status, "Gemini call failed");
                return Err(GenerateError::Api(format!("HTTP {status}: {e}")));
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(error) = body.error {
            warn!(elapsed_ms = dt.as_millis() as u64, %status, error = %error.message, "Gemini call failed");
            return Err(GenerateError::Api(error.message));
        }
        if !status.is_success() {
            return Err(GenerateError::Api(format!("HTTP {status}")));
        }

        let text: String = body
            .candidates
            .into_iter()
            .flatten()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Err(GenerateError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, key: Option<&str>) -> GeminiClient {
        GeminiClient::new(Client::new(), &server.uri(), "gemini-1.5-flash", key.map(str::to_string)).unwrap()
    }

    #[tokio::test]
    async fn test_generate_returns_trimmed_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .and(header("x-goog-api-key", "key"))
            .and(body_json(json!({ "contents": [{ "parts": [{ "text": "Summarize this" }] }] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "  A short summary.\n" }] } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server, Some("key")).generate("Summarize this").await.unwrap();
        assert_eq!(text, "A short summary.");
    }

    #[tokio::test]
    async fn test_base_url_path_prefix_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/gemini/v1beta/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "Proxied." }] } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let base = format!("{}/gemini", server.uri());
        let client = GeminiClient::new(Client::new(), &base, "gemini-1.5-flash", Some("key".to_string())).unwrap();
        assert_eq!(client.generate("hi").await.unwrap(), "Proxied.");
    }

    #[tokio::test]
    async fn test_missing_key_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

        let err = client(&server, None).generate("hi").await.unwrap_err();
        assert!(matches!(err, GenerateError::MissingApiKey));
    }

    #[tokio::test]
    async fn test_api_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": { "code": 403, "message": "API key not valid.", "status": "PERMISSION_DENIED" }
            })))
            .mount(&server)
            .await;

        let err = client(&server, Some("bad")).generate("hi").await.unwrap_err();
        assert_eq!(err.to_string(), "API key not valid.");
    }

    #[tokio::test]
    async fn test_empty_candidates_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let err = client(&server, Some("key")).generate("hi").await.unwrap_err();
        assert!(matches!(err, GenerateError::EmptyResponse));
    }
}
