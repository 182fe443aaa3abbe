//! HTTP client for the Claude messages API.
//!
//! Wraps `reqwest` with the Anthropic auth headers, a fixed model and
//! sampling configuration, and retry on rate limiting. Use
//! [`ClaudeClient::with_base_url`] to point at a mock server in tests.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::error::AnalyzeError;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MODEL: &str = "claude-3-haiku-20240307";
const MAX_TOKENS: u32 = 4096;
const TEMPERATURE: f32 = 0.3;
const MAX_RETRIES: u32 = 2;
const RETRY_BASE_MS: u64 = 1_000;
const MAX_RETRY_DELAY_MS: u64 = 30_000;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: &'static str,
    max_tokens: u32,
    temperature: f32,
    system: String,
    messages: Vec<WireMessage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the Claude messages API.
#[derive(Clone)]
pub struct ClaudeClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl ClaudeClient {
    /// Creates a new client pointed at the production Anthropic API.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, AnalyzeError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, AnalyzeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn headers(&self) -> Result<HeaderMap, AnalyzeError> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(&self.api_key).map_err(|_| AnalyzeError::Api {
            status: 0,
            body: "API key contains invalid header characters".to_string(),
        })?;
        key.set_sensitive(true);
        headers.insert("x-api-key", key);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Sends one system + user prompt pair and returns the first text block
    /// of the response.
    ///
    /// Rate-limited requests (429) are retried with exponential back-off and
    /// jitter; any other non-success status is surfaced immediately.
    ///
    /// # Errors
    ///
    /// - [`AnalyzeError::Api`] on a non-2xx status after retries.
    /// - [`AnalyzeError::Http`] on network failure.
    /// - [`AnalyzeError::Deserialize`] if the response body does not match
    ///   the messages API shape.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, AnalyzeError> {
        let url = format!("{}/v1/messages", self.base_url);
        let request = MessagesRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            system: system.to_owned(),
            messages: vec![WireMessage {
                role: "user",
                content: user.to_owned(),
            }],
        };

        let mut attempt = 0u32;
        loop {
            tracing::debug!(model = MODEL, attempt, "Claude messages request");
            let response = self
                .client
                .post(&url)
                .headers(self.headers()?)
                .json(&request)
                .send()
                .await?;
            let status = response.status();

            if status.as_u16() == 429 && attempt < MAX_RETRIES {
                attempt += 1;
                let computed = RETRY_BASE_MS.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_RETRY_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(attempt, delay_ms, "Claude rate limited, backing off");
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(AnalyzeError::Api {
                    status: status.as_u16(),
                    body,
                });
            }

            let body = response.text().await?;
            let parsed: MessagesResponse =
                serde_json::from_str(&body).map_err(|e| AnalyzeError::Deserialize {
                    context: "messages response".to_string(),
                    source: e,
                })?;

            return parsed
                .content
                .into_iter()
                .map(|block| block.text)
                .find(|text| !text.is_empty())
                .ok_or_else(|| {
                    AnalyzeError::MalformedResponse("response had no text content".to_string())
                });
        }
    }
}
