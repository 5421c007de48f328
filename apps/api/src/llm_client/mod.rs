//! LLM Client — the provider boundary for résumé tailoring.
//!
//! Every backend implements `TextGenerator`. Adapters only marshal the shared
//! `PromptPayload` to their wire schema and read the generated text back;
//! prompt building, JSON extraction and normalization live in `tailoring`
//! and are shared by all of them.
//!
//! No adapter retries. A single attempt per call; retry policy belongs to the caller.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::config::{ProviderKind, TailorConfig};

pub mod anthropic;
pub mod gemini;
pub mod groq;

pub use anthropic::AnthropicProvider;
pub use gemini::GeminiProvider;
pub use groq::GroqProvider;

/// System + user message pair sent to a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptPayload {
    pub system_instructions: String,
    pub user_content: String,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0} API key is not configured (set TAILOR_API_KEY)")]
    MissingCredential(&'static str),

    #[error("provider returned no content (the response may have been filtered)")]
    EmptyResponse,

    #[error("provider backend error: {0}")]
    Backend(#[from] BackendFailure),
}

/// Transport or provider-side failure, passed through unclassified.
#[derive(Debug, Error)]
pub enum BackendFailure {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("undecodable provider payload: {0}")]
    Payload(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Backend(BackendFailure::Http(e))
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Backend(BackendFailure::Payload(e))
    }
}

/// The capability "generate text from a prompt".
///
/// Carried by the orchestrator as `Arc<dyn TextGenerator>`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short backend name, used in logs and credential errors.
    fn name(&self) -> &'static str;

    async fn generate(
        &self,
        prompt: &PromptPayload,
        model: Option<&str>,
        temperature: f32,
    ) -> Result<String, ProviderError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Lazily-authenticated HTTP client
// ────────────────────────────────────────────────────────────────────────────

/// An HTTP client paired with the API key it authenticates with.
#[derive(Debug)]
pub struct AuthedClient {
    pub http: Client,
    pub api_key: String,
}

/// Checks the API key on first use and caches the built client.
///
/// A missing key is reported on every call and never cached. The client is
/// built under the cell's init guard, so concurrent first calls share one build.
#[derive(Debug)]
pub struct LazyHttpClient {
    provider: &'static str,
    api_key: Option<String>,
    timeout: Duration,
    cell: OnceCell<AuthedClient>,
}

impl LazyHttpClient {
    pub fn new(provider: &'static str, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            provider,
            api_key,
            timeout,
            cell: OnceCell::new(),
        }
    }

    pub async fn get(&self) -> Result<&AuthedClient, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ProviderError::MissingCredential(self.provider))?;

        self.cell
            .get_or_try_init(|| async {
                let http = Client::builder().timeout(self.timeout).build()?;
                debug!("{} HTTP client initialized", self.provider);
                Ok::<_, ProviderError>(AuthedClient {
                    http,
                    api_key: api_key.to_string(),
                })
            })
            .await
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Shared response helpers
// ────────────────────────────────────────────────────────────────────────────

/// Maps empty or whitespace-only generated text to `EmptyResponse`.
pub(crate) fn non_empty(text: Option<String>) -> Result<String, ProviderError> {
    match text {
        Some(t) if !t.trim().is_empty() => Ok(t),
        _ => Err(ProviderError::EmptyResponse),
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Turns a non-success response into `BackendFailure::Api`, preferring the
/// provider's `{"error": {"message": ...}}` text over the raw body.
pub(crate) async fn api_failure(response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    ProviderError::Backend(BackendFailure::Api { status, message })
}

/// Builds the adapter named by configuration.
pub fn build_provider(config: &TailorConfig) -> Arc<dyn TextGenerator> {
    let timeout = Duration::from_secs(config.timeout_secs);
    let api_key = config.api_key.clone();
    let base_url = config.base_url.clone();

    match config.provider {
        ProviderKind::Groq => Arc::new(GroqProvider::new(api_key, base_url, timeout)),
        ProviderKind::Gemini => Arc::new(GeminiProvider::new(api_key, base_url, timeout)),
        ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(api_key, base_url, timeout)),
    }
}
