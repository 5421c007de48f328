//! Anthropic adapter — Messages API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{api_failure, non_empty, LazyHttpClient, PromptPayload, ProviderError, TextGenerator};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: [AnthropicMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

impl AnthropicResponse {
    /// Text of the first `text` block.
    fn into_text(self) -> Option<String> {
        self.content
            .into_iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text)
    }
}

pub struct AnthropicProvider {
    client: LazyHttpClient,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(api_key: Option<String>, base_url: Option<String>, timeout: Duration) -> Self {
        Self {
            client: LazyHttpClient::new("anthropic", api_key, timeout),
            base_url: base_url.unwrap_or_else(|| ANTHROPIC_API_URL.to_string()),
        }
    }
}

fn build_request<'a>(
    prompt: &'a PromptPayload,
    model: &'a str,
    temperature: f32,
) -> AnthropicRequest<'a> {
    AnthropicRequest {
        model,
        max_tokens: MAX_TOKENS,
        temperature,
        system: &prompt.system_instructions,
        messages: [AnthropicMessage {
            role: "user",
            content: &prompt.user_content,
        }],
    }
}

#[async_trait]
impl TextGenerator for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn generate(
        &self,
        prompt: &PromptPayload,
        model: Option<&str>,
        temperature: f32,
    ) -> Result<String, ProviderError> {
        let client = self.client.get().await?;
        let model = model.unwrap_or(DEFAULT_MODEL);
        let url = format!("{}/messages", self.base_url.trim_end_matches('/'));

        let response = client
            .http
            .post(url)
            .header("x-api-key", &client.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&build_request(prompt, model, temperature))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_failure(response).await);
        }

        let body = response.text().await?;
        let parsed: AnthropicResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "anthropic call succeeded: model={}, input_tokens={}, output_tokens={}",
                model, usage.input_tokens, usage.output_tokens
            );
        }

        non_empty(parsed.into_text())
    }
}
