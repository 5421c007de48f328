//! Gemini adapter — Google AI `generateContent`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{api_failure, non_empty, LazyHttpClient, PromptPayload, ProviderError, TextGenerator};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

pub struct GeminiProvider {
    client: LazyHttpClient,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: Option<String>, base_url: Option<String>, timeout: Duration) -> Self {
        Self {
            client: LazyHttpClient::new("gemini", api_key, timeout),
            base_url: base_url.unwrap_or_else(|| GEMINI_API_URL.to_string()),
        }
    }
}

fn build_request(prompt: &PromptPayload, temperature: f32) -> GenerateRequest<'_> {
    GenerateRequest {
        system_instruction: Content {
            role: None,
            parts: [Part {
                text: &prompt.system_instructions,
            }],
        },
        contents: [Content {
            role: Some("user"),
            parts: [Part {
                text: &prompt.user_content,
            }],
        }],
        generation_config: GenerationConfig { temperature },
    }
}

/// Concatenates the text parts of the first candidate.
fn read_text(response: GenerateResponse) -> Result<String, ProviderError> {
    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .filter(|c| !c.parts.is_empty())
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>());
    non_empty(text)
}

#[async_trait]
impl TextGenerator for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(
        &self,
        prompt: &PromptPayload,
        model: Option<&str>,
        temperature: f32,
    ) -> Result<String, ProviderError> {
        let client = self.client.get().await?;
        let model = model.unwrap_or(DEFAULT_MODEL);
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        );

        let response = client
            .http
            .post(url)
            .header("x-goog-api-key", &client.api_key)
            .json(&build_request(prompt, temperature))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_failure(response).await);
        }

        let body = response.text().await?;
        let parsed: GenerateResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "gemini call succeeded: model={}, prompt_tokens={}, candidate_tokens={}",
                model, usage.prompt_token_count, usage.candidates_token_count
            );
        }

        read_text(parsed)
    }
}
