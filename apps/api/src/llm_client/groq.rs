//! Groq adapter — OpenAI-compatible chat completions.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{api_failure, non_empty, LazyHttpClient, PromptPayload, ProviderError, TextGenerator};

const GROQ_API_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

pub struct GroqProvider {
    client: LazyHttpClient,
    base_url: String,
}

impl GroqProvider {
    pub fn new(api_key: Option<String>, base_url: Option<String>, timeout: Duration) -> Self {
        Self {
            client: LazyHttpClient::new("groq", api_key, timeout),
            base_url: base_url.unwrap_or_else(|| GROQ_API_URL.to_string()),
        }
    }
}

fn build_request<'a>(prompt: &'a PromptPayload, model: &'a str, temperature: f32) -> ChatRequest<'a> {
    ChatRequest {
        model,
        temperature,
        messages: [
            ChatMessage {
                role: "system",
                content: &prompt.system_instructions,
            },
            ChatMessage {
                role: "user",
                content: &prompt.user_content,
            },
        ],
    }
}

fn read_text(response: ChatResponse) -> Result<String, ProviderError> {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content);
    non_empty(content)
}

#[async_trait]
impl TextGenerator for GroqProvider {
    fn name(&self) -> &'static str {
        "groq"
    }

    async fn generate(
        &self,
        prompt: &PromptPayload,
        model: Option<&str>,
        temperature: f32,
    ) -> Result<String, ProviderError> {
        let client = self.client.get().await?;
        let model = model.unwrap_or(DEFAULT_MODEL);
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let response = client
            .http
            .post(url)
            .bearer_auth(&client.api_key)
            .json(&build_request(prompt, model, temperature))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_failure(response).await);
        }

        let body = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "groq call succeeded: model={}, prompt_tokens={}, completion_tokens={}",
                model, usage.prompt_tokens, usage.completion_tokens
            );
        }

        read_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt() -> PromptPayload {
        PromptPayload {
            system_instructions: "You are a tailoring expert.".to_string(),
            user_content: "Current resume (JSON): {}".to_string(),
        }
    }

    #[test]
    fn test_request_carries_system_then_user_message() {
        let prompt = prompt();
        let json = serde_json::to_value(build_request(&prompt, DEFAULT_MODEL, 0.3)).unwrap();

        assert_eq!(json["model"], "llama-3.3-70b-versatile");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "You are a tailoring expert.");
        assert_eq!(json["messages"][1]["role"], "user");
        assert!((json["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_reads_first_choice_content() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"{\"title\":\"X\"}"}}],
                "usage":{"prompt_tokens":10,"completion_tokens":5}}"#,
        )
        .unwrap();
        assert_eq!(read_text(response).unwrap(), r#"{"title":"X"}"#);
    }

    #[test]
    fn test_partial_usage_does_not_fail_the_call() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"{}"}}],"usage":{"completion_tokens":5}}"#,
        )
        .unwrap();
        assert_eq!(response.usage.as_ref().unwrap().prompt_tokens, 0);
        assert_eq!(read_text(response).unwrap(), "{}");
    }

    #[test]
    fn test_zero_choices_is_empty_response() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(read_text(response), Err(ProviderError::EmptyResponse)));
    }

    #[test]
    fn test_null_content_is_empty_response() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(matches!(read_text(response), Err(ProviderError::EmptyResponse)));
    }

    #[tokio::test]
    async fn test_generate_without_key_fails_before_any_request() {
        let provider = GroqProvider::new(None, None, Duration::from_secs(1));
        let err = provider.generate(&prompt(), None, 0.3).await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredential("groq")));
    }
}
