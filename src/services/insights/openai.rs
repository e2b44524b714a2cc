use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    services::insights::{build_prompt, NarrativeGenerator, TasteProfile},
};

const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

/// Taste summaries from the OpenAI chat completions API
#[derive(Clone)]
pub struct OpenAiNarrator {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

impl OpenAiNarrator {
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            model,
        }
    }

    fn extract_text(completion: ChatCompletion) -> AppResult<String> {
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| AppError::ExternalApi("Chat completion returned no text".to_string()))
    }
}

#[async_trait::async_trait]
impl NarrativeGenerator for OpenAiNarrator {
    async fn summarize(&self, profile: &TasteProfile) -> AppResult<String> {
        // Build the chat completion request
        let url = format!("{}/chat/completions", self.api_url);
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": build_prompt(profile) }],
            "temperature": TEMPERATURE,
        });

        tracing::debug!(session_id = %profile.session_id, model = %self.model, "Requesting taste insight");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        // Check for error status
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                session_id = %profile.session_id,
                status = %status,
                body = %body,
                "Chat completion request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "OpenAI returned status {}: {}",
                status, body
            )));
        }

        // Parse response
        let completion: ChatCompletion = response.json().await?;
        let text = Self::extract_text(completion)?;

        tracing::info!(
            session_id = %profile.session_id,
            generator = self.name(),
            "Taste insight generated"
        );

        Ok(text)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_deserialization() {
        let json = r#"{
            "id": "chatcmpl-123",
            "choices": [
                {
                    "index": 0,
                    "message": { "role": "assistant", "content": "  You crave comfort food.  " },
                    "finish_reason": "stop"
                }
            ]
        }"#;

        let completion: ChatCompletion = serde_json::from_str(json).unwrap();
        let text = OpenAiNarrator::extract_text(completion).unwrap();
        assert_eq!(text, "You crave comfort food.");
    }

    #[test]
    fn test_empty_completion_is_an_error() {
        let completion: ChatCompletion = serde_json::from_str(r#"{ "choices": [] }"#).unwrap();
        let err = OpenAiNarrator::extract_text(completion).unwrap_err();
        assert!(matches!(err, AppError::ExternalApi(_)));
    }
}
