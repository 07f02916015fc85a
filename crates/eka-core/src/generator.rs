//! Answer generator seam and the OpenAI-compatible chat-completions client behind it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::GatewayConfig;

/// What the pipeline hands the model: system instructions plus the user's question.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub instructions: String,
    pub question: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("no API key configured")]
    NoApiKey,
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("upstream returned {0}: {1}")]
    Upstream(u16, String),
    #[error("response parse: {0}")]
    Json(String),
    #[error("empty completion")]
    Empty,
}

#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    choices: Option<Vec<Choice>>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Posts `{api_base}/chat/completions` with a bearer key.
pub struct ChatCompletionsGenerator {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
}

impl ChatCompletionsGenerator {
    pub fn new(api_base: impl Into<String>, api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into(),
            api_key,
            model: model.into(),
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(
            config.llm_api_base.clone(),
            config.llm_api_key.clone(),
            config.llm_model.clone(),
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl AnswerGenerator for ChatCompletionsGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or(GenerationError::NoApiKey)?;
        let body = ChatCompletionsRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.instructions,
                },
                ChatMessage {
                    role: "user",
                    content: &request.question,
                },
            ],
        };

        tracing::debug!(model = %self.model, "requesting completion");
        let res = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return Err(GenerationError::Upstream(status.as_u16(), text));
        }

        let parsed: ChatCompletionsResponse =
            serde_json::from_str(&text).map_err(|e| GenerationError::Json(e.to_string()))?;

        parsed
            .choices
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(GenerationError::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let generator = ChatCompletionsGenerator::new("http://127.0.0.1:9", None, "gpt-4o-mini");
        let req = GenerationRequest {
            instructions: "be brief".into(),
            question: "hi".into(),
        };
        let err = generator.generate(&req).await.unwrap_err();
        assert!(matches!(err, GenerationError::NoApiKey));
        assert_eq!(err.to_string(), "no API key configured");
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let generator = ChatCompletionsGenerator::new("https://api.openai.com/v1/", None, "m");
        assert_eq!(generator.endpoint(), "https://api.openai.com/v1/chat/completions");
    }
}
