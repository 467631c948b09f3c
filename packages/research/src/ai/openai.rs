//! OpenAI implementation of the [`ChatModel`] trait.
//!
//! A reference implementation using the chat completions API, with vision
//! support via `image_url` content parts.
//!
//! # Example
//!
//! ```rust,ignore
//! use research::ai::OpenAi;
//!
//! let model = OpenAi::new("sk-...").with_model("gpt-4o-mini");
//! let extractor = MarketExtractor::new(model);
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{ResearchError, Result};
use crate::security::SecretString;
use crate::traits::ChatModel;

const BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI-backed chat model.
///
/// Completions run at temperature 0; structured extraction needs
/// deterministic output, not creativity.
#[derive(Clone)]
pub struct OpenAi {
    client: Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

impl OpenAi {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: "gpt-4o".to_string(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            ResearchError::ConfigMissing {
                what: "OPENAI_API_KEY".to_string(),
            }
        })?;
        Ok(Self::new(api_key))
    }

    /// Set the chat model (default: gpt-4o).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Get the current model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, system: &str, user_content: Value) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Value::String(system.to_string()),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_content,
                },
            ],
            temperature: 0.0,
            max_tokens: Some(4096),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ResearchError::Model(e.to_string().into()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ResearchError::Model(
                format!("OpenAI API error: {}", error_text).into(),
            ));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ResearchError::Model(e.to_string().into()))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ResearchError::Model("No response from OpenAI".into()))
    }
}

#[async_trait]
impl ChatModel for OpenAi {
    fn is_configured(&self) -> bool {
        !self.api_key.expose().is_empty()
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        self.chat(system, Value::String(user.to_string())).await
    }

    async fn complete_with_images(
        &self,
        system: &str,
        user: &str,
        image_urls: &[String],
    ) -> Result<String> {
        let mut parts = vec![json!({"type": "text", "text": user})];
        for url in image_urls {
            parts.push(json!({
                "type": "image_url",
                "image_url": {"url": url},
            }));
        }
        self.chat(system, Value::Array(parts)).await
    }
}

// Request/Response types

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    // A plain string for text-only turns, an array of content parts for
    // vision turns.
    content: Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_builder() {
        let model = OpenAi::new("sk-test")
            .with_model("gpt-4o-mini")
            .with_base_url("https://custom.api.com");

        assert_eq!(model.model, "gpt-4o-mini");
        assert_eq!(model.base_url, "https://custom.api.com");
        assert!(model.is_configured());
    }

    #[test]
    fn test_empty_key_is_unconfigured() {
        assert!(!OpenAi::new("").is_configured());
    }
}
