use crate::llm::client::LLMClient;
use crate::types::{AppError, Result};
use crate::utils::config::LLMConfig;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};

/// Client for OpenAI-compatible `/chat/completions` endpoints.
pub struct OpenAIClient {
    http_client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenAIClient {
    pub fn new(api_key: String, api_base: String, model: String) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_key,
            api_base,
            model,
            temperature: 0.0,
        }
    }

    /// Build a client from the validated LLM section of [`Config`](crate::utils::config::Config).
    pub fn from_config(config: &LLMConfig) -> Self {
        Self::new(
            config.api_key.clone(),
            config.api_base.clone(),
            config.model_name.clone(),
        )
        .with_temperature(config.temperature)
    }

    /// Same client, different model. Used for the manager model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }

    async fn complete(&self, messages: Vec<Value>) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
            "stream": false
        });

        let response = self
            .http_client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::LLM(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Auth(format!(
                "{} rejected the API key ({}): {}",
                self.api_base, status, text
            )));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::LLM(format!(
                "Chat completion request failed ({}): {}",
                status, text
            )));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::LLM(format!("Failed to parse response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::LLM(format!("No response from {}", self.model)))
    }
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.complete(vec![json!({ "role": "user", "content": prompt })])
            .await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.complete(vec![
            json!({ "role": "system", "content": system }),
            json!({ "role": "user", "content": prompt }),
        ])
        .await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
