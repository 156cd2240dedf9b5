//! OpenAI-compatible backend implementation
//!
//! Works with the hosted OpenAI API and any server that implements its chat
//! completions endpoint (vLLM, LocalAI, llama-server, ...).
//!
//! # Configuration
//!
//! Environment variables:
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (default: https://api.openai.com)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-4)
//! - `OPENAI_COMPATIBLE_API_KEY` or `OPENAI_API_KEY`: API key

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::ReportLocale;
use crate::error::{Error, Result};
use crate::models::AnalysisKind;

use super::prompts::{system_prompt, user_prompt};
use super::InsightBackend;

pub const DEFAULT_HOST: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Insights are a few sentences
const MAX_TOKENS: u32 = 300;
const TEMPERATURE: f32 = 0.7;

/// OpenAI-compatible backend
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAICompatibleBackend {
    /// Create a new OpenAI-compatible backend
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: None,
        }
    }

    /// Create with an API key
    pub fn with_api_key(base_url: &str, model: &str, api_key: &str) -> Self {
        let mut backend = Self::new(base_url, model);
        backend.api_key = Some(api_key.to_string());
        backend
    }

    /// Create from environment variables
    ///
    /// Needs at least a host or an API key; returns None otherwise.
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OPENAI_COMPATIBLE_HOST")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let api_key = std::env::var("OPENAI_COMPATIBLE_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .ok()
            .filter(|s| !s.trim().is_empty());

        if host.is_none() && api_key.is_none() {
            return None;
        }

        let model = std::env::var("OPENAI_COMPATIBLE_MODEL")
            .unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let mut backend = Self::new(host.as_deref().unwrap_or(DEFAULT_HOST), &model);
        backend.api_key = api_key;
        Some(backend)
    }

    /// Make a chat completion request
    async fn chat_completion(&self, system: &str, prompt: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: Some(TEMPERATURE),
            max_tokens: Some(MAX_TOKENS),
            stream: false,
        };

        let mut req_builder = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&request);

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req_builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Insight(format!(
                "OpenAI API error {}: {}",
                status, body
            )));
        }

        let chat_response: ChatCompletionResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| Error::Insight("No response from OpenAI API".into()))
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

#[async_trait]
impl InsightBackend for OpenAICompatibleBackend {
    async fn generate_insight(
        &self,
        kind: AnalysisKind,
        data: &serde_json::Value,
        locale: ReportLocale,
    ) -> Result<String> {
        debug!(kind = %kind, model = %self.model, "Requesting insight");
        let prompt = user_prompt(kind, data, locale);
        self.chat_completion(system_prompt(locale), &prompt).await
    }

    async fn health_check(&self) -> bool {
        let mut req = self
            .http_client
            .get(format!("{}/v1/models", self.base_url));
        if let Some(ref api_key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        match req.send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
