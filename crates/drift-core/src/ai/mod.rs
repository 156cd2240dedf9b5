//! Pluggable language-model backend for analysis insights
//!
//! Each analysis report is sent to a chat-completion model which answers with
//! a short plain-language explanation. The model is optional: when no backend
//! is configured or a request fails, a canned per-kind text is used instead.
//!
//! # Architecture
//!
//! - `InsightBackend` trait: the operations every backend offers
//! - `InsightClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OpenAICompatibleBackend`, `MockBackend`
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (openai_compatible, mock, none). Default: openai_compatible
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (default: https://api.openai.com)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-4)
//! - `OPENAI_COMPATIBLE_API_KEY` or `OPENAI_API_KEY`: API key

mod mock;
mod openai_compatible;
pub mod prompts;

pub use mock::MockBackend;
pub use openai_compatible::OpenAICompatibleBackend;
pub use prompts::{fallback_insight, system_prompt, user_prompt};

use async_trait::async_trait;

use crate::analysis::ReportLocale;
use crate::error::Result;
use crate::models::AnalysisKind;

/// Trait defining the interface for all insight backends
#[async_trait]
pub trait InsightBackend: Send + Sync {
    /// Explain a report in plain language
    async fn generate_insight(
        &self,
        kind: AnalysisKind,
        data: &serde_json::Value,
        locale: ReportLocale,
    ) -> Result<String>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Get the model name
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete insight client enum
#[derive(Clone)]
pub enum InsightClient {
    /// OpenAI or any server speaking its chat completions API
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl InsightClient {
    /// Create an insight client from environment variables
    ///
    /// Returns None when `AI_BACKEND=none` or no endpoint/key is configured,
    /// in which case callers fall back to canned texts.
    pub fn from_env() -> Option<Self> {
        let backend =
            std::env::var("AI_BACKEND").unwrap_or_else(|_| "openai_compatible".to_string());

        match backend.to_lowercase().as_str() {
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp" => {
                OpenAICompatibleBackend::from_env().map(InsightClient::OpenAICompatible)
            }
            "mock" => Some(InsightClient::Mock(MockBackend::new())),
            "none" | "off" | "disabled" => None,
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to openai_compatible");
                OpenAICompatibleBackend::from_env().map(InsightClient::OpenAICompatible)
            }
        }
    }

    /// Create an OpenAI-compatible backend directly
    pub fn openai_compatible(host: &str, model: &str, api_key: Option<&str>) -> Self {
        let backend = match api_key {
            Some(key) => OpenAICompatibleBackend::with_api_key(host, model, key),
            None => OpenAICompatibleBackend::new(host, model),
        };
        InsightClient::OpenAICompatible(backend)
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        InsightClient::Mock(MockBackend::new())
    }
}

#[async_trait]
impl InsightBackend for InsightClient {
    async fn generate_insight(
        &self,
        kind: AnalysisKind,
        data: &serde_json::Value,
        locale: ReportLocale,
    ) -> Result<String> {
        match self {
            InsightClient::OpenAICompatible(b) => b.generate_insight(kind, data, locale).await,
            InsightClient::Mock(b) => b.generate_insight(kind, data, locale).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            InsightClient::OpenAICompatible(b) => b.health_check().await,
            InsightClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            InsightClient::OpenAICompatible(b) => b.model(),
            InsightClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            InsightClient::OpenAICompatible(b) => b.host(),
            InsightClient::Mock(b) => b.host(),
        }
    }
}

/// Ask the model for an insight, substituting the canned text on any failure
pub async fn insight_or_fallback(
    client: Option<&InsightClient>,
    kind: AnalysisKind,
    data: &serde_json::Value,
    locale: ReportLocale,
) -> String {
    let Some(client) = client else {
        return fallback_insight(kind, locale).to_string();
    };

    match client.generate_insight(kind, data, locale).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            tracing::warn!(kind = %kind, model = client.model(), "Empty insight, using fallback");
            fallback_insight(kind, locale).to_string()
        }
        Err(e) => {
            tracing::warn!(kind = %kind, model = client.model(), error = %e, "Insight generation failed, using fallback");
            fallback_insight(kind, locale).to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insight_client_mock() {
        let client = InsightClient::mock();
        assert_eq!(client.model(), "mock");
        assert_eq!(client.host(), "mock://localhost");
    }

    #[tokio::test]
    async fn test_mock_health_check() {
        let client = InsightClient::mock();
        assert!(client.health_check().await);
    }

    #[tokio::test]
    async fn test_fallback_without_client() {
        let text = insight_or_fallback(
            None,
            AnalysisKind::Liquidity,
            &serde_json::json!([]),
            ReportLocale::NbNo,
        )
        .await;
        assert!(text.starts_with("Likviditeten ser stabil ut."));
    }

    #[tokio::test]
    async fn test_fallback_on_backend_error() {
        let client = InsightClient::Mock(MockBackend::failing());
        let text = insight_or_fallback(
            Some(&client),
            AnalysisKind::Profitability,
            &serde_json::json!([]),
            ReportLocale::EnUs,
        )
        .await;
        assert_eq!(
            text,
            fallback_insight(AnalysisKind::Profitability, ReportLocale::EnUs)
        );
    }

    #[tokio::test]
    async fn test_mock_insight_passes_through() {
        let client = InsightClient::mock();
        let text = insight_or_fallback(
            Some(&client),
            AnalysisKind::Cashflow,
            &serde_json::json!([{"label": "jan"}]),
            ReportLocale::NbNo,
        )
        .await;
        assert!(text.contains("cashflow"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_falls_back() {
        let client = InsightClient::openai_compatible("http://127.0.0.1:1", "gpt-4", None);
        let text = insight_or_fallback(
            Some(&client),
            AnalysisKind::Cashflow,
            &serde_json::json!([]),
            ReportLocale::NbNo,
        )
        .await;
        assert_eq!(text, fallback_insight(AnalysisKind::Cashflow, ReportLocale::NbNo));
    }
}
