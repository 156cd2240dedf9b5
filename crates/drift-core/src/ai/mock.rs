//! Mock backend for testing
//!
//! Answers without any network access. Useful for unit tests and local
//! development without an API key.

use async_trait::async_trait;

use crate::analysis::ReportLocale;
use crate::error::{Error, Result};
use crate::models::AnalysisKind;

use super::InsightBackend;

/// Mock insight backend
///
/// Returns a predictable text naming the analysis kind and row count.
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    /// Whether generate_insight should fail
    pub fail: bool,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            fail: false,
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            fail: false,
        }
    }

    /// Create a backend whose insight requests always error
    pub fn failing() -> Self {
        Self {
            healthy: true,
            fail: true,
        }
    }
}

#[async_trait]
impl InsightBackend for MockBackend {
    async fn generate_insight(
        &self,
        kind: AnalysisKind,
        data: &serde_json::Value,
        locale: ReportLocale,
    ) -> Result<String> {
        if self.fail {
            return Err(Error::Insight("mock backend configured to fail".into()));
        }

        let rows = data.as_array().map(|a| a.len()).unwrap_or(0);
        Ok(format!("[mock {}] {} insight over {} rows", locale, kind, rows))
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
