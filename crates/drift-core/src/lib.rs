//! Drift Core Library
//!
//! Shared functionality for the Drift financial insight service:
//! - Analysis engine (liquidity budget, cash-flow forecast, profitability)
//! - Database access and migrations (users, analysis history)
//! - Password hashing for user accounts
//! - Tripletex accounting API client
//! - Pluggable language-model backends for plain-language insights

pub mod ai;
pub mod analysis;
pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod tripletex;

/// Test utilities including mock Tripletex and OpenAI servers
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{insight_or_fallback, InsightBackend, InsightClient, MockBackend, OpenAICompatibleBackend};
pub use analysis::{
    AnalysisConfig, AnalysisEngine, AnalysisReport, RandomSource, ReportLocale, SeededRandom,
    SystemRandom,
};
pub use db::{Database, DashboardStats};
pub use error::{Error, Result};
pub use models::{AnalysisKind, NewUser, StoredAnalysis, Transaction, User};
pub use tripletex::{AccountingSource, TripletexClient};
