//! Domain models for Drift

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A ledger movement as consumed by the Analysis Engine
///
/// Positive amounts are inflows (revenue), negative amounts are outflows
/// (expenses). Any other fields sent by the accounting API are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub amount: f64,
}

impl Transaction {
    pub fn new(amount: f64) -> Self {
        Self { amount }
    }

    pub fn is_inflow(&self) -> bool {
        self.amount > 0.0
    }

    pub fn is_outflow(&self) -> bool {
        self.amount < 0.0
    }
}

impl From<f64> for Transaction {
    fn from(amount: f64) -> Self {
        Self { amount }
    }
}

/// The three canned analyses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Liquidity,
    Cashflow,
    Profitability,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 3] = [
        AnalysisKind::Liquidity,
        AnalysisKind::Cashflow,
        AnalysisKind::Profitability,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Liquidity => "liquidity",
            AnalysisKind::Cashflow => "cashflow",
            AnalysisKind::Profitability => "profitability",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "liquidity" => Ok(AnalysisKind::Liquidity),
            "cashflow" | "cash_flow" | "cash-flow" => Ok(AnalysisKind::Cashflow),
            "profitability" => Ok(AnalysisKind::Profitability),
            _ => Err(format!("Unknown analysis kind: {}", s)),
        }
    }
}

/// A registered user (the password hash never leaves the database layer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub company_name: Option<String>,
    /// Linked Tripletex session token
    #[serde(skip_serializing)]
    pub tripletex_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn tripletex_configured(&self) -> bool {
        self.tripletex_token
            .as_deref()
            .map(|t| !t.is_empty())
            .unwrap_or(false)
    }
}

/// Fields needed to register a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub company_name: Option<String>,
}

/// A persisted analysis result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAnalysis {
    pub id: i64,
    pub user_id: i64,
    pub kind: AnalysisKind,
    /// Report rows as returned to the client
    pub data: serde_json::Value,
    pub insight: Option<String>,
    pub created_at: DateTime<Utc>,
}
