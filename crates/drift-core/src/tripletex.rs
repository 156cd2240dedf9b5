//! Tripletex accounting API client
//!
//! Tripletex authenticates with HTTP Basic auth: username `0` (the company
//! the token belongs to) and the session token as password. List endpoints
//! wrap their payload as `{ "values": [...] }`.
//!
//! # Configuration
//!
//! - `TRIPLETEX_BASE_URL`: API root (default: https://api.tripletex.no/v2)

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::Transaction;

/// Production API root
pub const DEFAULT_BASE_URL: &str = "https://api.tripletex.no/v2";

/// Environment variable overriding the API root (used for sandboxes and tests)
pub const BASE_URL_ENV: &str = "TRIPLETEX_BASE_URL";

/// Page size requested from every list endpoint
pub const PAGE_SIZE: u32 = 1000;

/// Days of history pulled for an analysis
pub const DEFAULT_FETCH_DAYS: u64 = 90;

/// `{ "values": [...] }` list envelope
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub values: Vec<T>,
}

/// A chart-of-accounts entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerAccount {
    pub id: i64,
    pub number: i64,
    pub name: String,
}

/// Customer or supplier record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
}

/// The accounting calls the analysis flow depends on
#[async_trait]
pub trait AccountingSource: Send + Sync {
    /// Confirm the credential works (any successful authenticated call)
    async fn verify_credentials(&self) -> Result<()>;

    /// Ledger movements booked between `from` and `to` (inclusive)
    async fn fetch_transactions(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Transaction>>;
}

/// HTTP client for one Tripletex session
#[derive(Clone)]
pub struct TripletexClient {
    http_client: Client,
    base_url: String,
    session_token: String,
}

impl std::fmt::Debug for TripletexClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TripletexClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl TripletexClient {
    pub fn new(base_url: &str, session_token: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session_token: session_token.to_string(),
        }
    }

    /// Client against `TRIPLETEX_BASE_URL`, or the production API
    pub fn from_env(session_token: &str) -> Self {
        Self::new(&base_url_from_env(), session_token)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Tripletex request");

        let response = self
            .http_client
            .get(&url)
            .basic_auth("0", Some(&self.session_token))
            .query(&[("count", PAGE_SIZE.to_string())])
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), path, "Tripletex request failed");
            return Err(Error::Accounting {
                status: status.as_u16(),
                message: body,
            });
        }

        let list: ListResponse<T> = response.json().await?;
        Ok(list.values)
    }

    pub async fn get_accounts(&self) -> Result<Vec<LedgerAccount>> {
        self.get_list("/ledger/account", &[]).await
    }

    /// Vouchers in a date window; only `amount` is read from each entry
    pub async fn get_transactions(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        self.get_list(
            "/ledger/voucher",
            &[
                ("dateFrom", from.format("%Y-%m-%d").to_string()),
                ("dateTo", to.format("%Y-%m-%d").to_string()),
            ],
        )
        .await
    }

    pub async fn get_customers(&self) -> Result<Vec<Contact>> {
        self.get_list("/customer", &[]).await
    }

    pub async fn get_suppliers(&self) -> Result<Vec<Contact>> {
        self.get_list("/supplier", &[]).await
    }
}

#[async_trait]
impl AccountingSource for TripletexClient {
    async fn verify_credentials(&self) -> Result<()> {
        self.get_accounts().await.map(|_| ())
    }

    async fn fetch_transactions(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Transaction>> {
        self.get_transactions(from, to).await
    }
}

/// API root from the environment, falling back to production
pub fn base_url_from_env() -> String {
    std::env::var(BASE_URL_ENV)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

/// `(today - days, today)`
pub fn fetch_window(today: NaiveDate, days: u64) -> (NaiveDate, NaiveDate) {
    let from = today.checked_sub_days(Days::new(days)).unwrap_or(today);
    (from, today)
}

/// Pull the default 90-day history ending at `today`
pub async fn fetch_recent_transactions(
    source: &dyn AccountingSource,
    today: NaiveDate,
) -> Result<Vec<Transaction>> {
    let (from, to) = fetch_window(today, DEFAULT_FETCH_DAYS);
    source.fetch_transactions(from, to).await
}
