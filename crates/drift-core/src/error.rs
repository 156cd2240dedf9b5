//! Error types for Drift

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tripletex API error {status}: {message}")]
    Accounting { status: u16, message: String },

    #[error("Language model error: {0}")]
    Insight(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Empty input: {0} requires at least one transaction")]
    EmptyInput(&'static str),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
