//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Drift - Plain-language financial insight for small businesses
#[derive(Parser)]
#[command(name = "drift")]
#[command(about = "Liquidity, cash-flow and profitability analysis on top of Tripletex", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "drift.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set DRIFT_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3001")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing the dashboard build to serve
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Disable per-client rate limiting (for local development only)
        #[arg(long)]
        no_rate_limit: bool,
    },

    /// Run one analysis locally and print the report
    Analyze {
        /// Analysis: liquidity, cashflow, profitability
        #[arg(short, long)]
        kind: String,

        /// JSON file with transactions: an array of amounts, an array of
        /// objects with an `amount` field, or a Tripletex `{ "values": [...] }` page
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Fetch the last 90 days from Tripletex with this session token instead
        /// (falls back to TRIPLETEX_SESSION_TOKEN when no file is given)
        #[arg(long, conflicts_with = "file")]
        tripletex_token: Option<String>,

        /// Number of weeks (liquidity) or months (cash flow)
        #[arg(long)]
        periods: Option<u32>,

        /// Seed the projection jitter for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// First forecast month (YYYY-MM), defaults to the current month
        #[arg(long)]
        start: Option<String>,

        /// Ask the configured language model for an insight
        #[arg(long)]
        insight: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show stored analyses for a user
    History {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Only this analysis kind
        #[arg(short, long)]
        kind: Option<String>,

        /// Maximum entries to show
        #[arg(short, long, default_value = "10")]
        limit: i64,
    },

    /// Show database and integration status
    Status,
}
