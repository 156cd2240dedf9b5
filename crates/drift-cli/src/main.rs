//! Drift CLI - Financial insight for small businesses
//!
//! Usage:
//!   drift init                                   Initialize database
//!   drift serve --port 3001                      Start web server
//!   drift analyze --kind cashflow --file tx.json Run an analysis locally
//!   drift history --email me@firma.no            Show stored analyses

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Serve {
            port,
            host,
            static_dir,
            no_rate_limit,
        } => {
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                cli.no_encrypt,
                static_dir.as_deref(),
                no_rate_limit,
            )
            .await
        }
        Commands::Analyze {
            kind,
            file,
            tripletex_token,
            periods,
            seed,
            start,
            insight,
            json,
        } => {
            let token = tripletex_token
                .or_else(|| std::env::var(commands::SESSION_TOKEN_ENV).ok())
                .filter(|t| !t.trim().is_empty());
            let source = match (file, token) {
                (Some(path), _) => commands::TransactionSource::File(path),
                (None, Some(token)) => commands::TransactionSource::Tripletex(token),
                (None, None) => anyhow::bail!(
                    "Either --file or --tripletex-token ({}) is required",
                    commands::SESSION_TOKEN_ENV
                ),
            };
            let options = commands::AnalyzeOptions {
                kind: kind.parse().map_err(anyhow::Error::msg)?,
                periods,
                seed,
                start: start.as_deref().map(commands::parse_month).transpose()?,
                insight,
                json,
            };
            commands::cmd_analyze(source, options).await
        }
        Commands::History { email, kind, limit } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_history(&db, &email, kind.as_deref(), limit)
        }
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt),
    }
}
