//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use drift_server::ServerConfig;

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_encrypt: bool,
    static_dir: Option<&Path>,
    no_rate_limit: bool,
) -> Result<()> {
    let mut config = ServerConfig::from_env()?;
    if no_rate_limit {
        config.rate_limit = None;
    }

    println!("🚀 Starting Drift API server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}/api", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }
    println!("   Tripletex: {}", config.tripletex_base_url);
    if !config.allowed_origins.is_empty() {
        println!("   🌐 CORS origins: {}", config.allowed_origins.join(", "));
    }
    match &config.rate_limit {
        Some(limit) => println!(
            "   🚦 Rate limit: {} requests per {} min",
            limit.max_requests,
            limit.window.as_secs() / 60
        ),
        None => println!("   ⚠️  Rate limiting DISABLED (--no-rate-limit)"),
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    let static_dir_str = static_dir
        .map(|p| p.to_str().context("static_dir path must be valid UTF-8"))
        .transpose()?;
    drift_server::serve_with_config(db, host, port, static_dir_str, config).await?;

    Ok(())
}
