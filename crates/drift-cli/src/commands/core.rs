//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use drift_core::db::Database;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path, no_encrypt)?;
    let stats = db
        .get_dashboard_stats()
        .context("Failed to read database after migrations")?;
    println!("   Tables ready ({} users)", stats.total_users);

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
        println!("      Tripletex session tokens will be stored in clear text");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Set DRIFT_JWT_SECRET to sign session tokens");
    println!("  2. Start the API: drift serve");
    println!("  3. Or try an analysis offline: drift analyze --kind liquidity --file tx.json");

    Ok(())
}
