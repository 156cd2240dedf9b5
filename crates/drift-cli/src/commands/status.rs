//! Status command implementation

use std::path::Path;

use anyhow::Result;
use drift_core::db::DB_KEY_ENV;
use drift_core::{tripletex, InsightBackend, InsightClient};

use super::open_db;

pub fn cmd_status(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!();
    println!("📊 Drift Status");
    println!("   ─────────────────────────────────────────────────────────────");

    println!("   Database: {}", db_path.display());

    if db_path.exists() {
        if let Ok(metadata) = std::fs::metadata(db_path) {
            let size_kb = metadata.len() as f64 / 1024.0;
            if size_kb < 1024.0 {
                println!("   Size: {:.1} KB", size_kb);
            } else {
                println!("   Size: {:.1} MB", size_kb / 1024.0);
            }
        }
    } else {
        println!("   Size: (database not initialized)");
    }

    let has_key = std::env::var(DB_KEY_ENV).is_ok();
    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else if has_key {
        println!("   🔒 Encryption: ENABLED ({}=***)", DB_KEY_ENV);
    } else {
        println!("   ❌ Encryption: REQUIRED but {} not set", DB_KEY_ENV);
    }

    if db_path.exists() {
        match open_db(db_path, no_encrypt) {
            Ok(db) => {
                match db.is_encrypted() {
                    Ok(true) => println!("   🔒 Opened with SQLCipher key"),
                    Ok(false) => println!("   ⚠️  Opened without encryption"),
                    Err(e) => println!("   ❌ Could not check encryption: {}", e),
                }
                if let Ok(stats) = db.get_dashboard_stats() {
                    println!();
                    println!("   Users: {}", stats.total_users);
                    println!("   Linked to Tripletex: {}", stats.linked_users);
                    println!("   Stored analyses: {}", stats.total_analyses);
                }
            }
            Err(e) => {
                println!();
                println!("   ❌ Error opening database: {}", e);
                if !no_encrypt && !has_key {
                    println!("      Set {} or use --no-encrypt", DB_KEY_ENV);
                } else if has_key {
                    println!("      (Check if {} is correct)", DB_KEY_ENV);
                }
            }
        }
    }

    println!();
    println!("   Tripletex API: {}", tripletex::base_url_from_env());
    match InsightClient::from_env() {
        Some(client) => println!(
            "   🤖 Insight backend: {} (model: {})",
            client.host(),
            client.model()
        ),
        None => println!("   💡 Insight backend: not configured, canned texts are used"),
    }
    if std::env::var(drift_server::JWT_SECRET_ENV).is_ok() {
        println!("   🔑 Session signing: {} set", drift_server::JWT_SECRET_ENV);
    } else {
        println!(
            "   ❌ Session signing: {} not set, `drift serve` will refuse to start",
            drift_server::JWT_SECRET_ENV
        );
    }

    println!();
    Ok(())
}
