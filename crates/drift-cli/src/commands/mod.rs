//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Database setup (init) and shared utilities (open_db)
//! - `analyze` - Local analysis runs over a JSON file or a live Tripletex ledger
//! - `history` - Stored analyses for one account
//! - `serve` - Web server command
//! - `status` - Database and integration status

pub mod analyze;
pub mod core;
pub mod history;
pub mod serve;
pub mod status;

// Re-export command functions for main.rs
pub use analyze::*;
pub use core::*;
pub use history::*;
pub use serve::*;
pub use status::*;

/// Truncate a string to at most `max` characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
