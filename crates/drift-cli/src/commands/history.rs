//! Stored analysis history

use anyhow::{Context, Result};
use drift_core::db::Database;
use drift_core::models::AnalysisKind;

use super::truncate;

pub fn cmd_history(db: &Database, email: &str, kind: Option<&str>, limit: i64) -> Result<()> {
    let user = db
        .get_user_by_email(email)?
        .with_context(|| format!("No user registered with email {}", email))?;

    let kind = kind
        .map(|k| k.parse::<AnalysisKind>().map_err(anyhow::Error::msg))
        .transpose()?;

    let analyses = db.list_analyses(user.id, kind, limit.max(1))?;

    if analyses.is_empty() {
        println!("No analyses stored for {} yet.", user.email);
        return Ok(());
    }

    println!();
    println!("📜 Analyses for {}", user.email);
    println!("   ─────────────────────────────────────────────────────────────");

    for analysis in &analyses {
        let rows = analysis.data.as_array().map(|a| a.len()).unwrap_or(0);
        println!(
            "   #{:<5} {}  {:<14} {} rows",
            analysis.id,
            analysis.created_at.format("%Y-%m-%d %H:%M"),
            analysis.kind.as_str(),
            rows
        );
        if let Some(insight) = &analysis.insight {
            println!("          {}", truncate(insight, 70));
        }
    }

    println!();
    println!("   {} shown", analyses.len());
    Ok(())
}
