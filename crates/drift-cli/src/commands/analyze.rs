//! Local analysis runs
//!
//! `drift analyze` runs the same engine as the API without an account: the
//! ledger comes from a JSON file or straight from Tripletex, and the report is
//! printed instead of stored.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};

use drift_core::analysis::{
    AnalysisConfig, AnalysisEngine, AnalysisReport, RandomSource, SeededRandom, SystemRandom,
};
use drift_core::models::{AnalysisKind, Transaction};
use drift_core::tripletex::{fetch_recent_transactions, TripletexClient};
use drift_core::{insight_or_fallback, InsightClient};

/// Session token fallback for `--tripletex-token`
pub const SESSION_TOKEN_ENV: &str = "TRIPLETEX_SESSION_TOKEN";

/// Where the ledger comes from
pub enum TransactionSource {
    File(PathBuf),
    /// Session token for a live Tripletex fetch
    Tripletex(String),
}

#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub kind: AnalysisKind,
    pub periods: Option<u32>,
    pub seed: Option<u64>,
    /// First forecast month; today when absent
    pub start: Option<NaiveDate>,
    pub insight: bool,
    pub json: bool,
}

impl AnalyzeOptions {
    pub fn new(kind: AnalysisKind) -> Self {
        Self {
            kind,
            periods: None,
            seed: None,
            start: None,
            insight: false,
            json: false,
        }
    }
}

/// Parse `YYYY-MM` into the first day of that month
pub fn parse_month(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(&format!("{}-01", input), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", input))
}

/// Read transactions from a JSON file
///
/// Accepts a bare array of amounts, an array of objects carrying `amount`, or a
/// Tripletex list page `{ "values": [...] }`.
pub fn load_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    parse_transactions(value)
}

pub fn parse_transactions(value: Value) -> Result<Vec<Transaction>> {
    let rows = match value {
        Value::Array(rows) => rows,
        Value::Object(mut map) => match map.remove("values") {
            Some(Value::Array(rows)) => rows,
            _ => bail!("Expected an object with a `values` array"),
        },
        _ => bail!("Expected a JSON array of transactions"),
    };

    rows.into_iter()
        .enumerate()
        .map(|(i, row)| match row {
            Value::Number(n) => n
                .as_f64()
                .map(Transaction::new)
                .with_context(|| format!("Row {}: amount out of range", i)),
            Value::Object(_) => serde_json::from_value::<Transaction>(row)
                .with_context(|| format!("Row {}: invalid transaction", i)),
            other => bail!("Row {}: expected a number or an object, got {}", i, other),
        })
        .collect()
}

/// Run the engine with the options' period count, seed and start month
pub fn run_report(
    engine: &AnalysisEngine,
    options: &AnalyzeOptions,
    transactions: &[Transaction],
    today: NaiveDate,
) -> Result<AnalysisReport> {
    let mut rng: Box<dyn RandomSource> = match options.seed {
        Some(seed) => Box::new(SeededRandom::new(seed)),
        None => Box::new(SystemRandom::new()),
    };
    let start = options.start.unwrap_or(today);

    let report = match options.periods {
        Some(0) => bail!("--periods must be at least 1"),
        Some(periods) => {
            engine.run_with_periods(options.kind, transactions, periods, start, rng.as_mut())?
        }
        None => engine.run(options.kind, transactions, start, rng.as_mut())?,
    };
    Ok(report)
}

/// Plain-text table for terminal output
pub fn render_report(report: &AnalysisReport) -> String {
    let mut out = String::new();

    match report {
        AnalysisReport::Liquidity(weeks) => {
            let _ = writeln!(
                out,
                "{:<10} {:>12} {:>12} {:>12} {:>14}",
                "", "Inflow", "Outflow", "Net", "Balance"
            );
            for week in weeks {
                let _ = writeln!(
                    out,
                    "{:<10} {:>12} {:>12} {:>12} {:>14}",
                    week.label, week.inflow, week.outflow, week.net, week.cumulative
                );
            }
        }
        AnalysisReport::Cashflow(months) => {
            let _ = writeln!(out, "{:<10} {:>12} {:>12}", "", "Actual", "Forecast");
            for month in months {
                let actual = month
                    .actual
                    .map(|a| a.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let _ = writeln!(
                    out,
                    "{:<10} {:>12} {:>12}",
                    month.label, actual, month.forecast
                );
            }
        }
        AnalysisReport::Profitability(lines) => {
            let _ = writeln!(
                out,
                "{:<10} {:>12} {:>12} {:>12}",
                "", "Actual", "Budget", "Variance"
            );
            for line in lines {
                let _ = writeln!(
                    out,
                    "{:<10} {:>12} {:>12} {:>12}",
                    line.category.as_str(),
                    line.actual,
                    line.budget,
                    line.actual - line.budget
                );
            }
        }
    }

    out
}

pub async fn cmd_analyze(source: TransactionSource, options: AnalyzeOptions) -> Result<()> {
    let today = Utc::now().date_naive();

    let transactions = match source {
        TransactionSource::File(path) => load_transactions(&path)?,
        TransactionSource::Tripletex(token) => {
            let client = TripletexClient::from_env(&token);
            fetch_recent_transactions(&client, today)
                .await
                .context("Failed to fetch transactions from Tripletex")?
        }
    };
    tracing::debug!(count = transactions.len(), kind = %options.kind, "Loaded transactions");

    let engine = AnalysisEngine::new(AnalysisConfig::from_env()?);
    let report = run_report(&engine, &options, &transactions, today)?;
    let data = report.to_json()?;

    let insight = if options.insight {
        let client = InsightClient::from_env();
        Some(insight_or_fallback(client.as_ref(), options.kind, &data, engine.config().locale).await)
    } else {
        None
    };

    if options.json {
        let output = json!({ "data": data, "aiInsight": insight });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!();
    println!(
        "📈 {} analysis over {} transactions",
        options.kind.as_str(),
        transactions.len()
    );
    println!();
    print!("{}", render_report(&report));
    if let Some(text) = insight {
        println!();
        println!("💡 {}", text);
    }

    Ok(())
}
