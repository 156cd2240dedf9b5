//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;

use chrono::NaiveDate;
use clap::Parser;
use drift_core::analysis::{AnalysisEngine, AnalysisReport};
use drift_core::auth::hash_password;
use drift_core::db::Database;
use drift_core::models::{AnalysisKind, NewUser, Transaction};
use serde_json::json;

use crate::cli::{Cli, Commands};
use crate::commands::{self, truncate, AnalyzeOptions};

fn setup_test_db() -> Database {
    Database::in_memory().unwrap()
}

fn create_user(db: &Database, email: &str) -> i64 {
    db.create_user(&NewUser {
        email: email.to_string(),
        password_hash: hash_password("hunter22").unwrap(),
        company_name: Some("Fjord AS".to_string()),
    })
    .unwrap()
    .id
}

fn write_json(value: &serde_json::Value) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", value).unwrap();
    file
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_serve_defaults() {
    let cli = Cli::try_parse_from(["drift", "serve"]).unwrap();
    assert_eq!(cli.db.to_str(), Some("drift.db"));
    assert!(!cli.no_encrypt);
    match cli.command {
        Commands::Serve {
            port,
            host,
            static_dir,
            no_rate_limit,
        } => {
            assert_eq!(port, 3001);
            assert_eq!(host, "127.0.0.1");
            assert!(static_dir.is_none());
            assert!(!no_rate_limit);
        }
        _ => panic!("expected serve"),
    }
}

#[test]
fn test_parse_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["drift", "status", "--db", "/tmp/x.db", "--no-encrypt", "-v"])
        .unwrap();
    assert_eq!(cli.db.to_str(), Some("/tmp/x.db"));
    assert!(cli.no_encrypt);
    assert!(cli.verbose);
}

#[test]
fn test_parse_analyze_with_file() {
    let cli = Cli::try_parse_from([
        "drift", "analyze", "--kind", "cashflow", "--file", "tx.json", "--periods", "3", "--seed",
        "7", "--start", "2026-01", "--json",
    ])
    .unwrap();
    match cli.command {
        Commands::Analyze {
            kind,
            file,
            periods,
            seed,
            start,
            json,
            insight,
            ..
        } => {
            assert_eq!(kind, "cashflow");
            assert_eq!(file.unwrap().to_str(), Some("tx.json"));
            assert_eq!(periods, Some(3));
            assert_eq!(seed, Some(7));
            assert_eq!(start.as_deref(), Some("2026-01"));
            assert!(json);
            assert!(!insight);
        }
        _ => panic!("expected analyze"),
    }
}

#[test]
fn test_parse_analyze_rejects_file_and_token() {
    let result = Cli::try_parse_from([
        "drift",
        "analyze",
        "--kind",
        "liquidity",
        "--file",
        "tx.json",
        "--tripletex-token",
        "abc",
    ]);
    assert!(result.is_err());
}

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a longer sentence", 10), "a longe...");
}

#[test]
fn test_truncate_multibyte() {
    // Must not split inside a character
    let text = "Økt omsetning gir bedre likviditet";
    let out = truncate(text, 8);
    assert_eq!(out, "Økt o...");
}

#[test]
fn test_parse_month() {
    assert_eq!(
        commands::parse_month("2026-03").unwrap(),
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    );
    assert!(commands::parse_month("2026-13").is_err());
    assert!(commands::parse_month("march").is_err());
}

// ========== Transaction Loading Tests ==========

#[test]
fn test_parse_transactions_numbers() {
    let txs = commands::parse_transactions(json!([1000, -250.5])).unwrap();
    assert_eq!(txs, vec![Transaction::new(1000.0), Transaction::new(-250.5)]);
}

#[test]
fn test_parse_transactions_objects_ignore_extra_fields() {
    let txs = commands::parse_transactions(json!([
        { "amount": 500, "description": "Faktura 1001" },
        { "amount": -120, "date": "2026-10-01" }
    ]))
    .unwrap();
    assert_eq!(txs, vec![Transaction::new(500.0), Transaction::new(-120.0)]);
}

#[test]
fn test_parse_transactions_tripletex_page() {
    let txs = commands::parse_transactions(json!({
        "fullResultSize": 2,
        "values": [{ "amount": 10 }, { "amount": -5 }]
    }))
    .unwrap();
    assert_eq!(txs.len(), 2);
}

#[test]
fn test_parse_transactions_rejects_bad_rows() {
    assert!(commands::parse_transactions(json!(["ten"])).is_err());
    assert!(commands::parse_transactions(json!({ "rows": [] })).is_err());
    assert!(commands::parse_transactions(json!(42)).is_err());
}

#[test]
fn test_load_transactions_from_file() {
    let file = write_json(&json!([1000, -400]));
    let txs = commands::load_transactions(file.path()).unwrap();
    assert_eq!(txs.len(), 2);
}

#[test]
fn test_load_transactions_invalid_json() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "not json").unwrap();
    assert!(commands::load_transactions(file.path()).is_err());
}

// ========== Analysis Tests ==========

#[test]
fn test_run_report_default_periods() {
    let engine = AnalysisEngine::default();
    let txs = vec![Transaction::new(1000.0), Transaction::new(-400.0)];

    let report = commands::run_report(
        &engine,
        &AnalyzeOptions::new(AnalysisKind::Liquidity),
        &txs,
        today(),
    )
    .unwrap();
    assert_eq!(report.kind(), AnalysisKind::Liquidity);
    assert_eq!(report.len(), 4);
}

#[test]
fn test_run_report_seed_is_reproducible() {
    let engine = AnalysisEngine::default();
    let txs = vec![Transaction::new(3000.0), Transaction::new(-1000.0)];
    let mut options = AnalyzeOptions::new(AnalysisKind::Cashflow);
    options.seed = Some(42);
    options.periods = Some(4);

    let first = commands::run_report(&engine, &options, &txs, today()).unwrap();
    let second = commands::run_report(&engine, &options, &txs, today()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
}

#[test]
fn test_run_report_start_month() {
    let engine = AnalysisEngine::default();
    let txs = vec![Transaction::new(3000.0)];
    let mut options = AnalyzeOptions::new(AnalysisKind::Cashflow);
    options.seed = Some(1);
    options.start = Some(commands::parse_month("2026-01").unwrap());

    let AnalysisReport::Cashflow(months) =
        commands::run_report(&engine, &options, &txs, today()).unwrap()
    else {
        panic!("expected cash flow report");
    };
    assert_eq!(months.len(), 6);
    assert!(months[0].label.to_lowercase().starts_with("jan"));
}

#[test]
fn test_run_report_zero_periods() {
    let engine = AnalysisEngine::default();
    let mut options = AnalyzeOptions::new(AnalysisKind::Liquidity);
    options.periods = Some(0);
    let result = commands::run_report(&engine, &options, &[Transaction::new(1.0)], today());
    assert!(result.is_err());
}

#[test]
fn test_run_report_empty_liquidity_fails() {
    let engine = AnalysisEngine::default();
    let result = commands::run_report(
        &engine,
        &AnalyzeOptions::new(AnalysisKind::Liquidity),
        &[],
        today(),
    );
    assert!(result.is_err());
}

#[test]
fn test_render_report_tables() {
    let engine = AnalysisEngine::default();
    let txs = vec![Transaction::new(1000.0), Transaction::new(-400.0)];

    let mut options = AnalyzeOptions::new(AnalysisKind::Liquidity);
    options.seed = Some(3);
    let liquidity = commands::run_report(&engine, &options, &txs, today()).unwrap();
    let text = commands::render_report(&liquidity);
    assert!(text.contains("Balance"));
    assert!(text.contains("Uke 1"));
    assert_eq!(text.lines().count(), 5);

    let profitability = commands::run_report(
        &engine,
        &AnalyzeOptions::new(AnalysisKind::Profitability),
        &txs,
        today(),
    )
    .unwrap();
    let text = commands::render_report(&profitability);
    assert!(text.contains("Sales"));
    assert!(text.contains("Variance"));
}

#[test]
fn test_render_cashflow_marks_missing_actuals() {
    let engine = AnalysisEngine::default();
    let mut options = AnalyzeOptions::new(AnalysisKind::Cashflow);
    options.seed = Some(9);
    let report = commands::run_report(&engine, &options, &[Transaction::new(900.0)], today())
        .unwrap();
    let text = commands::render_report(&report);
    // months 4..6 have no actual figure
    assert_eq!(text.lines().filter(|l| l.contains(" - ")).count(), 3);
}

#[tokio::test]
async fn test_cmd_analyze_from_file() {
    let file = write_json(&json!([1200, -300, 800, -150]));
    let mut options = AnalyzeOptions::new(AnalysisKind::Profitability);
    options.json = true;
    let result = commands::cmd_analyze(
        commands::TransactionSource::File(file.path().to_path_buf()),
        options,
    )
    .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cmd_analyze_missing_file() {
    let result = commands::cmd_analyze(
        commands::TransactionSource::File("/nonexistent/tx.json".into()),
        AnalyzeOptions::new(AnalysisKind::Cashflow),
    )
    .await;
    assert!(result.is_err());
}

// ========== Database Command Tests ==========

#[test]
fn test_cmd_init_unencrypted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drift.db");
    commands::cmd_init(&path, true).unwrap();
    assert!(path.exists());
}

#[test]
fn test_cmd_status_missing_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.db");
    assert!(commands::cmd_status(&path, true).is_ok());
    assert!(!path.exists());
}

#[test]
fn test_cmd_status_with_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drift.db");
    commands::cmd_init(&path, true).unwrap();
    assert!(commands::cmd_status(&path, true).is_ok());
}

#[test]
fn test_cmd_history() {
    let db = setup_test_db();
    let user_id = create_user(&db, "ola@fjord.no");
    db.insert_analysis(
        user_id,
        AnalysisKind::Liquidity,
        &json!([{ "week": "Uke 1" }]),
        Some("Likviditeten ser stabil ut."),
    )
    .unwrap();
    db.insert_analysis(user_id, AnalysisKind::Cashflow, &json!([]), None)
        .unwrap();

    assert!(commands::cmd_history(&db, "ola@fjord.no", None, 10).is_ok());
    assert!(commands::cmd_history(&db, "OLA@fjord.no", Some("cashflow"), 10).is_ok());
}

#[test]
fn test_cmd_history_empty() {
    let db = setup_test_db();
    create_user(&db, "kari@fjord.no");
    assert!(commands::cmd_history(&db, "kari@fjord.no", None, 10).is_ok());
}

#[test]
fn test_cmd_history_unknown_user() {
    let db = setup_test_db();
    assert!(commands::cmd_history(&db, "nobody@fjord.no", None, 10).is_err());
}

#[test]
fn test_cmd_history_invalid_kind() {
    let db = setup_test_db();
    create_user(&db, "per@fjord.no");
    assert!(commands::cmd_history(&db, "per@fjord.no", Some("budget"), 10).is_err());
}
