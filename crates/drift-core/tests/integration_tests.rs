//! Integration tests for drift-core
//!
//! These tests exercise the fetch → analyze → explain → store workflow.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use drift_core::{
    ai::fallback_insight,
    analysis::{AnalysisConfig, AnalysisEngine, AnalysisReport, FixedRandom, ReportLocale, SeededRandom},
    auth::{hash_password, verify_password},
    db::Database,
    insight_or_fallback,
    models::{AnalysisKind, NewUser, Transaction},
    tripletex::{fetch_recent_transactions, AccountingSource},
    Error, InsightClient, MockBackend, Result,
};

/// In-memory ledger standing in for Tripletex
struct FakeLedger {
    amounts: Vec<f64>,
    windows: Mutex<Vec<(NaiveDate, NaiveDate)>>,
}

impl FakeLedger {
    fn new(amounts: &[f64]) -> Self {
        Self {
            amounts: amounts.to_vec(),
            windows: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl AccountingSource for FakeLedger {
    async fn verify_credentials(&self) -> Result<()> {
        Ok(())
    }

    async fn fetch_transactions(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Transaction>> {
        self.windows.lock().unwrap().push((from, to));
        Ok(self.amounts.iter().copied().map(Transaction::from).collect())
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
}

fn register(db: &Database, email: &str) -> i64 {
    let hash = hash_password("hemmelig123").expect("hash");
    db.create_user(&NewUser {
        email: email.to_string(),
        password_hash: hash,
        company_name: Some("Bakeriet AS".to_string()),
    })
    .expect("create user")
    .id
}

// =============================================================================
// Workflow Tests
// =============================================================================

#[tokio::test]
async fn test_full_analysis_workflow() {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    let user_id = register(&db, "eier@bakeriet.no");
    db.set_tripletex_token(user_id, "session").unwrap();

    let ledger = FakeLedger::new(&[1000.0, -400.0, 500.0, -100.0]);
    let transactions = fetch_recent_transactions(&ledger, today()).await.unwrap();
    assert_eq!(transactions.len(), 4);

    // 90-day window ending today
    let windows = ledger.windows.lock().unwrap().clone();
    assert_eq!(
        windows,
        vec![(NaiveDate::from_ymd_opt(2024, 2, 15).unwrap(), today())]
    );

    let engine = AnalysisEngine::default();
    let report = engine
        .run(
            AnalysisKind::Profitability,
            &transactions,
            today(),
            &mut FixedRandom::midpoint(),
        )
        .unwrap();
    let data = report.to_json().unwrap();

    let client = InsightClient::mock();
    let insight = insight_or_fallback(
        Some(&client),
        AnalysisKind::Profitability,
        &data,
        ReportLocale::NbNo,
    )
    .await;

    let id = db
        .insert_analysis(user_id, AnalysisKind::Profitability, &data, Some(&insight))
        .unwrap();

    let stored = db.list_analyses(user_id, None, 10).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, id);
    assert_eq!(stored[0].data[0]["category"], "Sales");
    assert_eq!(stored[0].data[0]["actual"], 1500);
    assert_eq!(stored[0].data[0]["budget"], 1410);
    assert_eq!(stored[0].insight.as_deref(), Some(insight.as_str()));
}

#[tokio::test]
async fn test_all_kinds_store_and_filter() {
    let db = Database::in_memory().unwrap();
    let user_id = register(&db, "regnskap@bakeriet.no");
    let engine = AnalysisEngine::default();
    let transactions: Vec<Transaction> =
        [2000.0, -750.0, 120.0].iter().copied().map(Transaction::from).collect();

    for kind in AnalysisKind::ALL {
        let report = engine
            .run(kind, &transactions, today(), &mut SeededRandom::new(7))
            .unwrap();
        let data = report.to_json().unwrap();
        let insight = fallback_insight(kind, ReportLocale::NbNo);
        db.insert_analysis(user_id, kind, &data, Some(insight)).unwrap();
    }

    assert_eq!(db.list_analyses(user_id, None, 50).unwrap().len(), 3);

    let cashflow = db
        .list_analyses(user_id, Some(AnalysisKind::Cashflow), 50)
        .unwrap();
    assert_eq!(cashflow.len(), 1);
    let rows = cashflow[0].data.as_array().unwrap();
    assert_eq!(rows.len(), 6);
    // Forecast-only months serialize actual as null
    assert!(rows[5]["actual"].is_null());
    assert!(rows[0]["actual"].is_number());
}

#[tokio::test]
async fn test_failing_model_falls_back() {
    let client = InsightClient::Mock(MockBackend::failing());
    let text = insight_or_fallback(
        Some(&client),
        AnalysisKind::Liquidity,
        &serde_json::json!([]),
        ReportLocale::NbNo,
    )
    .await;
    assert_eq!(
        text,
        "Likviditeten ser stabil ut. Hold øye med kontantstrømmen og sørg for at kundene betaler i tide."
    );
}

// =============================================================================
// Engine Tests
// =============================================================================

#[test]
fn test_seeded_runs_are_reproducible() {
    let engine = AnalysisEngine::new(AnalysisConfig::default());
    let transactions: Vec<Transaction> =
        [1200.0, -300.0, 450.0].iter().copied().map(Transaction::from).collect();

    for kind in AnalysisKind::ALL {
        let a = engine
            .run(kind, &transactions, today(), &mut SeededRandom::new(42))
            .unwrap();
        let b = engine
            .run(kind, &transactions, today(), &mut SeededRandom::new(42))
            .unwrap();
        assert_eq!(a, b, "{} should be reproducible", kind);
    }
}

#[test]
fn test_empty_ledger() {
    let engine = AnalysisEngine::default();
    let mut rng = FixedRandom::midpoint();

    let liquidity = engine.run(AnalysisKind::Liquidity, &[], today(), &mut rng);
    assert!(matches!(liquidity, Err(Error::EmptyInput(_))));

    let cashflow = engine
        .run(AnalysisKind::Cashflow, &[], today(), &mut rng)
        .unwrap();
    match cashflow {
        AnalysisReport::Cashflow(rows) => {
            assert_eq!(rows.len(), 6);
            assert!(rows.iter().all(|r| r.forecast == 0));
        }
        other => panic!("unexpected report: {:?}", other),
    }

    let profitability = engine
        .run(AnalysisKind::Profitability, &[], today(), &mut rng)
        .unwrap();
    assert_eq!(profitability.len(), 5);
}

#[test]
fn test_liquidity_midpoint_balance() {
    let engine = AnalysisEngine::default();
    let transactions: Vec<Transaction> =
        [1000.0, -400.0].iter().copied().map(Transaction::from).collect();

    let report = engine
        .run(
            AnalysisKind::Liquidity,
            &transactions,
            today(),
            &mut FixedRandom::midpoint(),
        )
        .unwrap();
    let data = report.to_json().unwrap();

    // avg in 500, avg out 200, net 300 per week on top of 250 000
    assert_eq!(data[0]["label"], "Uke 1");
    assert_eq!(data[0]["net"], 300);
    assert_eq!(data[3]["cumulative"], 251_200);
}

// =============================================================================
// Account and Storage Tests
// =============================================================================

#[test]
fn test_registration_and_login_credentials() {
    let db = Database::in_memory().unwrap();
    register(&db, "Daglig.Leder@Bakeriet.no");

    let (user, hash) = db
        .get_user_credentials("daglig.leder@bakeriet.no")
        .unwrap()
        .expect("user exists");
    assert_eq!(user.email, "daglig.leder@bakeriet.no");
    assert!(verify_password("hemmelig123", &hash));
    assert!(!verify_password("feil", &hash));

    let duplicate = db.create_user(&NewUser {
        email: "daglig.leder@bakeriet.no".into(),
        password_hash: hash,
        company_name: None,
    });
    assert!(matches!(duplicate, Err(Error::DuplicateEmail(_))));
}

#[test]
fn test_encrypted_database_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drift.db");
    let path = path.to_str().unwrap();

    {
        let db = Database::new_with_key(path, Some("riktig passord")).unwrap();
        register(&db, "kryptert@bakeriet.no");
    }

    let reopened = Database::new_with_key(path, Some("riktig passord")).unwrap();
    assert_eq!(reopened.list_users().unwrap().len(), 1);
    // Keyed explicitly, without DRIFT_DB_KEY in the environment
    assert!(reopened.is_encrypted().unwrap());

    // A different passphrase cannot read the file
    assert!(Database::new_with_key(path, Some("feil passord")).is_err());
}
