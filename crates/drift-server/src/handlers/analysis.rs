//! Analysis handlers
//!
//! Each analysis pulls the last 90 days of vouchers from Tripletex, runs the
//! engine, asks for a plain-language insight and stores the result.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use drift_core::analysis::SystemRandom;
use drift_core::models::{AnalysisKind, StoredAnalysis};
use drift_core::tripletex::{fetch_recent_transactions, TripletexClient};
use drift_core::insight_or_fallback;

use crate::auth::AuthUser;
use crate::{AppError, AppState, MAX_PAGE_LIMIT};

const DEFAULT_HISTORY_LIMIT: i64 = 20;

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub data: serde_json::Value,
    #[serde(rename = "aiInsight")]
    pub ai_insight: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub kind: Option<String>,
    pub limit: Option<i64>,
}

pub async fn liquidity_analysis(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<AnalysisResponse>, AppError> {
    run_analysis(&state, auth, AnalysisKind::Liquidity).await
}

pub async fn cashflow_analysis(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<AnalysisResponse>, AppError> {
    run_analysis(&state, auth, AnalysisKind::Cashflow).await
}

pub async fn profitability_analysis(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<AnalysisResponse>, AppError> {
    run_analysis(&state, auth, AnalysisKind::Profitability).await
}

async fn run_analysis(
    state: &AppState,
    auth: AuthUser,
    kind: AnalysisKind,
) -> Result<Json<AnalysisResponse>, AppError> {
    let failed = |e: drift_core::Error| AppError::internal("Analysis failed").with_source(e);

    let token = state
        .db
        .get_tripletex_token(auth.user_id)
        .map_err(failed)?
        .ok_or_else(|| AppError::bad_request("Tripletex not configured"))?;

    let today = Utc::now().date_naive();
    let client = TripletexClient::new(&state.config.tripletex_base_url, &token);
    let transactions = fetch_recent_transactions(&client, today)
        .await
        .map_err(failed)?;

    let data = {
        let mut rng = SystemRandom::new();
        state
            .engine
            .run(kind, &transactions, today, &mut rng)
            .and_then(|report| report.to_json())
            .map_err(failed)?
    };

    let locale = state.engine.config().locale;
    let ai_insight = insight_or_fallback(state.insight.as_ref(), kind, &data, locale).await;

    state
        .db
        .insert_analysis(auth.user_id, kind, &data, Some(&ai_insight))
        .map_err(failed)?;

    info!(
        user_id = auth.user_id,
        kind = %kind,
        transactions = transactions.len(),
        "Analysis complete"
    );

    Ok(Json(AnalysisResponse { data, ai_insight }))
}

/// Stored analyses for the caller, newest first
pub async fn analysis_history(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<StoredAnalysis>>, AppError> {
    let kind = match query.kind.as_deref().filter(|k| !k.is_empty()) {
        Some(raw) => Some(
            raw.parse::<AnalysisKind>()
                .map_err(|_| AppError::bad_request("Invalid analysis kind"))?,
        ),
        None => None,
    };
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_PAGE_LIMIT);

    let analyses = state.db.list_analyses(auth.user_id, kind, limit)?;
    Ok(Json(analyses))
}
