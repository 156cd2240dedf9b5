//! Linking a Tripletex account

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use drift_core::tripletex::{AccountingSource, TripletexClient};

use crate::auth::AuthUser;
use crate::{AppError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupRequest {
    #[serde(default)]
    pub session_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Verify a Tripletex session token and store it for the caller
pub async fn setup_tripletex(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<SetupRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    let Some(token) = req.session_token.filter(|t| !t.trim().is_empty()) else {
        return Err(AppError::bad_request("Invalid Tripletex token"));
    };

    let client = TripletexClient::new(&state.config.tripletex_base_url, &token);
    if let Err(e) = client.verify_credentials().await {
        warn!(user_id = auth.user_id, error = %e, "Tripletex token rejected");
        return Err(AppError::bad_request("Invalid Tripletex token"));
    }

    state
        .db
        .set_tripletex_token(auth.user_id, &token)
        .map_err(|e| AppError::bad_request("Invalid Tripletex token").with_source(e))?;

    info!(user_id = auth.user_id, "Tripletex account linked");
    Ok(Json(SuccessResponse { success: true }))
}
