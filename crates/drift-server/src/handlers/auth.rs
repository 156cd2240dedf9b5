//! Account handlers: register, login, current user

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use drift_core::auth::{hash_password, verify_password};
use drift_core::models::{NewUser, User};
use drift_core::Error as CoreError;

use crate::auth::{issue_token, AuthUser};
use crate::{AppError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Public part of a user record
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub email: String,
    pub company_name: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            company_name: user.company_name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserSummary,
}

/// Response for the /api/auth/me endpoint
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: i64,
    pub email: String,
    pub company_name: Option<String>,
    pub tripletex_configured: bool,
    pub created_at: DateTime<Utc>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Create an account and return a session token
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let (Some(email), Some(password)) = (non_empty(req.email), non_empty(req.password)) else {
        return Err(AppError::bad_request("Email and password required"));
    };

    let password_hash =
        hash_password(&password).map_err(|e| AppError::internal("Registration failed").with_source(e))?;

    let user = match state.db.create_user(&NewUser {
        email,
        password_hash,
        company_name: non_empty(req.company_name),
    }) {
        Ok(user) => user,
        Err(CoreError::DuplicateEmail(_)) => {
            return Err(AppError::bad_request("Email already exists"));
        }
        Err(e) => return Err(AppError::internal("Registration failed").with_source(e)),
    };

    let token = issue_token(user.id, &state.config.jwt_secret)
        .map_err(|e| AppError::internal("Registration failed").with_source(e))?;

    info!(user_id = user.id, "User registered");
    Ok(Json(AuthResponse {
        token,
        user: UserSummary::from(&user),
    }))
}

/// Exchange email and password for a session token
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let (Some(email), Some(password)) = (req.email, req.password) else {
        return Err(AppError::unauthorized("Invalid credentials"));
    };

    let found = state
        .db
        .get_user_credentials(&email)
        .map_err(|e| AppError::internal("Login failed").with_source(e))?;

    let user = match found {
        Some((user, hash)) if verify_password(&password, &hash) => user,
        _ => return Err(AppError::unauthorized("Invalid credentials")),
    };

    let token = issue_token(user.id, &state.config.jwt_secret)
        .map_err(|e| AppError::internal("Login failed").with_source(e))?;

    info!(user_id = user.id, "User logged in");
    Ok(Json(AuthResponse {
        token,
        user: UserSummary::from(&user),
    }))
}

/// Get the currently authenticated user
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<MeResponse>, AppError> {
    let user = state
        .db
        .get_user(auth.user_id)?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(MeResponse {
        id: user.id,
        email: user.email.clone(),
        company_name: user.company_name.clone(),
        tripletex_configured: user.tripletex_configured(),
        created_at: user.created_at,
    }))
}
