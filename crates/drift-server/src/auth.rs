//! Bearer-token authentication
//!
//! Tokens are HS256 JWTs carrying the user id in a `userId` claim and expire
//! after seven days.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::AppState;

/// Token lifetime
pub const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub iat: i64,
    pub exp: i64,
}

/// The authenticated caller, inserted into request extensions by [`auth_middleware`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
}

/// Sign a session token for `user_id`
pub fn issue_token(user_id: i64, secret: &str) -> jsonwebtoken::errors::Result<String> {
    let now = Utc::now();
    let claims = Claims {
        user_id,
        iat: now.timestamp(),
        exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Check signature and expiry, returning the claims
pub fn verify_token(token: &str, secret: &str) -> jsonwebtoken::errors::Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Second whitespace-separated word of the Authorization header
fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split_whitespace().nth(1))
        .filter(|t| !t.is_empty())
}

fn auth_error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Reject requests without a valid session token
///
/// Missing token is a 401, a bad or expired one a 403.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(&request) else {
        debug!(path = %request.uri().path(), "Request without access token");
        return auth_error(StatusCode::UNAUTHORIZED, "Access token required");
    };

    match verify_token(token, &state.config.jwt_secret) {
        Ok(claims) => {
            request.extensions_mut().insert(AuthUser {
                user_id: claims.user_id,
            });
            next.run(request).await
        }
        Err(e) => {
            warn!(error = %e, path = %request.uri().path(), "Rejected access token");
            auth_error(StatusCode::FORBIDDEN, "Invalid token")
        }
    }
}
