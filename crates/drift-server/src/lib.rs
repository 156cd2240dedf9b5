//! Drift Web Server
//!
//! Axum-based REST API serving the financial analyses to the dashboard.
//!
//! Security features:
//! - Bearer JWT authentication on everything except health, register and login
//! - CORS restricted to the configured frontend origin(s)
//! - Per-client rate limiting
//! - Request body size limit
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use drift_core::ai::{InsightBackend, InsightClient};
use drift_core::analysis::{AnalysisConfig, AnalysisEngine};
use drift_core::db::Database;
use drift_core::tripletex;

pub mod auth;
mod handlers;
pub mod rate_limit;

pub use auth::{issue_token, verify_token, AuthUser, Claims};
pub use rate_limit::{RateLimitConfig, RateLimiter};

/// Maximum JSON request body (10 MB)
pub const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Maximum history page size
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Default dashboard origin
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";

/// Environment variables read by [`ServerConfig::from_env`]
pub const JWT_SECRET_ENV: &str = "DRIFT_JWT_SECRET";
pub const FRONTEND_URL_ENV: &str = "DRIFT_FRONTEND_URL";

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// HMAC secret for session tokens
    pub jwt_secret: String,
    /// Allowed CORS origins (credentials are allowed for these)
    pub allowed_origins: Vec<String>,
    /// Tripletex API root
    pub tripletex_base_url: String,
    /// None disables rate limiting
    pub rate_limit: Option<RateLimitConfig>,
    /// Engine tunables
    pub analysis: AnalysisConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            allowed_origins: vec![DEFAULT_FRONTEND_URL.to_string()],
            tripletex_base_url: tripletex::DEFAULT_BASE_URL.to_string(),
            rate_limit: Some(RateLimitConfig::default()),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Build from `DRIFT_JWT_SECRET`, `DRIFT_FRONTEND_URL` (comma-separated),
    /// `TRIPLETEX_BASE_URL` and the engine variables
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = std::env::var(JWT_SECRET_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("{} must be set to sign session tokens", JWT_SECRET_ENV))?;

        let allowed_origins = parse_origins(
            &std::env::var(FRONTEND_URL_ENV).unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_string()),
        );

        Ok(Self {
            jwt_secret,
            allowed_origins,
            tripletex_base_url: tripletex::base_url_from_env(),
            rate_limit: Some(RateLimitConfig::default()),
            analysis: AnalysisConfig::from_env()?,
        })
    }
}

/// Split a comma-separated origin list
pub fn parse_origins(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
    pub insight: Option<InsightClient>,
    pub engine: AnalysisEngine,
    pub rate_limiter: Option<RateLimiter>,
}

/// Create the application router
pub fn create_router(db: Database, static_dir: Option<&str>, config: ServerConfig) -> Router {
    let insight = InsightClient::from_env();
    if let Some(ref client) = insight {
        info!(
            "Insight backend configured: {} (model: {})",
            client.host(),
            client.model()
        );
    } else {
        info!("ℹ️  Insight backend not configured (set OPENAI_API_KEY to enable), using canned texts");
    }
    create_router_with_insight(db, static_dir, config, insight)
}

/// Create the application router with an explicit insight client (for testing)
pub fn create_router_with_insight(
    db: Database,
    static_dir: Option<&str>,
    config: ServerConfig,
    insight: Option<InsightClient>,
) -> Router {
    let state = Arc::new(AppState {
        db,
        engine: AnalysisEngine::new(config.analysis.clone()),
        rate_limiter: config.rate_limit.map(RateLimiter::new),
        config: config.clone(),
        insight,
    });

    let public_routes = Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login));

    let protected_routes = Router::new()
        .route("/auth/me", get(handlers::get_me))
        .route("/tripletex/setup", post(handlers::setup_tripletex))
        .route("/analysis/liquidity", get(handlers::liquidity_analysis))
        .route("/analysis/cashflow", get(handlers::cashflow_analysis))
        .route("/analysis/profitability", get(handlers::profitability_analysis))
        .route("/analysis/history", get(handlers::analysis_history))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    let cors = build_cors(&config.allowed_origins);

    // CSP: restrict scripts to same-origin, allow inline styles, allow blob: for images
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' blob: data:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'"
    );

    let mut app = Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", public_routes.merge(protected_routes));

    // Serve static files if directory provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(middleware::from_fn_with_state(
        state.clone(),
        rate_limit::rate_limit_middleware,
    ))
    .with_state(state)
    .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
    .layer(TraceLayer::new_for_http())
    .layer(cors)
    // Security headers
    .layer(SetResponseHeaderLayer::overriding(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    ))
    .layer(SetResponseHeaderLayer::overriding(
        header::X_FRAME_OPTIONS,
        HeaderValue::from_static("DENY"),
    ))
    .layer(SetResponseHeaderLayer::overriding(
        header::X_XSS_PROTECTION,
        HeaderValue::from_static("1; mode=block"),
    ))
    .layer(SetResponseHeaderLayer::overriding(
        header::CONTENT_SECURITY_POLICY,
        csp_value,
    ))
}

fn build_cors(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    if origins.is_empty() {
        // Same-origin only
        cors
    } else {
        cors.allow_origin(origins).allow_credentials(true)
    }
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if config.jwt_secret.is_empty() {
        anyhow::bail!("Refusing to start without a JWT secret");
    }
    if config.rate_limit.is_none() {
        warn!("⚠️  Rate limiting disabled");
    }

    check_insight_connection().await;

    let app = create_router(db, static_dir, config)
        .into_make_service_with_connect_info::<std::net::SocketAddr>();
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log insight backend connection status
async fn check_insight_connection() {
    match InsightClient::from_env() {
        Some(client) => {
            if client.health_check().await {
                info!(
                    "✅ Insight backend connected: {} (model: {})",
                    client.host(),
                    client.model()
                );
            } else {
                warn!(
                    "⚠️  Insight backend configured but not responding: {} (model: {})",
                    client.host(),
                    client.model()
                );
            }
        }
        None => {
            info!("ℹ️  Insight backend not configured, analyses use canned texts");
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn unauthorized(msg: &str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }

    /// Attach the underlying cause, logged but never sent to the client
    pub fn with_source(mut self, err: impl Into<anyhow::Error>) -> Self {
        self.internal = Some(err.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, status = self.status.as_u16(), "{}", self.message);
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "Internal server error".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
