//! Test utilities for drift-core
//!
//! Mock Tripletex and OpenAI-compatible servers bound to an ephemeral local
//! port, used by integration tests here and in drift-server.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Json, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use base64::Engine;
use serde_json::{json, Value};
use tokio::sync::oneshot;

async fn spawn(app: Router) -> (SocketAddr, oneshot::Sender<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .unwrap();
    });

    (addr, shutdown_tx)
}

// ---------------------------------------------------------------------------
// Tripletex
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct TripletexState {
    expected_auth: String,
    vouchers: Arc<Vec<Value>>,
    voucher_queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

/// Mock Tripletex API accepting a single session token
///
/// Serves `/v2/ledger/account`, `/v2/ledger/voucher`, `/v2/customer` and
/// `/v2/supplier`. Any other credential gets a 401.
pub struct MockTripletexServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    voucher_queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl MockTripletexServer {
    /// Start the mock server; `amounts` become the voucher list
    pub async fn start(valid_token: &str, amounts: &[f64]) -> Self {
        let credentials = base64::engine::general_purpose::STANDARD
            .encode(format!("0:{}", valid_token));
        let vouchers = amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| {
                json!({
                    "id": i + 1,
                    "number": i + 1,
                    "description": format!("Bilag {}", i + 1),
                    "amount": amount,
                })
            })
            .collect();

        let voucher_queries = Arc::new(Mutex::new(Vec::new()));
        let state = TripletexState {
            expected_auth: format!("Basic {}", credentials),
            vouchers: Arc::new(vouchers),
            voucher_queries: voucher_queries.clone(),
        };

        let app = Router::new()
            .route("/v2/ledger/account", get(handle_accounts))
            .route("/v2/ledger/voucher", get(handle_vouchers))
            .route("/v2/customer", get(handle_customers))
            .route("/v2/supplier", get(handle_suppliers))
            .with_state(state);

        let (addr, shutdown_tx) = spawn(app).await;

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            voucher_queries,
        }
    }

    /// API root to hand to `TripletexClient::new`
    pub fn url(&self) -> String {
        format!("http://{}/v2", self.addr)
    }

    /// Query strings received on the voucher endpoint so far
    pub fn voucher_queries(&self) -> Vec<HashMap<String, String>> {
        self.voucher_queries.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockTripletexServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn check_auth(state: &TripletexState, headers: &HeaderMap) -> Result<(), StatusCode> {
    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if provided == state.expected_auth {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

async fn handle_accounts(
    State(state): State<TripletexState>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    check_auth(&state, &headers)?;
    Ok(Json(json!({
        "fullResultSize": 3,
        "values": [
            {"id": 1, "number": 1920, "name": "Bankinnskudd"},
            {"id": 2, "number": 3000, "name": "Salgsinntekt"},
            {"id": 3, "number": 5000, "name": "Lønn til ansatte"},
        ]
    })))
}

async fn handle_vouchers(
    State(state): State<TripletexState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    check_auth(&state, &headers)?;
    state.voucher_queries.lock().unwrap().push(query);
    Ok(Json(json!({
        "fullResultSize": state.vouchers.len(),
        "values": state.vouchers.as_slice(),
    })))
}

async fn handle_customers(
    State(state): State<TripletexState>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    check_auth(&state, &headers)?;
    Ok(Json(json!({
        "values": [{"id": 10, "name": "Nordlys Kafé AS", "email": "post@nordlys.no"}]
    })))
}

async fn handle_suppliers(
    State(state): State<TripletexState>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    check_auth(&state, &headers)?;
    Ok(Json(json!({
        "values": [{"id": 20, "name": "Kaffebrenneriet Engros"}]
    })))
}

// ---------------------------------------------------------------------------
// OpenAI-compatible chat completions
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct OpenAIState {
    reply: Option<String>,
    requests: Arc<Mutex<Vec<Value>>>,
}

/// Mock chat completions server answering every request with a fixed reply
pub struct MockOpenAIServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl MockOpenAIServer {
    /// Start a server that answers with `reply`
    pub async fn start(reply: &str) -> Self {
        Self::start_with(Some(reply.to_string())).await
    }

    /// Start a server that answers every completion with a 500
    pub async fn failing() -> Self {
        Self::start_with(None).await
    }

    async fn start_with(reply: Option<String>) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = OpenAIState {
            reply,
            requests: requests.clone(),
        };

        let app = Router::new()
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_chat))
            .with_state(state);

        let (addr, shutdown_tx) = spawn(app).await;

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            requests,
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Request bodies received so far
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockOpenAIServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_models() -> Json<Value> {
    Json(json!({"object": "list", "data": [{"id": "gpt-4", "object": "model"}]}))
}

async fn handle_chat(
    State(state): State<OpenAIState>,
    Json(request): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let model = request["model"].as_str().unwrap_or("gpt-4").to_string();
    state.requests.lock().unwrap().push(request);

    let reply = state.reply.ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "model": model,
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": reply},
            "finish_reason": "stop"
        }]
    })))
}
