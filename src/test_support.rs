//! Shared fixtures for unit tests: a local stand-in for the yield and
//! token APIs, and fast client settings.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::sync::RwLock;

use crate::clients::{ClientConfig, RetryPolicy, TokenClient, YieldClient};
use crate::parser::TransactionParser;
use crate::persistence::PoolStore;
use crate::service::IngestionService;

#[derive(Debug, Default)]
struct MockState {
    listing: RwLock<Vec<Value>>,
    tokens: RwLock<Vec<Value>>,
    failing_hits: AtomicUsize,
    gone_hits: AtomicUsize,
    price_failing: AtomicBool,
}

/// Local HTTP server answering the DefiLlama and Jupiter routes.
#[derive(Debug)]
pub struct MockApis {
    /// `http://127.0.0.1:<port>`
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockApis {
    /// Binds an ephemeral port and serves `listing` and `tokens`.
    pub async fn start(listing: Vec<Value>, tokens: Vec<Value>) -> Self {
        let state = Arc::new(MockState {
            listing: RwLock::new(listing),
            tokens: RwLock::new(tokens),
            failing_hits: AtomicUsize::new(0),
            gone_hits: AtomicUsize::new(0),
            price_failing: AtomicBool::new(false),
        });
        let app = Router::new()
            .route("/pools", get(pools))
            .route("/tokens/v2/search", get(search))
            .route("/price/v3", get(prices))
            .route("/failing", get(failing))
            .route("/gone", get(gone))
            .with_state(Arc::clone(&state));

        let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind mock listener");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("mock listener address");
        };
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Replaces the yield listing served from `/pools`.
    pub async fn set_listing(&self, listing: Vec<Value>) {
        *self.state.listing.write().await = listing;
    }

    /// Makes `/price/v3` answer `503` from now on.
    pub fn fail_prices(&self) {
        self.state.price_failing.store(true, Ordering::SeqCst);
    }

    /// Requests received on `/failing`.
    pub fn failing_hits(&self) -> usize {
        self.state.failing_hits.load(Ordering::SeqCst)
    }

    /// Requests received on `/gone`.
    pub fn gone_hits(&self) -> usize {
        self.state.gone_hits.load(Ordering::SeqCst)
    }
}

async fn pools(State(state): State<Arc<MockState>>) -> Json<Value> {
    let data = state.listing.read().await.clone();
    Json(json!({ "status": "success", "data": data }))
}

async fn search(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let query = params.get("query").cloned().unwrap_or_default();
    let tokens = state.tokens.read().await;
    let found: Vec<Value> = tokens
        .iter()
        .filter(|t| t["id"].as_str() == Some(query.as_str()))
        .cloned()
        .collect();
    Json(Value::Array(found))
}

async fn prices(State(state): State<Arc<MockState>>) -> Result<Json<Value>, StatusCode> {
    if state.price_failing.load(Ordering::SeqCst) {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    Ok(Json(json!({})))
}

async fn failing(State(state): State<Arc<MockState>>) -> StatusCode {
    state.failing_hits.fetch_add(1, Ordering::SeqCst);
    StatusCode::SERVICE_UNAVAILABLE
}

async fn gone(State(state): State<Arc<MockState>>) -> StatusCode {
    state.gone_hits.fetch_add(1, Ordering::SeqCst);
    StatusCode::NOT_FOUND
}

/// Two attempts, millisecond backoff, no rate spacing.
pub fn fast_client_config(base_url: &str) -> ClientConfig {
    ClientConfig {
        base_url: base_url.to_string(),
        timeout: Duration::from_secs(2),
        retry: RetryPolicy::new(2, Duration::from_millis(1)),
        rate_limit_delay: Duration::ZERO,
    }
}

/// Base URL nothing listens on.
pub fn unreachable_base_url() -> String {
    "http://127.0.0.1:1".to_string()
}

/// Ingestion service over the given API base URLs and store.
pub fn build_service(
    yield_base: &str,
    token_base: &str,
    store: Arc<PoolStore>,
) -> IngestionService {
    let Ok(yields) = YieldClient::new(fast_client_config(yield_base)) else {
        panic!("yield client");
    };
    let Ok(tokens) = TokenClient::new(fast_client_config(token_base)) else {
        panic!("token client");
    };
    IngestionService::new(
        TransactionParser::new(),
        store,
        Arc::new(yields),
        Arc::new(tokens),
    )
}
