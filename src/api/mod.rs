//! REST API layer: route handlers, DTOs, and router composition.
//!
//! The webhook is mounted at `/webhook/helius`, the read endpoints under
//! `/api`, and the health check at `/health`.

pub mod dto;
pub mod handlers;
pub mod openapi;

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use tower_http::timeout::TimeoutLayer;

use crate::app_state::AppState;

/// Builds the complete API router.
///
/// Only the `/api` routes carry `query_timeout`: a webhook payload is
/// never cut off mid-batch.
pub fn build_router(query_timeout: Duration) -> Router<AppState> {
    let timeout = TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, query_timeout);

    let router = Router::new()
        .merge(handlers::webhook::routes())
        .nest("/api", handlers::routes().layer(timeout))
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
    };

    router
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::parser::known_accounts::NATIVE_MINT;
    use crate::persistence::{MemoryPoolStore, PoolStore};
    use crate::service::QueryService;
    use crate::test_support::{build_service, unreachable_base_url};

    fn app(token: Option<&str>) -> Router {
        let store = Arc::new(PoolStore::Memory(MemoryPoolStore::new()));
        let unreachable = unreachable_base_url();
        let state = AppState {
            ingestion: Arc::new(build_service(&unreachable, &unreachable, Arc::clone(&store))),
            queries: Arc::new(QueryService::new(Arc::clone(&store), 50, 25)),
            webhook_auth_token: token.map(Arc::from),
            store_backend: store.backend(),
        };
        build_router(Duration::from_secs(5)).with_state(state)
    }

    fn webhook(body: &str, auth: Option<&str>) -> Request<Body> {
        let mut builder =
            Request::post("/webhook/helius").header(header::CONTENT_TYPE, "application/json");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        let Ok(request) = builder.body(Body::from(body.to_string())) else {
            panic!("request builds");
        };
        request
    }

    fn get(uri: &str) -> Request<Body> {
        let Ok(request) = Request::get(uri).body(Body::empty()) else {
            panic!("request builds");
        };
        request
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let Ok(response) = app.clone().oneshot(request).await;
        let status = response.status();
        let Ok(bytes) = to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body readable");
        };
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn create_pool_body() -> String {
        json!([{
            "type": "CREATE_POOL",
            "source": "RAYDIUM",
            "signature": "sig1",
            "timestamp": 1_700_000_000,
            "feePayer": "payer",
            "tokenTransfers": [
                { "mint": "MintAlpha", "tokenAmount": 10.0 },
                { "mint": NATIVE_MINT },
                { "mint": "MintBeta" }
            ],
            "accounts": ["payer", "PoolAcct"]
        }])
        .to_string()
    }

    #[tokio::test]
    async fn webhook_then_query_round_trip() {
        let app = app(None);

        let (status, body) = send(&app, webhook(&create_pool_body(), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["report"]["created"], 1);

        let (status, body) = send(&app, get("/api/pools")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["pools"][0]["poolAddress"], "PoolAcct");
        assert!(body["pools"][0]["apy"].is_null());

        let (status, body) = send(&app, get("/api/pools/PoolAcct")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["events"][0]["eventType"], "created");

        let (status, body) = send(&app, get("/api/pools/apy")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0);
    }

    #[tokio::test]
    async fn webhook_rejects_scalar_body() {
        let (status, body) = send(&app(None), webhook("42", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], 1001);
    }

    #[tokio::test]
    async fn webhook_enforces_configured_token() {
        let app = app(Some("secret"));
        let (status, _) = send(&app, webhook("[]", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, body) = send(&app, webhook("[]", Some("secret"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["report"]["received"], 0);
    }

    #[tokio::test]
    async fn unknown_pool_is_not_found() {
        let (status, body) = send(&app(None), get("/api/pools/missing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], 2001);
    }

    #[tokio::test]
    async fn refresh_surfaces_upstream_failure() {
        let app = app(None);
        let _ = send(&app, webhook(&create_pool_body(), None)).await;
        let Ok(request) = Request::post("/api/pools/PoolAcct/refresh").body(Body::empty()) else {
            panic!("request builds");
        };
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], 5001);
    }

    #[tokio::test]
    async fn health_reports_modules() {
        let (status, body) = send(&app(None), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["modules"]["persistence"], "memory");
    }
}
