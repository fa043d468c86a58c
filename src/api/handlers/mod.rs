//! REST endpoint handlers organized by resource.

pub mod pool;
pub mod system;
pub mod webhook;

use axum::Router;

use crate::app_state::AppState;

/// Composes the read routes mounted under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new().merge(pool::routes())
}
