//! API routes within the application. Sub-routers are nested under the
//! configured URI prefix by `create_app`.
use axum::{routing::get, Router};

use crate::state::AppState;

pub mod orders;
pub mod webhook;

/// Build the complete application router, with every route nested under
/// `prefix` (`"/"` for no prefix).
pub fn create_app(state: AppState, prefix: &str) -> Router {
    let api = Router::new()
        .nest("/orders", orders::create_router(&state))
        .nest("/webhook", webhook::create_router())
        .route("/health", get(health));
    let prefix = prefix.trim_matches('/');
    let router = if prefix.is_empty() {
        api
    } else {
        Router::new().nest(&format!("/{prefix}"), api)
    };
    router.with_state(state)
}

async fn health() -> &'static str {
    "Order service is running!"
}
