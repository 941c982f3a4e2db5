//! Webhook API endpoints, used by the payment gateway to report completed checkouts.
use axum::Router;

use crate::state::AppState;

mod stripe;

/// Creates a router for all webhook interfaces.
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/stripe", stripe::create_router())
}
