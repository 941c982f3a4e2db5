use std::sync::Arc;

use storefront_orders::{
    constants::{
        api::{API_URI_PREFIX, BIND_ADDRESS},
        logging::{LOG_JSON, LOG_LEVEL},
    },
    db, routes,
    services::checkout::PaymentGateway,
    state::AppState,
    store::PgStore,
    utils::logging::init_logging,
};

#[cfg(feature = "stripe")]
fn payment_gateway() -> Arc<dyn PaymentGateway> {
    Arc::new(storefront_orders::services::checkout::StripeGateway::from_env())
}

#[cfg(not(feature = "stripe"))]
fn payment_gateway() -> Arc<dyn PaymentGateway> {
    tracing::warn!("Stripe is disabled, card checkout and payment webhooks will be rejected.");
    Arc::new(storefront_orders::services::checkout::DisabledGateway)
}

#[tokio::main]
async fn main() {
    init_logging(&LOG_LEVEL, *LOG_JSON);
    let db_conn = db::connect()
        .await
        .expect("Failed to connect to the order database");
    let state = AppState {
        store: Arc::new(PgStore::new(db_conn)),
        payments: payment_gateway(),
    };
    let app = routes::create_app(state, &API_URI_PREFIX);
    let listener = tokio::net::TcpListener::bind(BIND_ADDRESS.as_str())
        .await
        .expect("Failed to bind listener");
    tracing::info!(address = %*BIND_ADDRESS, prefix = %*API_URI_PREFIX, "Order service listening");
    axum::serve(listener, app)
        .await
        .expect("Failed to init Axum service");
}
