//! Defines the state shared across the Axum application.
use std::sync::Arc;

use crate::{services::checkout::PaymentGateway, store::OrderStore};

#[derive(Clone)]
/// The state struct shared across routers.
pub struct AppState {
    /// Where carts are read from and orders written to.
    pub store: Arc<dyn OrderStore>,
    /// The card payment gateway.
    pub payments: Arc<dyn PaymentGateway>,
}
