//! Routes for placing orders from carts and reading them back, interacts with
//! the order and checkout services.
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::models::apporder::{AppOrder, ShippingAddress},
    middleware::auth::{
        administrator_middleware, authenticated_middleware, customer_middleware, CurrentUser,
    },
    services::{
        checkout::{self, CheckoutSession},
        orders,
    },
    state::AppState,
    utils::httperror::HttpError,
};

/// Orders router. Every route requires an identified user; placing orders is
/// limited to customers and listing everyone's orders to administrators.
pub fn create_router(state: &AppState) -> Router<AppState> {
    let customer = Router::new()
        .route("/{cart_id}", post(create_cash_order))
        .route("/checkout/{cart_id}", post(create_checkout_session))
        .layer(from_fn(customer_middleware));
    let administrator = Router::new()
        .route("/all", get(get_all_orders))
        .layer(from_fn(administrator_middleware));
    let authenticated = Router::new().route("/", get(get_user_order));
    customer
        .merge(administrator)
        .merge(authenticated)
        .layer(from_fn_with_state(state.clone(), authenticated_middleware))
}

#[derive(Deserialize)]
struct PlaceOrderRequest {
    shipping_address: ShippingAddress,
}

#[derive(Serialize)]
/// Body returned whenever an order has just been placed.
pub struct OrderResponse {
    pub message: &'static str,
    pub order: AppOrder,
}

#[derive(Serialize)]
struct MaybeOrderResponse {
    message: &'static str,
    order: Option<AppOrder>,
}

#[derive(Serialize)]
struct OrderListResponse {
    message: &'static str,
    orders: Vec<AppOrder>,
}

#[derive(Serialize)]
struct CheckoutSessionResponse {
    message: &'static str,
    session: CheckoutSession,
}

async fn create_cash_order(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    cart_id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<PlaceOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderResponse>), HttpError> {
    let Path(cart_id) = cart_id?;
    let Json(body) = body?;
    let order =
        orders::create_cash_order(&user, cart_id, body.shipping_address, state.store.as_ref())
            .await?;
    Ok((
        StatusCode::CREATED,
        Json(OrderResponse {
            message: "success",
            order,
        }),
    ))
}

async fn get_user_order(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<MaybeOrderResponse>, HttpError> {
    Ok(Json(MaybeOrderResponse {
        message: "success",
        order: orders::get_user_order(user.id(), state.store.as_ref()).await?,
    }))
}

async fn get_all_orders(
    State(state): State<AppState>,
) -> Result<Json<OrderListResponse>, HttpError> {
    Ok(Json(OrderListResponse {
        message: "success",
        orders: orders::get_all_orders(state.store.as_ref()).await?,
    }))
}

async fn create_checkout_session(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    cart_id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<PlaceOrderRequest>, JsonRejection>,
) -> Result<Json<CheckoutSessionResponse>, HttpError> {
    let Path(cart_id) = cart_id?;
    let Json(body) = body?;
    let session = checkout::create_checkout_session(
        &user,
        cart_id,
        &body.shipping_address,
        state.store.as_ref(),
        state.payments.as_ref(),
    )
    .await?;
    Ok(Json(CheckoutSessionResponse {
        message: "success",
        session,
    }))
}

impl From<orders::errors::OrderPlacementError> for HttpError {
    fn from(error: orders::errors::OrderPlacementError) -> Self {
        match error {
            orders::errors::OrderPlacementError::StorageError(err) => err.into(),
            orders::errors::OrderPlacementError::InvalidShippingAddress(message) => {
                Self::new(StatusCode::BAD_REQUEST, Some(message))
            }
            orders::errors::OrderPlacementError::CartNonExistent(cart_id) => {
                tracing::warn!(%cart_id, "Attempted to order from a cart which does not exist");
                Self::new(
                    StatusCode::NOT_FOUND,
                    Some(String::from("Cart was not found")),
                )
            }
            orders::errors::OrderPlacementError::CartEmpty(cart_id) => {
                tracing::warn!(%cart_id, "Attempted to order from an empty cart");
                Self::new(StatusCode::BAD_REQUEST, Some(String::from("Cart is empty")))
            }
        }
    }
}

impl From<checkout::errors::CheckoutSessionError> for HttpError {
    fn from(error: checkout::errors::CheckoutSessionError) -> Self {
        match error {
            checkout::errors::CheckoutSessionError::OrderPlacementError(err) => err.into(),
            checkout::errors::CheckoutSessionError::PaymentError(err) => err.into(),
        }
    }
}

impl From<checkout::errors::PaymentError> for HttpError {
    fn from(error: checkout::errors::PaymentError) -> Self {
        match error {
            checkout::errors::PaymentError::Disabled => {
                tracing::warn!("Card checkout requested but no payment gateway is enabled");
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    Some(String::from("Card payments are not enabled")),
                )
            }
            #[cfg(feature = "stripe")]
            checkout::errors::PaymentError::StripeError(err) => {
                tracing::error!(error = %err, "Stripe error when opening checkout session");
                Self::from(StatusCode::BAD_GATEWAY) // don't leak anything about stripe
            }
        }
    }
}
