//! Logic for card payments through a hosted checkout page, with or without
//! Stripe compiled in.
use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::models::{
        apporder::{AppOrder, AppOrderInsert, ShippingAddress},
        appuser::AppUser,
    },
    services::orders,
    store::OrderStore,
    utils::email::EmailAddress,
};

#[cfg(feature = "stripe")]
use crate::constants::stripe::{
    CHECKOUT_CANCEL_URL, CHECKOUT_SUCCESS_URL, STRIPE_SECRET_KEY, STRIPE_WEBHOOK_SECRET,
};

/// Everything the gateway needs to open a hosted checkout page for a cart.
pub struct CheckoutSessionRequest<'a> {
    /// Labels the single line item on the checkout page.
    pub customer_name: &'a str,
    pub customer_email: &'a str,
    /// Echoed back by the gateway as the client reference once paid.
    pub cart_id: Uuid,
    /// Amount to charge in piastres.
    pub amount: i64,
    pub metadata: HashMap<String, String>,
}

/// A hosted checkout page the customer should be redirected to.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

/// The parts of a completed checkout needed to turn the paid cart into an order.
#[derive(Clone, Debug, Default)]
pub struct CompletedCheckout {
    pub client_reference_id: Option<String>,
    pub customer_email: Option<String>,
    /// Amount actually charged in piastres.
    pub amount_total: Option<i64>,
    pub metadata: HashMap<String, String>,
}

/// A verified webhook notification from the gateway.
#[derive(Clone, Debug)]
pub enum WebhookEvent {
    CheckoutSessionCompleted(CompletedCheckout),
    /// Any other event type, by name.
    Unhandled(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest<'_>,
    ) -> Result<CheckoutSession, errors::PaymentError>;
    /// Authenticate a webhook payload against its signature header and decode it.
    fn parse_webhook(
        &self,
        payload: &str,
        signature: &str,
    ) -> Result<WebhookEvent, errors::WebhookVerificationError>;
}

#[cfg(feature = "stripe")]
/// A live gateway talking to the Stripe API.
pub struct StripeGateway {
    client: stripe::Client,
    webhook_secret: String,
    success_url: String,
    cancel_url: String,
}

#[cfg(feature = "stripe")]
impl StripeGateway {
    pub fn new(secret_key: &str, webhook_secret: &str, success_url: &str, cancel_url: &str) -> Self {
        Self {
            client: stripe::Client::new(secret_key),
            webhook_secret: webhook_secret.to_owned(),
            success_url: success_url.to_owned(),
            cancel_url: cancel_url.to_owned(),
        }
    }

    /// Build a gateway from the Stripe environment variables/secrets.
    pub fn from_env() -> Self {
        Self::new(
            &STRIPE_SECRET_KEY,
            &STRIPE_WEBHOOK_SECRET,
            &CHECKOUT_SUCCESS_URL,
            &CHECKOUT_CANCEL_URL,
        )
    }
}

#[cfg(feature = "stripe")]
#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest<'_>,
    ) -> Result<CheckoutSession, errors::PaymentError> {
        let cart_id = request.cart_id.to_string();
        let mut params = stripe::CreateCheckoutSession::new();
        params.mode = Some(stripe::CheckoutSessionMode::Payment);
        params.success_url = Some(self.success_url.as_str());
        params.cancel_url = Some(self.cancel_url.as_str());
        params.customer_email = Some(request.customer_email);
        params.client_reference_id = Some(cart_id.as_str());
        params.metadata = Some(request.metadata);
        params.line_items = Some(vec![stripe::CreateCheckoutSessionLineItems {
            price_data: Some(stripe::CreateCheckoutSessionLineItemsPriceData {
                currency: stripe::Currency::EGP,
                unit_amount: Some(request.amount),
                product_data: Some(stripe::CreateCheckoutSessionLineItemsPriceDataProductData {
                    name: request.customer_name.to_owned(),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            quantity: Some(1),
            ..Default::default()
        }]);
        let session = stripe::CheckoutSession::create(&self.client, params).await?;
        Ok(CheckoutSession {
            id: session.id.to_string(),
            url: session.url,
        })
    }

    fn parse_webhook(
        &self,
        payload: &str,
        signature: &str,
    ) -> Result<WebhookEvent, errors::WebhookVerificationError> {
        let event = stripe::Webhook::construct_event(payload, signature, &self.webhook_secret)
            .map_err(|err| errors::WebhookVerificationError::InvalidSignature(err.to_string()))?;
        match (event.type_, event.data.object) {
            (
                stripe::EventType::CheckoutSessionCompleted,
                stripe::EventObject::CheckoutSession(session),
            ) => Ok(WebhookEvent::CheckoutSessionCompleted(CompletedCheckout {
                client_reference_id: session.client_reference_id,
                customer_email: session
                    .customer_email
                    .or_else(|| session.customer_details.and_then(|details| details.email)),
                amount_total: session.amount_total,
                metadata: session.metadata.unwrap_or_default(),
            })),
            (event_type, _) => Ok(WebhookEvent::Unhandled(event_type.as_str().to_owned())),
        }
    }
}

#[cfg(not(feature = "stripe"))]
/// Stands in for the gateway when Stripe is not compiled in. Card checkout is
/// refused and no webhook can be authenticated.
pub struct DisabledGateway;

#[cfg(not(feature = "stripe"))]
#[async_trait]
impl PaymentGateway for DisabledGateway {
    async fn create_checkout_session(
        &self,
        _request: CheckoutSessionRequest<'_>,
    ) -> Result<CheckoutSession, errors::PaymentError> {
        Err(errors::PaymentError::Disabled)
    }

    fn parse_webhook(
        &self,
        _payload: &str,
        _signature: &str,
    ) -> Result<WebhookEvent, errors::WebhookVerificationError> {
        Err(errors::WebhookVerificationError::Disabled)
    }
}

/// Open a hosted checkout page charging the effective total of the user's cart.
pub async fn create_checkout_session(
    user: &AppUser,
    cart_id: Uuid,
    shipping_address: &ShippingAddress,
    store: &dyn OrderStore,
    gateway: &dyn PaymentGateway,
) -> Result<CheckoutSession, errors::CheckoutSessionError> {
    let cart = orders::load_cart_for_order(user, cart_id, shipping_address, store).await?;
    let session = gateway
        .create_checkout_session(CheckoutSessionRequest {
            customer_name: &user.name,
            customer_email: user.email(),
            cart_id,
            amount: cart.effective_total(),
            metadata: shipping_address.to_metadata(),
        })
        .await?;
    tracing::info!(
        user_id = %user.id(),
        %cart_id,
        session_id = %session.id,
        amount = cart.effective_total(),
        "Opened checkout session"
    );
    Ok(session)
}

/// Turn a paid checkout into a card order, consuming the cart it references.
pub async fn complete_checkout(
    checkout: CompletedCheckout,
    store: &dyn OrderStore,
) -> Result<AppOrder, errors::CheckoutCompletionError> {
    let reference = checkout.client_reference_id.unwrap_or_default();
    let cart_id = Uuid::parse_str(&reference)
        .map_err(|_parse| errors::CheckoutCompletionError::CartNonExistent(reference.clone()))?;
    let cart = store
        .find_cart(cart_id)
        .await?
        .ok_or_else(|| errors::CheckoutCompletionError::CartNonExistent(reference.clone()))?;

    let email = checkout
        .customer_email
        .and_then(|email| EmailAddress::try_from(email).ok());
    let customer = match email {
        Some(ref email) => store.find_user_by_email(email).await?,
        None => None,
    };
    let user_id = match customer {
        Some(user) => {
            if user.id() != cart.user_id() {
                tracing::warn!(
                    %cart_id,
                    payer = %user.id(),
                    owner = %cart.user_id(),
                    "Checkout paid by a user other than the cart owner"
                );
            }
            user.id()
        }
        None => {
            tracing::warn!(%cart_id, "No user matches the checkout email, using the cart owner");
            cart.user_id()
        }
    };

    let shipping_address = ShippingAddress::from_metadata(&checkout.metadata);
    let order = AppOrderInsert::card(user_id, checkout.amount_total, shipping_address);
    let order = store
        .place_order(cart_id, order)
        .await?
        .ok_or(errors::CheckoutCompletionError::CartNonExistent(reference))?;
    tracing::info!(
        order_id = %order.id(),
        %user_id,
        amount = order.total_order_price,
        "Placed card order"
    );
    Ok(order)
}

pub mod errors {
    use thiserror::Error;

    use crate::services::{errors::StorageError, orders::errors::OrderPlacementError};

    #[derive(Debug, Error)]
    pub enum PaymentError {
        #[error("Card payments are not enabled")]
        Disabled,
        #[cfg(feature = "stripe")]
        #[error(transparent)]
        StripeError(#[from] stripe::StripeError),
    }

    #[derive(Debug, Error)]
    pub enum WebhookVerificationError {
        #[error("Card payments are not enabled")]
        Disabled,
        #[error("{0}")]
        InvalidSignature(String),
    }

    #[derive(Debug, Error)]
    pub enum CheckoutSessionError {
        #[error(transparent)]
        OrderPlacementError(#[from] OrderPlacementError),
        #[error(transparent)]
        PaymentError(#[from] PaymentError),
    }

    #[derive(Debug, Error)]
    pub enum CheckoutCompletionError {
        #[error(transparent)]
        StorageError(#[from] StorageError),
        /// Carries the client reference as received, which may not be a UUID.
        #[error("Checkout references cart {0}, which does not exist")]
        CartNonExistent(String),
    }
}
