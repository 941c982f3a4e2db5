#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
    Router,
};
use serde_json::Value;
use storefront_orders::{
    db::models::{
        appuser::{AppUser, AppUserRole},
        cart::{Cart, CartItem},
        product::{ProductStock, ProductSummary},
    },
    routes,
    services::checkout::{
        errors::{PaymentError, WebhookVerificationError},
        CheckoutSession, CheckoutSessionRequest, CompletedCheckout, PaymentGateway, WebhookEvent,
    },
    state::AppState,
    store::InMemoryStore,
    utils::email::EmailAddress,
};
use tower::ServiceExt as _;
use uuid::Uuid;

pub const VALID_SIGNATURE: &str = "t=1700000000,v1=trusted";

/// A recorded checkout session request.
#[derive(Clone, Debug)]
pub struct SessionRequest {
    pub customer_name: String,
    pub customer_email: String,
    pub cart_id: Uuid,
    pub amount: i64,
    pub metadata: HashMap<String, String>,
}

/// Stands in for Stripe. Accepts webhooks signed with `VALID_SIGNATURE`
/// whose JSON body is a flattened checkout session.
#[derive(Default)]
pub struct FakeGateway {
    pub requests: Mutex<Vec<SessionRequest>>,
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest<'_>,
    ) -> Result<CheckoutSession, PaymentError> {
        let id = format!("cs_test_{}", request.cart_id.simple());
        self.requests.lock().unwrap().push(SessionRequest {
            customer_name: request.customer_name.to_owned(),
            customer_email: request.customer_email.to_owned(),
            cart_id: request.cart_id,
            amount: request.amount,
            metadata: request.metadata,
        });
        Ok(CheckoutSession {
            url: Some(format!("https://checkout.example/pay/{id}")),
            id,
        })
    }

    fn parse_webhook(
        &self,
        payload: &str,
        signature: &str,
    ) -> Result<WebhookEvent, WebhookVerificationError> {
        if signature != VALID_SIGNATURE {
            return Err(WebhookVerificationError::InvalidSignature(String::from(
                "No signatures found matching the expected signature for payload",
            )));
        }
        let body: Value = serde_json::from_str(payload)
            .map_err(|err| WebhookVerificationError::InvalidSignature(err.to_string()))?;
        let event_type = body["type"].as_str().unwrap_or_default().to_owned();
        if event_type != "checkout.session.completed" {
            return Ok(WebhookEvent::Unhandled(event_type));
        }
        let session = &body["data"]["object"];
        Ok(WebhookEvent::CheckoutSessionCompleted(CompletedCheckout {
            client_reference_id: session["client_reference_id"].as_str().map(str::to_owned),
            customer_email: session["customer_email"].as_str().map(str::to_owned),
            amount_total: session["amount_total"].as_i64(),
            metadata: serde_json::from_value(session["metadata"].clone()).unwrap_or_default(),
        }))
    }
}

pub struct TestApp {
    pub store: InMemoryStore,
    pub gateway: Arc<FakeGateway>,
    pub router: Router,
    pub customer: AppUser,
    pub admin: AppUser,
    pub product_id: Uuid,
}

impl TestApp {
    pub async fn new() -> Self {
        let store = InMemoryStore::new();
        let gateway = Arc::new(FakeGateway::default());
        let customer = AppUser::new(
            Uuid::new_v4(),
            "Salma Hassan",
            EmailAddress::try_from("salma@example.com").unwrap(),
            AppUserRole::Customer,
        );
        let admin = AppUser::new(
            Uuid::new_v4(),
            "Store Admin",
            EmailAddress::try_from("admin@example.com").unwrap(),
            AppUserRole::Administrator,
        );
        store.insert_user(customer.clone()).await;
        store.insert_user(admin.clone()).await;
        let product_id = Uuid::new_v4();
        store
            .insert_product(
                ProductSummary {
                    id: product_id,
                    title: String::from("Ceramic mug"),
                    price: 15_000,
                },
                ProductStock {
                    quantity: 40,
                    sold: 2,
                },
            )
            .await;
        let state = AppState {
            store: Arc::new(store.clone()),
            payments: gateway.clone(),
        };
        Self {
            router: routes::create_app(state, "/"),
            store,
            gateway,
            customer,
            admin,
            product_id,
        }
    }

    /// Serve the same store through a different payment gateway.
    pub fn with_payments(mut self, payments: Arc<dyn PaymentGateway>) -> Self {
        let state = AppState {
            store: Arc::new(self.store.clone()),
            payments,
        };
        self.router = routes::create_app(state, "/");
        self
    }

    /// Give the customer a cart holding three mugs, discounted from 450.00 to 400.00 EGP.
    pub async fn seed_cart(&self) -> Cart {
        let cart = Cart::new(
            Uuid::new_v4(),
            self.customer.id(),
            vec![CartItem {
                product_id: self.product_id,
                quantity: 3,
                price: 15_000,
            }],
            45_000,
            Some(40_000),
        );
        self.store.insert_cart(cart.clone()).await;
        cart
    }

    pub async fn send(&self, request: Request<Body>) -> (u16, Vec<u8>) {
        let response: Response<Body> = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status().as_u16();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    pub async fn send_json(&self, request: Request<Body>) -> (u16, Value) {
        let (status, body) = self.send(request).await;
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }
}

pub fn shipping_body() -> String {
    serde_json::json!({
        "shipping_address": {
            "details": "14 Road 9, Maadi",
            "phone": "01001234567",
            "city": "Cairo"
        }
    })
    .to_string()
}

pub fn as_user(method: &str, uri: &str, user: &AppUser, body: Option<String>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", user.id().to_string());
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn completed_checkout_payload(cart_id: &str, email: &str, amount_total: i64) -> String {
    serde_json::json!({
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "client_reference_id": cart_id,
                "customer_email": email,
                "amount_total": amount_total,
                "metadata": {
                    "details": "14 Road 9, Maadi",
                    "phone": "01001234567",
                    "city": "Cairo"
                }
            }
        }
    })
    .to_string()
}

pub fn webhook(payload: String, signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri("/webhook/stripe");
    if let Some(signature) = signature {
        builder = builder.header("stripe-signature", signature);
    }
    builder.body(Body::from(payload)).unwrap()
}
