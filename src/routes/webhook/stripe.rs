use axum::{
    body::Body,
    extract::{FromRequest, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;

use crate::{
    routes::orders::OrderResponse,
    services::checkout::{self, errors::CheckoutCompletionError, WebhookEvent},
    state::AppState,
    utils::httperror::HttpError,
};

pub fn create_router() -> Router<AppState> {
    Router::new().route("/", post(stripe_webhook_event))
}

fn webhook_rejection(reason: &str) -> Response {
    (StatusCode::BAD_REQUEST, format!("Webhook Error: {reason}")).into_response()
}

/// A webhook event whose signature has been checked against the raw body.
pub struct VerifiedEvent(WebhookEvent);

impl FromRequest<AppState> for VerifiedEvent
where
    String: FromRequest<AppState>,
{
    type Rejection = Response;

    async fn from_request(req: Request<Body>, state: &AppState) -> Result<Self, Self::Rejection> {
        let signature = req
            .headers()
            .get("stripe-signature")
            .and_then(|sig| sig.to_str().ok())
            .map(ToOwned::to_owned)
            .ok_or_else(|| {
                tracing::warn!("Webhook request without a readable stripe-signature header");
                webhook_rejection("missing stripe-signature header")
            })?;

        let payload = String::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let event = state
            .payments
            .parse_webhook(&payload, &signature)
            .map_err(|err| {
                tracing::warn!(error = %err, "Invalid/Unauthenticated webhook event");
                webhook_rejection(&err.to_string())
            })?;
        Ok(Self(event))
    }
}

pub async fn stripe_webhook_event(
    State(state): State<AppState>,
    VerifiedEvent(event): VerifiedEvent,
) -> Result<Response, HttpError> {
    match event {
        WebhookEvent::CheckoutSessionCompleted(completed) => {
            let order = checkout::complete_checkout(completed, state.store.as_ref()).await?;
            Ok((
                StatusCode::CREATED,
                Json(OrderResponse {
                    message: "success",
                    order,
                }),
            )
                .into_response())
        }
        WebhookEvent::Unhandled(event_type) => {
            tracing::info!(%event_type, "Unhandled webhook event type");
            Ok(Json(json!({"received": true})).into_response())
        }
    }
}

impl From<CheckoutCompletionError> for HttpError {
    fn from(error: CheckoutCompletionError) -> Self {
        match error {
            CheckoutCompletionError::StorageError(err) => err.into(),
            CheckoutCompletionError::CartNonExistent(reference) => {
                tracing::warn!(%reference, "Completed checkout references a cart which does not exist");
                Self::new(StatusCode::NOT_FOUND, Some(String::from("Cart not found")))
            }
        }
    }
}
