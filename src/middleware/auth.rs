//! Middleware used for checking user authentication/authorisation.
//!
//! Credentials are verified upstream; requests reach this API carrying the
//! authenticated user's ID in the `X-User-Id` header, which is resolved to a
//! user record here.
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    db::models::appuser::{AppUser, AppUserRole},
    state::AppState,
    utils::httperror::HttpError,
};

/// The header the authentication gateway places the user's ID in.
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Clone)]
/// The user making the current request.
pub struct CurrentUser(pub AppUser);

/// Middleware to identify the user making the request.
pub async fn authenticated_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let user_id = req
        .headers()
        .get(USER_ID_HEADER)
        .ok_or(StatusCode::UNAUTHORIZED)?
        .to_str()
        .ok()
        .and_then(|value| Uuid::parse_str(value).ok())
        .ok_or_else(|| {
            tracing::warn!("Request carried a malformed {USER_ID_HEADER} header");
            StatusCode::UNAUTHORIZED
        })?;
    let user = state.store.find_user(user_id).await?.ok_or_else(|| {
        tracing::warn!(%user_id, "Request identified as a user who does not exist");
        StatusCode::UNAUTHORIZED
    })?;
    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

fn require_role(req: &Request, role: AppUserRole) -> Result<(), StatusCode> {
    let CurrentUser(user) = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(StatusCode::UNAUTHORIZED)?;
    if user.role == role {
        Ok(())
    } else {
        tracing::warn!(user_id = %user.id(), role = ?user.role, required = ?role, "Role not permitted");
        Err(StatusCode::FORBIDDEN)
    }
}

/// Only lets customers through. Must be layered inside `authenticated_middleware`.
pub async fn customer_middleware(req: Request, next: Next) -> Result<Response, StatusCode> {
    require_role(&req, AppUserRole::Customer)?;
    Ok(next.run(req).await)
}

/// Only lets administrators through. Must be layered inside `authenticated_middleware`.
pub async fn administrator_middleware(req: Request, next: Next) -> Result<Response, StatusCode> {
    require_role(&req, AppUserRole::Administrator)?;
    Ok(next.run(req).await)
}
