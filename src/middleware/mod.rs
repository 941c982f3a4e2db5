//! Axum middleware applied to the routers.
pub mod auth;
