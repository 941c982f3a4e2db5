//! Constants (primary environment variables/secrets) used across the application.
pub mod api;
pub mod db;
pub mod logging;
mod secrets;
#[cfg(feature = "stripe")]
pub mod stripe;
