//! Small helpers shared across the application.
pub mod email;
pub mod httperror;
pub mod logging;
