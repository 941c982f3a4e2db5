//! Services which define the core business logic behind the routes.
pub mod checkout;
pub mod errors;
pub mod orders;
