//! Defines data models (structs) which map directly to rows in the database.
pub mod apporder;
pub mod appuser;
pub mod cart;
pub mod order_item;
pub mod product;
