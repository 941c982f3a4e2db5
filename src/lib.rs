//! Order placement API: turns carts into cash or card orders, moving the
//! ordered quantities from stock to sold.
pub mod constants;
pub mod db;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod utils;
