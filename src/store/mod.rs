//! The storage port used by the order services, with a PostgreSQL backend for
//! deployments and an in-memory backend for tests and local runs.
use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::models::{
        apporder::{AppOrder, AppOrderInsert},
        appuser::AppUser,
        cart::Cart,
        product::ProductSummary,
    },
    services::errors::StorageError,
    utils::email::EmailAddress,
};

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<AppUser>, StorageError>;
    async fn find_user_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<AppUser>, StorageError>;
    async fn find_cart(&self, cart_id: Uuid) -> Result<Option<Cart>, StorageError>;
    async fn find_products(&self, ids: &[Uuid]) -> Result<Vec<ProductSummary>, StorageError>;
    /// Consume the cart and persist the order in one step: the cart is
    /// deleted, the order built from the cart's contents at that moment and
    /// stored, and every item's quantity moved from stock to sold. Returns
    /// `None`, writing nothing, when the cart no longer exists.
    async fn place_order(
        &self,
        cart_id: Uuid,
        order: AppOrderInsert,
    ) -> Result<Option<AppOrder>, StorageError>;
    /// The user's most recently placed order, with items.
    async fn latest_order_for_user(&self, user_id: Uuid)
        -> Result<Option<AppOrder>, StorageError>;
    /// Every order, newest first, with items.
    async fn all_orders(&self) -> Result<Vec<AppOrder>, StorageError>;
}
