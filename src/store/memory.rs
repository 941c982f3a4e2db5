use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::OrderStore;
use crate::{
    db::models::{
        apporder::{AppOrder, AppOrderInsert},
        appuser::AppUser,
        cart::Cart,
        product::{ProductStock, ProductSummary},
    },
    services::errors::StorageError,
    utils::email::EmailAddress,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, AppUser>,
    products: HashMap<Uuid, (ProductSummary, ProductStock)>,
    carts: HashMap<Uuid, Cart>,
    /// Kept in placement order.
    orders: Vec<AppOrder>,
}

/// A thread-safe in-memory order store. A single lock guards every table, so
/// `place_order` is atomic just like the database transaction.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: AppUser) {
        self.tables.write().await.users.insert(user.id(), user);
    }

    pub async fn insert_product(&self, product: ProductSummary, stock: ProductStock) {
        self.tables
            .write()
            .await
            .products
            .insert(product.id, (product, stock));
    }

    pub async fn insert_cart(&self, cart: Cart) {
        self.tables.write().await.carts.insert(cart.id(), cart);
    }

    /// The inventory counters of a product, if it exists.
    pub async fn stock(&self, product_id: Uuid) -> Option<ProductStock> {
        self.tables
            .read()
            .await
            .products
            .get(&product_id)
            .map(|&(_, stock)| stock)
    }

    pub async fn has_cart(&self, cart_id: Uuid) -> bool {
        self.tables.read().await.carts.contains_key(&cart_id)
    }

    pub async fn order_count(&self) -> usize {
        self.tables.read().await.orders.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<AppUser>, StorageError> {
        Ok(self.tables.read().await.users.get(&user_id).cloned())
    }

    async fn find_user_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<AppUser>, StorageError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|user| user.email().eq_ignore_ascii_case(email.as_str()))
            .cloned())
    }

    async fn find_cart(&self, cart_id: Uuid) -> Result<Option<Cart>, StorageError> {
        Ok(self.tables.read().await.carts.get(&cart_id).cloned())
    }

    async fn find_products(&self, ids: &[Uuid]) -> Result<Vec<ProductSummary>, StorageError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.products.get(id).map(|(summary, _)| summary.clone()))
            .collect())
    }

    async fn place_order(
        &self,
        cart_id: Uuid,
        order: AppOrderInsert,
    ) -> Result<Option<AppOrder>, StorageError> {
        let mut tables = self.tables.write().await;
        let Some(cart) = tables.carts.get(&cart_id) else {
            return Ok(None);
        };
        let order = order.into_order(cart);
        // Every counter is checked before any is written.
        let mut sold = HashMap::new();
        for item in &order.items {
            let current = sold.get(&item.product_id).copied().or_else(|| {
                tables
                    .products
                    .get(&item.product_id)
                    .map(|&(_, stock)| stock)
            });
            if let Some(stock) = current {
                let stock = stock
                    .sell(item.quantity)
                    .ok_or(StorageError::StockOutOfRange(item.product_id))?;
                sold.insert(item.product_id, stock);
            }
        }
        tables.carts.remove(&cart_id);
        for (product_id, stock) in sold {
            if let Some((_, current)) = tables.products.get_mut(&product_id) {
                *current = stock;
            }
        }
        tables.orders.push(order.clone());
        Ok(Some(order))
    }

    async fn latest_order_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<AppOrder>, StorageError> {
        Ok(self
            .tables
            .read()
            .await
            .orders
            .iter()
            .rev()
            .find(|order| order.user_id() == user_id)
            .cloned())
    }

    async fn all_orders(&self) -> Result<Vec<AppOrder>, StorageError> {
        Ok(self.tables.read().await.orders.iter().rev().cloned().collect())
    }
}
