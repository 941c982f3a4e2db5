use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use super::OrderStore;
use crate::{
    db::{
        models::{
            apporder::{AppOrder, AppOrderInsert},
            appuser::AppUser,
            cart::{self, Cart},
            order_item::OrderItem,
            product::{self, ProductSummary},
        },
        ConnectionPool,
    },
    services::errors::StorageError,
    utils::email::EmailAddress,
};

/// An order store backed by the PostgreSQL connection pool.
#[derive(Clone)]
pub struct PgStore {
    db_conn: ConnectionPool,
}

impl PgStore {
    pub const fn new(db_conn: ConnectionPool) -> Self {
        Self { db_conn }
    }

    async fn attach_items(&self, mut orders: Vec<AppOrder>) -> Result<Vec<AppOrder>, StorageError> {
        let ids: Vec<Uuid> = orders.iter().map(AppOrder::id).collect();
        let mut items_by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for (order_id, item) in OrderItem::select_for_orders(&ids, &self.db_conn).await? {
            items_by_order.entry(order_id).or_default().push(item);
        }
        for order in &mut orders {
            order.items = items_by_order.remove(&order.id()).unwrap_or_default();
        }
        Ok(orders)
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<AppUser>, StorageError> {
        Ok(AppUser::select_one(user_id, &self.db_conn).await?)
    }

    async fn find_user_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<AppUser>, StorageError> {
        Ok(AppUser::select_by_email(email, &self.db_conn).await?)
    }

    async fn find_cart(&self, cart_id: Uuid) -> Result<Option<Cart>, StorageError> {
        Ok(Cart::select_one(cart_id, &self.db_conn).await?)
    }

    async fn find_products(&self, ids: &[Uuid]) -> Result<Vec<ProductSummary>, StorageError> {
        Ok(ProductSummary::select_many(ids, &self.db_conn).await?)
    }

    async fn place_order(
        &self,
        cart_id: Uuid,
        order: AppOrderInsert,
    ) -> Result<Option<AppOrder>, StorageError> {
        let mut tx = self.db_conn.begin().await?;
        let Some(cart) = cart::claim(cart_id, &mut tx).await? else {
            tx.rollback().await?;
            return Ok(None);
        };
        let order = order.into_order(&cart);
        order.store(&mut tx).await?;
        for item in &order.items {
            product::sell(item.product_id, item.quantity, &mut tx).await?;
        }
        tx.commit().await?;
        Ok(Some(order))
    }

    async fn latest_order_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<AppOrder>, StorageError> {
        let Some(order) = AppOrder::select_latest_for_user(user_id, &self.db_conn).await? else {
            return Ok(None);
        };
        Ok(self.attach_items(vec![order]).await?.pop())
    }

    async fn all_orders(&self) -> Result<Vec<AppOrder>, StorageError> {
        let orders = AppOrder::select_all(&self.db_conn).await?;
        self.attach_items(orders).await
    }
}
