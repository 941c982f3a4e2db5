//! Models mapping to the `order_item` table: the cart lines frozen into an order.
use serde::Serialize;
use sqlx::{query, query_as};
use uuid::Uuid;

use crate::db::{
    errors::DatabaseError,
    models::{cart::CartItem, product::ProductSummary},
    Connection, ConnectionPool,
};

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub quantity: i32,
    /// Unit price in piastres at the time the order was placed.
    pub price: i64,
    /// The referenced product, filled in for read endpoints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductSummary>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    order_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    price: i64,
}

impl From<&CartItem> for OrderItem {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id,
            quantity: item.quantity,
            price: item.price,
            product: None,
        }
    }
}

impl OrderItem {
    /// Store this item as part of the given order.
    pub async fn store(&self, order_id: Uuid, conn: &mut Connection) -> Result<(), DatabaseError> {
        query("INSERT INTO order_item (order_id, product_id, quantity, price) VALUES ($1, $2, $3, $4)")
            .bind(order_id)
            .bind(self.product_id)
            .bind(self.quantity)
            .bind(self.price)
            .execute(conn)
            .await?;
        Ok(())
    }
    /// Select the items of every listed order, paired with their order ID.
    pub async fn select_for_orders(
        order_ids: &[Uuid],
        db_client: &ConnectionPool,
    ) -> Result<Vec<(Uuid, Self)>, DatabaseError> {
        let rows = query_as::<_, OrderItemRow>(
            "SELECT order_id, product_id, quantity, price FROM order_item WHERE order_id = ANY($1)",
        )
        .bind(order_ids)
        .fetch_all(db_client)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    row.order_id,
                    Self {
                        product_id: row.product_id,
                        quantity: row.quantity,
                        price: row.price,
                        product: None,
                    },
                )
            })
            .collect())
    }
}
