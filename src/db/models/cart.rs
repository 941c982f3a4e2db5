//! Models mapping to the cart and `cart_item` tables. Carts are built by the
//! cart service; here they are read once and consumed when an order is placed.
use sqlx::{query, query_as};
use uuid::Uuid;

use crate::db::{errors::DatabaseError, Connection, ConnectionPool};

/// A single line of a cart.
#[derive(sqlx::FromRow, Clone, Debug, PartialEq, Eq)]
pub struct CartItem {
    pub product_id: Uuid,
    pub quantity: i32,
    /// Unit price in piastres, as captured when the item was added.
    pub price: i64,
}

#[derive(sqlx::FromRow)]
struct CartRow {
    id: Uuid,
    user_id: Uuid,
    total_price: i64,
    total_price_after_discount: Option<i64>,
}

/// A customer's cart, with its items.
#[derive(Clone, Debug)]
pub struct Cart {
    id: Uuid,
    user_id: Uuid,
    pub items: Vec<CartItem>,
    /// Total in piastres before any coupon.
    pub total_price: i64,
    /// Total in piastres after a coupon was applied, if one was.
    pub total_price_after_discount: Option<i64>,
}

impl Cart {
    pub const fn new(
        id: Uuid,
        user_id: Uuid,
        items: Vec<CartItem>,
        total_price: i64,
        total_price_after_discount: Option<i64>,
    ) -> Self {
        Self {
            id,
            user_id,
            items,
            total_price,
            total_price_after_discount,
        }
    }
    pub const fn id(&self) -> Uuid {
        self.id
    }
    /// The user who owns this cart.
    pub const fn user_id(&self) -> Uuid {
        self.user_id
    }
    /// The amount to charge for the cart. A zero discounted total is treated
    /// the same as no discount at all.
    pub fn effective_total(&self) -> i64 {
        self.total_price_after_discount
            .filter(|&discounted| discounted != 0)
            .unwrap_or(self.total_price)
    }
    /// Select a `Cart` and its items by cart ID.
    pub async fn select_one(
        id: Uuid,
        db_client: &ConnectionPool,
    ) -> Result<Option<Self>, DatabaseError> {
        let Some(row) = query_as::<_, CartRow>(
            "SELECT id, user_id, total_price, total_price_after_discount FROM cart WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db_client)
        .await?
        else {
            return Ok(None);
        };
        let items = query_as::<_, CartItem>(
            "SELECT product_id, quantity, price FROM cart_item WHERE cart_id = $1",
        )
        .bind(id)
        .fetch_all(db_client)
        .await?;
        Ok(Some(row.with_items(items)))
    }
}

impl CartRow {
    fn with_items(self, items: Vec<CartItem>) -> Cart {
        Cart {
            id: self.id,
            user_id: self.user_id,
            items,
            total_price: self.total_price,
            total_price_after_discount: self.total_price_after_discount,
        }
    }
}

/// Lock, read and delete a cart, returning its contents as they were when
/// claimed. `None` when the cart no longer exists. Items are removed by the
/// `ON DELETE CASCADE` foreign key.
pub async fn claim(id: Uuid, conn: &mut Connection) -> Result<Option<Cart>, DatabaseError> {
    let Some(row) = query_as::<_, CartRow>(
        "SELECT id, user_id, total_price, total_price_after_discount FROM cart \
        WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    else {
        return Ok(None);
    };
    let items = query_as::<_, CartItem>(
        "SELECT product_id, quantity, price FROM cart_item WHERE cart_id = $1",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;
    query("DELETE FROM cart WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(Some(row.with_items(items)))
}
