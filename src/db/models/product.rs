//! Models mapping to the product database table. The catalog is managed
//! elsewhere; orders only read summaries and move stock into the sold column.
use serde::Serialize;
use sqlx::{query, query_as};
use uuid::Uuid;

use crate::db::{errors::DatabaseError, Connection, ConnectionPool};

/// The subset of a product shown alongside order items.
#[derive(sqlx::FromRow, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ProductSummary {
    /// The product's ID primary key.
    pub id: Uuid,
    /// The product's display title.
    pub title: String,
    /// The current list price in piastres.
    pub price: i64,
}

/// A product's inventory counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProductStock {
    /// Units left in stock. Not range checked, may go negative on oversell.
    pub quantity: i32,
    /// Units sold over the product's lifetime.
    pub sold: i32,
}

impl ProductStock {
    /// Move `count` units from stock to sold. `None` when either counter
    /// would leave the `INTEGER` range, where the database update fails too.
    pub fn sell(self, count: i32) -> Option<Self> {
        Some(Self {
            quantity: self.quantity.checked_sub(count)?,
            sold: self.sold.checked_add(count)?,
        })
    }
}

impl ProductSummary {
    /// Select the summaries for every listed product ID which exists.
    pub async fn select_many(
        ids: &[Uuid],
        db_client: &ConnectionPool,
    ) -> Result<Vec<Self>, DatabaseError> {
        Ok(
            query_as::<_, Self>("SELECT id, title, price FROM product WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(db_client)
                .await?,
        )
    }
}

/// Decrement stock and increment the sold counter of a product. Unknown
/// product IDs are a no-op.
pub async fn sell(product_id: Uuid, count: i32, conn: &mut Connection) -> Result<(), DatabaseError> {
    query("UPDATE product SET quantity = quantity - $1, sold = sold + $1 WHERE id = $2")
        .bind(count)
        .bind(product_id)
        .execute(conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::ProductStock;

    #[test]
    fn selling_moves_units_and_may_oversell() {
        let stock = ProductStock {
            quantity: 2,
            sold: 10,
        };
        assert_eq!(
            stock.sell(5),
            Some(ProductStock {
                quantity: -3,
                sold: 15
            })
        );
    }

    #[test]
    fn selling_past_the_counter_range_fails() {
        let stock = ProductStock {
            quantity: 1,
            sold: i32::MAX - 1,
        };
        assert_eq!(stock.sell(2), None);
    }
}
