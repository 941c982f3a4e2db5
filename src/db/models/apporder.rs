//! Models mapping to the apporder table. An order is created once, from a
//! cart, and never edited by this API.
use std::{collections::HashMap, sync::LazyLock};

use serde::{Deserialize, Serialize};
use sqlx::{query, query_as};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::{
    errors::DatabaseError,
    models::{cart::Cart, order_item::OrderItem},
    Connection, ConnectionPool,
};

static PHONE_REGEX: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^\+?[0-9]{7,15}$").expect("Phone regex invalid"));

#[derive(sqlx::Type, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[sqlx(type_name = "payment_method", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Paid on delivery.
    Cash,
    /// Paid up front through hosted checkout.
    Card,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ShippingAddress {
    pub details: String,
    pub phone: String,
    pub city: String,
}

impl ShippingAddress {
    /// Checks every field is filled in and the phone number is plausible,
    /// returning a message suitable for the client otherwise.
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("details", &self.details),
            ("phone", &self.phone),
            ("city", &self.city),
        ] {
            if value.trim().is_empty() {
                return Err(format!("Shipping address {field} must not be empty"));
            }
        }
        if !PHONE_REGEX.is_match(self.phone.trim()) {
            return Err(String::from("Shipping address phone is not a valid number"));
        }
        Ok(())
    }

    /// Flatten into string pairs for gateways that only carry string metadata.
    pub fn to_metadata(&self) -> HashMap<String, String> {
        HashMap::from([
            (String::from("details"), self.details.clone()),
            (String::from("phone"), self.phone.clone()),
            (String::from("city"), self.city.clone()),
        ])
    }

    /// Rebuild from gateway metadata. `None` unless all three fields are present.
    pub fn from_metadata(metadata: &HashMap<String, String>) -> Option<Self> {
        Some(Self {
            details: metadata.get("details")?.clone(),
            phone: metadata.get("phone")?.clone(),
            city: metadata.get("city")?.clone(),
        })
    }
}

/// INSERT model for an order. Used ONLY when placing a new order. Items and,
/// for cash orders, the total are taken from the cart as it is claimed.
pub struct AppOrderInsert {
    pub user_id: Uuid,
    /// Amount charged in piastres. `None` charges the cart's effective total.
    pub total_order_price: Option<i64>,
    pub shipping_address: Option<ShippingAddress>,
    pub payment_method: PaymentMethod,
    pub paid_at: Option<OffsetDateTime>,
}

impl AppOrderInsert {
    /// An unpaid cash-on-delivery order for the whole cart.
    pub const fn cash(user_id: Uuid, shipping_address: ShippingAddress) -> Self {
        Self {
            user_id,
            total_order_price: None,
            shipping_address: Some(shipping_address),
            payment_method: PaymentMethod::Cash,
            paid_at: None,
        }
    }

    /// A card order paid through hosted checkout. Without a known amount the
    /// cart's effective total is recorded.
    pub fn card(
        user_id: Uuid,
        amount_paid: Option<i64>,
        shipping_address: Option<ShippingAddress>,
    ) -> Self {
        Self {
            user_id,
            total_order_price: amount_paid,
            shipping_address,
            payment_method: PaymentMethod::Card,
            paid_at: Some(OffsetDateTime::now_utc()),
        }
    }

    /// Assign an ID and creation time and copy the cart's items, producing
    /// the order to persist.
    pub fn into_order(self, cart: &Cart) -> AppOrder {
        AppOrder {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            items: cart.items.iter().map(OrderItem::from).collect(),
            total_order_price: self
                .total_order_price
                .unwrap_or_else(|| cart.effective_total()),
            shipping_address: self.shipping_address,
            payment_method: self.payment_method,
            is_paid: self.paid_at.is_some(),
            paid_at: self.paid_at,
            is_delivered: false,
            delivered_at: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct AppOrder {
    id: Uuid,
    user_id: Uuid,
    pub items: Vec<OrderItem>,
    /// Amount charged in piastres.
    pub total_order_price: i64,
    pub shipping_address: Option<ShippingAddress>,
    pub payment_method: PaymentMethod,
    pub is_paid: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub paid_at: Option<OffsetDateTime>,
    pub is_delivered: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub delivered_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(sqlx::FromRow)]
struct AppOrderRow {
    id: Uuid,
    user_id: Uuid,
    total_order_price: i64,
    shipping_details: Option<String>,
    shipping_phone: Option<String>,
    shipping_city: Option<String>,
    payment_method: PaymentMethod,
    is_paid: bool,
    paid_at: Option<OffsetDateTime>,
    is_delivered: bool,
    delivered_at: Option<OffsetDateTime>,
    created_at: OffsetDateTime,
}

impl From<AppOrderRow> for AppOrder {
    fn from(row: AppOrderRow) -> Self {
        let shipping_address = match (row.shipping_details, row.shipping_phone, row.shipping_city) {
            (Some(details), Some(phone), Some(city)) => Some(ShippingAddress {
                details,
                phone,
                city,
            }),
            _ => None,
        };
        Self {
            id: row.id,
            user_id: row.user_id,
            items: Vec::new(),
            total_order_price: row.total_order_price,
            shipping_address,
            payment_method: row.payment_method,
            is_paid: row.is_paid,
            paid_at: row.paid_at,
            is_delivered: row.is_delivered,
            delivered_at: row.delivered_at,
            created_at: row.created_at,
        }
    }
}

const SELECT_ORDER: &str = "SELECT id, user_id, total_order_price, shipping_details, \
    shipping_phone, shipping_city, payment_method, is_paid, paid_at, is_delivered, \
    delivered_at, created_at FROM apporder";

impl AppOrder {
    pub const fn id(&self) -> Uuid {
        self.id
    }
    /// The user who placed the order.
    pub const fn user_id(&self) -> Uuid {
        self.user_id
    }
    /// Store the order row and its items.
    pub async fn store(&self, conn: &mut Connection) -> Result<(), DatabaseError> {
        let address = self.shipping_address.as_ref();
        query(
            "INSERT INTO apporder (id, user_id, total_order_price, shipping_details, \
            shipping_phone, shipping_city, payment_method, is_paid, paid_at, is_delivered, \
            delivered_at, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(self.id)
        .bind(self.user_id)
        .bind(self.total_order_price)
        .bind(address.map(|a| a.details.as_str()))
        .bind(address.map(|a| a.phone.as_str()))
        .bind(address.map(|a| a.city.as_str()))
        .bind(self.payment_method)
        .bind(self.is_paid)
        .bind(self.paid_at)
        .bind(self.is_delivered)
        .bind(self.delivered_at)
        .bind(self.created_at)
        .execute(&mut *conn)
        .await?;
        for item in &self.items {
            item.store(self.id, &mut *conn).await?;
        }
        Ok(())
    }
    /// Select the most recently placed order of a user, without items.
    pub async fn select_latest_for_user(
        user_id: Uuid,
        db_client: &ConnectionPool,
    ) -> Result<Option<Self>, DatabaseError> {
        Ok(query_as::<_, AppOrderRow>(&format!(
            "{SELECT_ORDER} WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1"
        ))
        .bind(user_id)
        .fetch_optional(db_client)
        .await?
        .map(Self::from))
    }
    /// Select every order, newest first, without items.
    pub async fn select_all(db_client: &ConnectionPool) -> Result<Vec<Self>, DatabaseError> {
        Ok(
            query_as::<_, AppOrderRow>(&format!("{SELECT_ORDER} ORDER BY created_at DESC"))
                .fetch_all(db_client)
                .await?
                .into_iter()
                .map(Self::from)
                .collect(),
        )
    }
}
