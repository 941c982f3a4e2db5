//! Models mapping to the appuser database table. Users are owned by the
//! authentication service; this API only ever reads them.
use sqlx::query_as;
use uuid::Uuid;

use crate::{
    db::{errors::DatabaseError, ConnectionPool},
    utils::email::EmailAddress,
};

#[derive(sqlx::Type, Clone, Copy, Debug, PartialEq, Eq)]
#[sqlx(type_name = "app_user_role", rename_all = "lowercase")]
pub enum AppUserRole {
    /// A regular customer, able to purchase items.
    Customer,
    /// An administrator, able to see every order.
    Administrator,
}

/// An `AppUser` which is stored in the database.
#[derive(sqlx::FromRow, Clone, Debug)]
pub struct AppUser {
    /// The user's ID primary key.
    id: Uuid,
    /// The user's display name, used to label hosted checkout line items.
    pub name: String,
    /// The user's email address.
    email: String,
    /// The user's role (customer or admin).
    pub role: AppUserRole,
}

impl AppUser {
    /// Construct a user record. Used when seeding non-database stores.
    pub fn new(id: Uuid, name: &str, email: EmailAddress, role: AppUserRole) -> Self {
        Self {
            id,
            name: name.to_owned(),
            email: email.into(),
            role,
        }
    }
    /// Get the `AppUser`'s ID primary key.
    pub const fn id(&self) -> Uuid {
        self.id
    }
    /// Get the user's email address.
    pub fn email(&self) -> &str {
        &self.email
    }
    /// Select an `AppUser` from the database by ID.
    pub async fn select_one(
        id: Uuid,
        db_client: &ConnectionPool,
    ) -> Result<Option<Self>, DatabaseError> {
        Ok(
            query_as::<_, Self>("SELECT id, name, email, role FROM appuser WHERE id = $1")
                .bind(id)
                .fetch_optional(db_client)
                .await?,
        )
    }
    /// Select an `AppUser` from the database by email.
    pub async fn select_by_email(
        email: &EmailAddress,
        db_client: &ConnectionPool,
    ) -> Result<Option<Self>, DatabaseError> {
        Ok(query_as::<_, Self>(
            "SELECT id, name, email, role FROM appuser WHERE lower(email) = lower($1)",
        )
        .bind(email.as_str())
        .fetch_optional(db_client)
        .await?)
    }
}
