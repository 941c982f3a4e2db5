//! Shared errors used in multiple services.
use crate::db::errors::DatabaseError;
use thiserror::Error;
use uuid::Uuid;

/// Errors returned by underlying storage layers.
#[derive(Error, Debug)]
pub enum StorageError {
    /// An error returned by the database.
    #[error(transparent)]
    DatabaseError(#[from] DatabaseError),
    /// Selling would push a product's stock counters out of range.
    #[error("Stock counters of product {0} are out of range")]
    StockOutOfRange(Uuid),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        Self::DatabaseError(err.into())
    }
}
