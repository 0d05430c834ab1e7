//! Defines the crate level error type and the conversion from SQLite errors.

use rust_decimal::Decimal;
use time::PrimitiveDateTime;

use crate::database_id::TransactionId;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A transaction was created with an amount that is zero or negative.
    ///
    /// Whether money was earned or spent is carried by the transaction kind,
    /// so amounts are always strictly positive.
    #[error("{0} is not a valid amount, amounts must be greater than zero")]
    InvalidAmount(Decimal),

    /// A date in the future was used to add a transaction to the ledger.
    ///
    /// Transactions record events that have already happened, therefore future
    /// dates are not allowed.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDatedTransaction(PrimitiveDateTime),

    /// The start of a date range came after its end.
    #[error("the start of the range {start} is after the end of the range {end}")]
    InvalidRange {
        /// The requested start of the range.
        start: PrimitiveDateTime,
        /// The requested end of the range.
        end: PrimitiveDateTime,
    },

    /// No transaction with the given ID exists.
    #[error("could not find a transaction with the ID {0}")]
    NotFound(TransactionId),

    /// The persistence gateway could not be reached or failed unexpectedly.
    ///
    /// The ledger treats this error as non-fatal and keeps working in memory.
    #[error("storage is unavailable: {0}")]
    StorageUnavailable(String),

    /// The persistence gateway rejected a record, e.g. a CHECK or UNIQUE
    /// constraint failed.
    #[error("storage rejected the record: {0}")]
    ConstraintViolation(String),

    /// The category definitions could not be read or parsed.
    ///
    /// Callers should fall back to an empty catalog.
    #[error("could not load the category catalog: {0}")]
    CatalogLoadFailed(String),

    /// An empty string was used to create a category name.
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    /// A category name did not match any category in the catalog.
    #[error("\"{0}\" is not a known category")]
    UnknownCategory(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: rusqlite::ErrorCode::ConstraintViolation,
                    extended_code: _,
                },
                description,
            ) => Error::ConstraintViolation(
                description.unwrap_or_else(|| "constraint failed".to_owned()),
            ),
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound(0),
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::StorageUnavailable(error.to_string())
            }
        }
    }
}
