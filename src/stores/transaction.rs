//! Defines the transaction gateway trait.

use std::future::Future;

use crate::{Error, database_id::TransactionId, transaction::Transaction};

/// Durable storage for transactions, consumed by the [Ledger](crate::ledger::Ledger).
///
/// Every method may perform I/O, so each returns a future that the ledger
/// awaits before it touches its in-memory state.
pub trait TransactionGateway {
    /// Persist `transaction` and return the ID assigned to it.
    ///
    /// # Errors
    /// Implementers should return an [Error::StorageUnavailable] if the store
    /// cannot be reached, or an [Error::ConstraintViolation] if the store
    /// rejects the record.
    fn save(
        &self,
        transaction: &Transaction,
    ) -> impl Future<Output = Result<TransactionId, Error>> + Send;

    /// Delete the transaction with the ID `id`.
    ///
    /// # Errors
    /// Implementers should return an [Error::NotFound] if there is no such
    /// transaction, or an [Error::StorageUnavailable] if the store cannot be
    /// reached.
    fn delete(&self, id: TransactionId) -> impl Future<Output = Result<(), Error>> + Send;

    /// Retrieve one page of stored transactions, ordered by date.
    ///
    /// `page_number` starts at 1. An empty page means there is no more data.
    ///
    /// # Errors
    /// Implementers should return an [Error::StorageUnavailable] if the store
    /// cannot be reached.
    fn load_page(
        &self,
        page_size: u32,
        page_number: u32,
    ) -> impl Future<Output = Result<Vec<Transaction>, Error>> + Send;

    /// Whether the store holds no transactions.
    ///
    /// # Errors
    /// Implementers should return an [Error::StorageUnavailable] if the store
    /// cannot be reached.
    fn is_empty(&self) -> impl Future<Output = Result<bool, Error>> + Send;
}
