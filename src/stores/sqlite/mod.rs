//! Contains the SQLite implementation of the transaction gateway.

mod transaction;

pub use transaction::{SQLiteTransactionStore, create_transaction_table};
