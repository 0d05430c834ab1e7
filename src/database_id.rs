//! Database ID type definition.

/// Alias for the integer type used for mapping transactions to database IDs.
///
/// The value [UNSAVED_ID] marks a transaction that has not been persisted yet.
pub type TransactionId = i64;

/// The ID carried by a transaction until the persistence gateway assigns one.
pub const UNSAVED_ID: TransactionId = 0;
