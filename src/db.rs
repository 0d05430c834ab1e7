//! Sets up the application's SQLite database.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{Error, stores::sqlite::create_transaction_table};

/// Create the tables used by the application if they do not already exist.
///
/// Runs inside an exclusive SQL transaction, so either every table is created
/// or none are.
///
/// # Errors
/// Returns an [Error::StorageUnavailable] if the database cannot be locked or
/// if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn initialize_creates_transaction_table() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("Could not initialize database");

        let count: i64 = connection
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'transaction'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn initialize_is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let result = initialize(&connection);

        assert_eq!(result, Ok(()));
        assert_eq!(count_sequence_rows(&connection), 1);
    }

    #[test]
    fn reopening_database_keeps_one_sequence_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tally.db");

        for _ in 0..5 {
            let connection = Connection::open(&path).unwrap();
            initialize(&connection).expect("Could not initialize database");
        }

        let connection = Connection::open(&path).unwrap();
        assert_eq!(count_sequence_rows(&connection), 1);
    }

    fn count_sequence_rows(connection: &Connection) -> i64 {
        connection
            .query_row(
                "SELECT COUNT(*) FROM sqlite_sequence WHERE name = 'transaction'",
                [],
                |row| row.get(0),
            )
            .unwrap()
    }
}
