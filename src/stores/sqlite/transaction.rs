//! Implements a SQLite backed transaction gateway.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use rusqlite::{Connection, Row, types::Type};
use rust_decimal::Decimal;
use time::{PrimitiveDateTime, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    category::CategoryName,
    database_id::TransactionId,
    stores::TransactionGateway,
    transaction::{Transaction, TransactionKind},
};

/// Dates are stored as fixed width text so that ordering by the column is
/// chronological. This only holds for years 1 to 9999, see [FIRST_STORABLE_YEAR].
const DATE_FORMAT: &[BorrowedFormatItem] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:9]"
);

/// Earlier years format with a sign or fewer digits and would sort out of order.
const FIRST_STORABLE_YEAR: i32 = 1;

const INCOME: &str = "income";
const EXPENSE: &str = "expense";

/// Stores transactions in a SQLite database.
///
/// SQLite calls are blocking, so every operation runs on tokio's blocking
/// thread pool while the caller awaits the result.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    ///
    /// The database must have been set up with [crate::db::initialize].
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    /// Get the total number of transactions in the database.
    ///
    /// # Errors
    /// This function will return a [Error::StorageUnavailable] if there is some SQL error.
    pub async fn count(&self) -> Result<i64, Error> {
        self.with_connection(|connection| {
            connection
                .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
                    row.get(0)
                })
                .map_err(|error| error.into())
        })
        .await
    }

    async fn with_connection<T, F>(&self, operation: F) -> Result<T, Error>
    where
        F: FnOnce(&Connection) -> Result<T, Error> + Send + 'static,
        T: Send + 'static,
    {
        let connection = self.connection.clone();

        tokio::task::spawn_blocking(move || {
            let connection = connection.lock().map_err(|_| Error::DatabaseLockError)?;
            operation(&connection)
        })
        .await
        .map_err(|error| Error::StorageUnavailable(format!("storage task failed: {error}")))?
    }
}

impl TransactionGateway for SQLiteTransactionStore {
    /// Insert `transaction` as a new row and return the generated ID.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::ConstraintViolation] if the row breaks a table constraint or
    ///   the date is before the year 1,
    /// - [Error::DatabaseLockError] if the connection lock is poisoned,
    /// - or [Error::StorageUnavailable] if there is some other SQL error.
    async fn save(&self, transaction: &Transaction) -> Result<TransactionId, Error> {
        let (kind, category, description) = match transaction.kind() {
            TransactionKind::Income => (INCOME, None, None),
            TransactionKind::Expense {
                category,
                description,
            } => (
                EXPENSE,
                Some(category.as_ref().to_owned()),
                description.clone(),
            ),
        };
        if transaction.date().year() < FIRST_STORABLE_YEAR {
            return Err(Error::ConstraintViolation(format!(
                "cannot store the date {}, dates must be in the year {FIRST_STORABLE_YEAR} or later",
                transaction.date()
            )));
        }

        let amount = transaction.amount().to_string();
        let date = transaction
            .date()
            .format(DATE_FORMAT)
            .map_err(|error| Error::ConstraintViolation(format!("invalid date: {error}")))?;

        let id = self
            .with_connection(move |connection| {
                connection
                    .prepare(
                        "INSERT INTO \"transaction\" (kind, amount, date, category, description)
                         VALUES (?1, ?2, ?3, ?4, ?5)
                         RETURNING id",
                    )?
                    .query_row((kind, amount, date, category, description), |row| row.get(0))
                    .map_err(|error| error.into())
            })
            .await?;

        tracing::debug!("Saved transaction {id}");

        Ok(id)
    }

    /// Delete the row with the ID `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a stored transaction,
    /// - [Error::DatabaseLockError] if the connection lock is poisoned,
    /// - or [Error::StorageUnavailable] if there is some other SQL error.
    async fn delete(&self, id: TransactionId) -> Result<(), Error> {
        let rows_affected = self
            .with_connection(move |connection| {
                connection
                    .execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])
                    .map_err(|error| error.into())
            })
            .await?;

        if rows_affected == 0 {
            return Err(Error::NotFound(id));
        }

        tracing::debug!("Deleted transaction {id}");

        Ok(())
    }

    /// Retrieve one page of rows ordered by date, oldest first.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DatabaseLockError] if the connection lock is poisoned,
    /// - or [Error::StorageUnavailable] if there is a SQL error or a row cannot be read.
    async fn load_page(&self, page_size: u32, page_number: u32) -> Result<Vec<Transaction>, Error> {
        let limit = i64::from(page_size);
        let offset = i64::from(page_number.saturating_sub(1)) * limit;

        self.with_connection(move |connection| {
            connection
                .prepare(
                    "SELECT id, kind, amount, date, category, description FROM \"transaction\"
                     ORDER BY date ASC, id ASC
                     LIMIT ?1 OFFSET ?2",
                )?
                .query_map((limit, offset), map_transaction_row)?
                .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
                .collect()
        })
        .await
    }

    /// Check whether the transaction table has no rows.
    ///
    /// # Errors
    /// This function will return a [Error::StorageUnavailable] if there is some SQL error.
    async fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.count().await? == 0)
    }
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
                amount TEXT NOT NULL,
                date TEXT NOT NULL,
                category TEXT,
                description TEXT,
                CHECK ((kind = 'income' AND category IS NULL AND description IS NULL)
                    OR (kind = 'expense' AND category IS NOT NULL))
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT INTO sqlite_sequence (name, seq)
         SELECT 'transaction', 0
         WHERE NOT EXISTS (SELECT 1 FROM sqlite_sequence WHERE name = 'transaction')",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(date, id);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_kind: String = row.get(1)?;
    let raw_amount: String = row.get(2)?;
    let raw_date: String = row.get(3)?;
    let category: Option<String> = row.get(4)?;
    let description: Option<String> = row.get(5)?;

    let amount = Decimal::from_str(&raw_amount).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(error))
    })?;
    let date = PrimitiveDateTime::parse(&raw_date, DATE_FORMAT).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(error))
    })?;
    let kind = match (raw_kind.as_str(), category) {
        (INCOME, _) => TransactionKind::Income,
        (EXPENSE, Some(category)) => TransactionKind::Expense {
            category: CategoryName::new_unchecked(&category),
            description,
        },
        (other, _) => {
            return Err(rusqlite::Error::FromSqlConversionFailure(
                1,
                Type::Text,
                format!("invalid transaction kind {other:?}").into(),
            ));
        }
    };

    Ok(Transaction::new_unchecked(id, amount, date, kind))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use time::macros::datetime;

    use crate::{
        Error,
        category::CategoryName,
        db::initialize,
        stores::{SQLiteTransactionStore, TransactionGateway},
        transaction::Transaction,
    };

    fn get_test_store() -> SQLiteTransactionStore {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        SQLiteTransactionStore::new(Arc::new(Mutex::new(connection)))
    }

    fn groceries(amount: rust_decimal::Decimal) -> Transaction {
        Transaction::expense(
            CategoryName::new_unchecked("Food"),
            amount,
            datetime!(2024-01-15 12:30),
            Some("Groceries"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn save_assigns_increasing_ids() {
        let store = get_test_store();
        let income = Transaction::income(dec!(1000.00), datetime!(2024-01-10 9:00)).unwrap();

        let first = store.save(&income).await.expect("Could not save transaction");
        let second = store.save(&income).await.expect("Could not save transaction");

        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }

    #[tokio::test]
    async fn saved_transactions_round_trip() {
        let store = get_test_store();
        let income = Transaction::income(dec!(1000.10), datetime!(2024-01-10 9:00:01.5)).unwrap();
        let expense = groceries(dec!(0.30));
        let income_id = store.save(&income).await.unwrap();
        let expense_id = store.save(&expense).await.unwrap();

        let loaded = store.load_page(10, 1).await.expect("Could not load page");

        let want = vec![
            Transaction::new_unchecked(
                income_id,
                income.amount(),
                income.date(),
                income.kind().clone(),
            ),
            Transaction::new_unchecked(
                expense_id,
                expense.amount(),
                expense.date(),
                expense.kind().clone(),
            ),
        ];
        assert_eq!(loaded, want);
    }

    #[tokio::test]
    async fn pages_are_ordered_by_date() {
        let store = get_test_store();
        let dates = [
            datetime!(2024-03-01 0:00),
            datetime!(2024-01-01 0:00),
            datetime!(2024-02-01 0:00),
        ];
        for date in dates {
            store
                .save(&Transaction::income(dec!(1), date).unwrap())
                .await
                .unwrap();
        }

        let first_page = store.load_page(2, 1).await.unwrap();
        let second_page = store.load_page(2, 2).await.unwrap();
        let third_page = store.load_page(2, 3).await.unwrap();

        let got: Vec<_> = first_page
            .iter()
            .chain(second_page.iter())
            .map(Transaction::date)
            .collect();
        assert_eq!(
            got,
            [
                datetime!(2024-01-01 0:00),
                datetime!(2024-02-01 0:00),
                datetime!(2024-03-01 0:00)
            ]
        );
        assert_eq!(first_page.len(), 2);
        assert!(third_page.is_empty());
    }

    #[tokio::test]
    async fn dates_before_year_one_are_rejected() {
        let store = get_test_store();
        let date = time::Date::from_calendar_date(-1, time::Month::June, 1)
            .unwrap()
            .midnight();
        let ancient = Transaction::income(dec!(5), date).unwrap();

        let result = store.save(&ancient).await;

        assert!(
            matches!(result, Err(Error::ConstraintViolation(_))),
            "want constraint violation, got {result:?}"
        );
        assert_eq!(store.is_empty().await, Ok(true));
    }

    #[tokio::test]
    async fn year_one_is_stored() {
        let store = get_test_store();
        let date = time::Date::from_calendar_date(1, time::Month::January, 1)
            .unwrap()
            .midnight();

        let result = store
            .save(&Transaction::income(dec!(5), date).unwrap())
            .await;

        assert_eq!(result, Ok(1));
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let store = get_test_store();
        let id = store.save(&groceries(dec!(5))).await.unwrap();

        store.delete(id).await.expect("Could not delete transaction");

        assert_eq!(store.is_empty().await, Ok(true));
    }

    #[tokio::test]
    async fn delete_missing_row_is_not_found() {
        let store = get_test_store();

        let result = store.delete(42).await;

        assert_eq!(result, Err(Error::NotFound(42)));
    }

    #[tokio::test]
    async fn is_empty_reflects_contents() {
        let store = get_test_store();
        assert_eq!(store.is_empty().await, Ok(true));

        store.save(&groceries(dec!(5))).await.unwrap();

        assert_eq!(store.is_empty().await, Ok(false));
        assert_eq!(store.count().await, Ok(1));
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = get_test_store();
        let first = store.save(&groceries(dec!(5))).await.unwrap();
        store.delete(first).await.unwrap();

        let second = store.save(&groceries(dec!(5))).await.unwrap();

        assert!(second > first, "want a new ID, got {second} after {first}");
    }

    #[tokio::test]
    async fn poisoned_lock_is_reported() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let connection = Arc::new(Mutex::new(connection));
        let poisoner = connection.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the lock");
        })
        .join();
        let store = SQLiteTransactionStore::new(connection);

        let result = store.save(&groceries(dec!(5))).await;

        assert_eq!(result, Err(Error::DatabaseLockError));
    }

    #[tokio::test]
    async fn corrupt_amount_is_storage_error() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
            .execute(
                "INSERT INTO \"transaction\" (kind, amount, date) VALUES ('income', 'lots', '2024-01-01 00:00:00.000000000')",
                (),
            )
            .unwrap();
        let store = SQLiteTransactionStore::new(Arc::new(Mutex::new(connection)));

        let result = store.load_page(10, 1).await;

        assert!(
            matches!(result, Err(Error::StorageUnavailable(_))),
            "want storage error, got {result:?}"
        );
    }
}
