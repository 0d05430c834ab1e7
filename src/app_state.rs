//! Implements a struct that holds the state of a running session.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use rust_decimal::Decimal;
use time::PrimitiveDateTime;

use crate::{
    Error,
    category::{Catalog, CategoryName, FileCategorySource},
    config::Config,
    database_id::TransactionId,
    db::initialize,
    ledger::{Added, Ledger, Persistence},
    stores::{SQLiteTransactionStore, TransactionGateway},
    timezone::{get_local_offset, local_now},
    transaction::Transaction,
};

/// The catalog and ledger for one session, plus the timezone used to decide
/// what "now" is.
#[derive(Debug)]
pub struct AppState<G> {
    /// The expense categories and their description tags.
    pub catalog: Catalog,

    /// The session's transactions.
    pub ledger: Ledger<G>,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

/// An alias for an [AppState] that uses SQLite for the backend.
pub type SQLAppState = AppState<SQLiteTransactionStore>;

impl<G> AppState<G>
where
    G: TransactionGateway,
{
    /// Create a new [AppState].
    ///
    /// # Errors
    /// Returns an [Error::InvalidTimezone] if `local_timezone` is not a
    /// canonical timezone name.
    pub fn new(catalog: Catalog, ledger: Ledger<G>, local_timezone: &str) -> Result<Self, Error> {
        if get_local_offset(local_timezone).is_none() {
            return Err(Error::InvalidTimezone(local_timezone.to_owned()));
        }

        Ok(Self {
            catalog,
            ledger,
            local_timezone: local_timezone.to_owned(),
        })
    }

    /// The current date and time in the local timezone.
    ///
    /// # Errors
    /// Returns an [Error::InvalidTimezone] if the timezone is not recognised.
    pub fn now(&self) -> Result<PrimitiveDateTime, Error> {
        local_now(&self.local_timezone)
    }

    /// Look up the catalog's name for the category `name`.
    ///
    /// # Errors
    /// Returns an [Error::UnknownCategory] if the catalog has no such category.
    pub fn resolve_category(&self, name: &str) -> Result<CategoryName, Error> {
        self.catalog
            .find_by_name(name)
            .map(|category| category.name().clone())
            .ok_or_else(|| Error::UnknownCategory(name.trim().to_owned()))
    }

    /// Create an income and add it to the ledger.
    ///
    /// # Errors
    /// Returns an error if the amount is invalid or the date is in the future.
    pub async fn record_income(
        &mut self,
        amount: Decimal,
        date: PrimitiveDateTime,
    ) -> Result<Added, Error> {
        let transaction = Transaction::income(amount, date)?;
        let now = self.now()?;

        self.ledger.add(transaction, now).await
    }

    /// Create an expense in the catalog category `category` and add it to the ledger.
    ///
    /// A description that is not one of the category's description tags is
    /// accepted with a warning.
    ///
    /// # Errors
    /// Returns an error if the category is not in the catalog, the amount is
    /// invalid or the date is in the future.
    pub async fn record_expense(
        &mut self,
        category: &str,
        amount: Decimal,
        date: PrimitiveDateTime,
        description: Option<&str>,
    ) -> Result<Added, Error> {
        let category = self.resolve_category(category)?;
        let transaction = Transaction::expense(category, amount, date, description)?;

        if let (Some(category), Some(description)) =
            (transaction.category(), transaction.description())
        {
            if !self.catalog.has_description(category.as_ref(), description) {
                tracing::warn!(
                    "\"{description}\" is not a listed description for the category {category}"
                );
            }
        }

        let now = self.now()?;

        self.ledger.add(transaction, now).await
    }

    /// Remove the transaction with the ID `id`.
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if no transaction has the ID `id`.
    pub async fn delete(&mut self, id: TransactionId) -> Result<Persistence, Error> {
        self.ledger.remove(id).await
    }
}

/// Creates an [AppState] instance that uses SQLite for the backend.
///
/// The database is initialized and the ledger is loaded from it. A failure to
/// load stored transactions is logged and the session starts with an empty
/// ledger.
///
/// # Errors
/// Returns an error if the database cannot be initialized or if the
/// timezone is not recognised.
pub async fn create_app_state(
    db_connection: Connection,
    catalog: Catalog,
    config: &Config,
) -> Result<SQLAppState, Error> {
    initialize(&db_connection)?;

    let connection = Arc::new(Mutex::new(db_connection));
    let mut ledger = Ledger::new(SQLiteTransactionStore::new(connection));

    if let Err(error) = ledger.hydrate(config.page_size).await {
        tracing::warn!("Could not load stored transactions, starting with an empty ledger: {error}");
    }

    AppState::new(catalog, ledger, &config.timezone)
}

impl SQLAppState {
    /// Open the database and category file named in `config`.
    ///
    /// A missing or unreadable category file results in an empty catalog.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or initialized, or if
    /// the timezone is not recognised.
    pub async fn open(config: &Config) -> Result<Self, Error> {
        let connection = Connection::open(&config.db_path)?;
        let catalog = Catalog::load(&FileCategorySource::new(&config.categories_path));

        create_app_state(connection, catalog, config).await
    }
}
