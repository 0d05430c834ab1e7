//! The ledger: the authoritative in-memory collection of a session's transactions.
//!
//! All mutation goes through [Ledger], which coordinates with a
//! [TransactionGateway] so that transaction IDs stay consistent with durable
//! storage. Storage failures are non-fatal: the in-memory change still goes
//! ahead and the failure is reported back as [Persistence::Degraded].

use time::PrimitiveDateTime;

use crate::{
    Error,
    database_id::{TransactionId, UNSAVED_ID},
    stores::TransactionGateway,
    transaction::Transaction,
};

/// Whether a ledger mutation reached durable storage.
#[must_use]
#[derive(Debug, PartialEq)]
pub enum Persistence {
    /// Storage acknowledged the change.
    Saved,
    /// Storage failed, the change only exists in memory for this session.
    Degraded(Error),
}

impl Persistence {
    /// Whether storage acknowledged the change.
    pub fn is_saved(&self) -> bool {
        matches!(self, Persistence::Saved)
    }
}

/// The result of adding a transaction to the ledger.
#[derive(Debug, PartialEq)]
pub struct Added {
    /// The transaction as stored in the ledger, with its assigned ID if it was saved.
    pub transaction: Transaction,
    /// Whether the transaction reached durable storage.
    pub persistence: Persistence,
}

/// The mutable collection of transactions for one session.
///
/// Mutating methods take `&mut self`, so the gateway round trips of two
/// mutations on the same ledger can never interleave.
#[derive(Debug)]
pub struct Ledger<G> {
    gateway: G,
    transactions: Vec<Transaction>,
}

impl<G> Ledger<G>
where
    G: TransactionGateway,
{
    /// Create an empty ledger backed by `gateway`.
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            transactions: Vec::new(),
        }
    }

    /// Load every stored transaction into the ledger, `page_size` rows at a time.
    ///
    /// Pages are accumulated in order and only replace the ledger's contents
    /// once the last page has been read. Returns the number of transactions
    /// loaded.
    ///
    /// # Errors
    /// Returns the gateway's error if any page fails to load. The ledger's
    /// contents are left unchanged in that case.
    pub async fn hydrate(&mut self, page_size: u32) -> Result<usize, Error> {
        if self.gateway.is_empty().await? {
            tracing::info!("No stored transactions to load");
            return Ok(0);
        }

        let page_size = page_size.max(1);
        let mut loaded = Vec::new();

        for page_number in 1.. {
            let page = self.gateway.load_page(page_size, page_number).await?;

            if page.is_empty() {
                break;
            }

            tracing::debug!("Loaded page {page_number} with {} transactions", page.len());
            loaded.extend(page);
        }

        let count = loaded.len();
        self.transactions = loaded;
        tracing::info!("Loaded {count} transactions");

        Ok(count)
    }

    /// Add `transaction` to the ledger.
    ///
    /// An unsaved transaction is first saved through the gateway and given the
    /// ID it returns. If saving fails, the transaction is still added, without
    /// an ID, and the failure is reported in [Added::persistence].
    ///
    /// Adding the same transaction twice adds it twice.
    ///
    /// # Errors
    /// Returns an [Error::FutureDatedTransaction] if the transaction's date is
    /// after `now`. The ledger and storage are left untouched.
    pub async fn add(
        &mut self,
        mut transaction: Transaction,
        now: PrimitiveDateTime,
    ) -> Result<Added, Error> {
        if transaction.date() > now {
            return Err(Error::FutureDatedTransaction(transaction.date()));
        }

        let persistence = if transaction.is_saved() {
            Persistence::Saved
        } else {
            match self.gateway.save(&transaction).await {
                Ok(id) => {
                    transaction.assign_id(id);
                    Persistence::Saved
                }
                Err(error) => {
                    tracing::warn!("Could not save transaction, keeping it in memory only: {error}");
                    Persistence::Degraded(error)
                }
            }
        };

        self.transactions.push(transaction.clone());

        Ok(Added {
            transaction,
            persistence,
        })
    }

    /// Remove the transaction with the ID `id` from the ledger and from storage.
    ///
    /// The in-memory removal goes ahead even if storage fails to delete the
    /// row, the failure is reported as [Persistence::Degraded].
    ///
    /// # Errors
    /// Returns an [Error::NotFound] if no transaction in the ledger has the ID
    /// `id`. Unsaved transactions have no ID and cannot be removed by ID.
    pub async fn remove(&mut self, id: TransactionId) -> Result<Persistence, Error> {
        if id == UNSAVED_ID {
            return Err(Error::NotFound(id));
        }

        let index = self
            .transactions
            .iter()
            .position(|transaction| transaction.id() == id)
            .ok_or(Error::NotFound(id))?;

        let persistence = match self.gateway.delete(id).await {
            Ok(()) => Persistence::Saved,
            Err(error) => {
                tracing::warn!("Could not delete transaction {id} from storage: {error}");
                Persistence::Degraded(error)
            }
        };

        self.transactions.remove(index);

        Ok(persistence)
    }
}

impl<G> Ledger<G> {
    /// Every transaction in the ledger, in the order they were added.
    pub fn all(&self) -> &[Transaction] {
        &self.transactions
    }

    /// The transaction with the ID `id`, if it is in the ledger.
    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        if id == UNSAVED_ID {
            return None;
        }

        self.transactions
            .iter()
            .find(|transaction| transaction.id() == id)
    }

    /// The number of transactions in the ledger.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Whether the ledger has no transactions.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// The gateway the ledger persists through.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }
}
