//! Defines the core data model for transactions.

use rust_decimal::Decimal;
use time::PrimitiveDateTime;

use crate::{
    Error,
    category::CategoryName,
    database_id::{TransactionId, UNSAVED_ID},
};

// ============================================================================
// MODELS
// ============================================================================

/// What a transaction did with the money.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionKind {
    /// Money that was earned.
    Income,
    /// Money that was spent.
    Expense {
        /// The name of the category in the catalog the expense belongs to.
        category: CategoryName,
        /// An optional description, usually one of the category's description tags.
        description: Option<String>,
    },
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// Create transactions with [Transaction::income] or [Transaction::expense].
/// New transactions have the ID [UNSAVED_ID] until the ledger persists them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    id: TransactionId,
    amount: Decimal,
    date: PrimitiveDateTime,
    kind: TransactionKind,
}

impl Transaction {
    /// Create a new, unsaved income.
    ///
    /// # Errors
    /// Returns an [Error::InvalidAmount] if `amount` is not greater than zero.
    pub fn income(amount: Decimal, date: PrimitiveDateTime) -> Result<Self, Error> {
        Self::new(amount, date, TransactionKind::Income)
    }

    /// Create a new, unsaved expense in `category`.
    ///
    /// A blank `description` is treated as no description. The description is
    /// not checked against the category's description tags.
    ///
    /// # Errors
    /// Returns an [Error::InvalidAmount] if `amount` is not greater than zero.
    pub fn expense(
        category: CategoryName,
        amount: Decimal,
        date: PrimitiveDateTime,
        description: Option<&str>,
    ) -> Result<Self, Error> {
        let description = description
            .map(str::trim)
            .filter(|description| !description.is_empty())
            .map(str::to_owned);

        Self::new(
            amount,
            date,
            TransactionKind::Expense {
                category,
                description,
            },
        )
    }

    fn new(amount: Decimal, date: PrimitiveDateTime, kind: TransactionKind) -> Result<Self, Error> {
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount(amount));
        }

        Ok(Self {
            id: UNSAVED_ID,
            amount,
            date,
            kind,
        })
    }

    /// Create a transaction without validating the amount.
    ///
    /// Used for rows read back from storage, which were validated when they
    /// were first created.
    pub(crate) fn new_unchecked(
        id: TransactionId,
        amount: Decimal,
        date: PrimitiveDateTime,
        kind: TransactionKind,
    ) -> Self {
        Self {
            id,
            amount,
            date,
            kind,
        }
    }

    /// The ID assigned by storage, or [UNSAVED_ID].
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Whether storage has assigned this transaction an ID.
    pub fn is_saved(&self) -> bool {
        self.id != UNSAVED_ID
    }

    /// The amount of money earned or spent, always greater than zero.
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// When the transaction happened.
    pub fn date(&self) -> PrimitiveDateTime {
        self.date
    }

    /// Whether the transaction is income or an expense.
    pub fn kind(&self) -> &TransactionKind {
        &self.kind
    }

    /// Whether money was earned.
    pub fn is_income(&self) -> bool {
        matches!(self.kind, TransactionKind::Income)
    }

    /// Whether money was spent.
    pub fn is_expense(&self) -> bool {
        matches!(self.kind, TransactionKind::Expense { .. })
    }

    /// The category of an expense, `None` for income.
    pub fn category(&self) -> Option<&CategoryName> {
        match &self.kind {
            TransactionKind::Expense { category, .. } => Some(category),
            TransactionKind::Income => None,
        }
    }

    /// The description of an expense, `None` for income or an expense without one.
    pub fn description(&self) -> Option<&str> {
        match &self.kind {
            TransactionKind::Expense { description, .. } => description.as_deref(),
            TransactionKind::Income => None,
        }
    }

    /// Record the ID storage assigned to this transaction.
    ///
    /// IDs are assigned once, an already saved transaction keeps its ID.
    pub(crate) fn assign_id(&mut self, id: TransactionId) {
        debug_assert!(!self.is_saved(), "transaction {} already has an ID", self.id);

        if !self.is_saved() {
            self.id = id;
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
