//! Transactions for the finance tracker.
//!
//! This module contains the `Transaction` model, a tagged union over income
//! and expenses, and its constructors.

mod core;

pub use core::{Transaction, TransactionKind};
