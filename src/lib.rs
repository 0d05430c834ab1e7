//! Tally is a personal finance tracker.
//!
//! It records income and expenses, classifies expenses by category and
//! description, persists them in SQLite, and derives balance summaries, a
//! month-by-month history and expense totals per category over an optional
//! date range.
//!
//! The library is organised around three pieces:
//! - the [category::Catalog] of expense categories, loaded from a text file,
//! - the [ledger::Ledger], the in-memory collection of transactions that keeps
//!   storage in step through a [stores::TransactionGateway],
//! - the [aggregation] functions that derive views from a slice of transactions.

#![warn(missing_docs)]

mod app_state;
mod database_id;
mod db;
mod error;
mod logging;

pub mod aggregation;
pub mod category;
pub mod chart;
pub mod config;
pub mod ledger;
pub mod report;
pub mod stores;
pub mod timezone;
pub mod transaction;

pub use app_state::{AppState, SQLAppState, create_app_state};
pub use database_id::{TransactionId, UNSAVED_ID};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use logging::{level_for_verbosity, setup_logging};
