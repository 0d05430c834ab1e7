//! Expense categories and the catalog they are loaded into.

mod catalog;
mod domain;
mod source;

pub use catalog::Catalog;
pub use domain::{Category, CategoryName};
pub use source::{CategorySource, FileCategorySource};
