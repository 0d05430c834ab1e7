//! Application configuration.

use std::path::PathBuf;

/// The default path to the SQLite database.
pub const DEFAULT_DB_PATH: &str = "tally.db";

/// The default path to the category definitions file.
pub const DEFAULT_CATEGORIES_PATH: &str = "categories.txt";

/// The default timezone used to decide what "now" is.
pub const DEFAULT_TIMEZONE: &str = "Etc/UTC";

/// The default number of transactions loaded per page at start-up.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Where the application keeps its data and how it loads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// File path to the application SQLite database.
    pub db_path: PathBuf,

    /// File path to the category definitions, one `name,description,...` line per category.
    pub categories_path: PathBuf,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub timezone: String,

    /// How many transactions to load per page when hydrating the ledger.
    pub page_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            categories_path: PathBuf::from(DEFAULT_CATEGORIES_PATH),
            timezone: DEFAULT_TIMEZONE.to_owned(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}
