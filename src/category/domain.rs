//! Core category domain types.

use std::{borrow::Borrow, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// A validated, non-empty category name.
///
/// Expenses refer to their category by name, the name is resolved against the
/// [Catalog](crate::category::Catalog) when the full category is needed.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name from `name` with surrounding whitespace removed.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is
    /// empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-empty invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CategoryName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An expense category (e.g., 'Food', 'Transport') and the description tags
/// that may be picked for expenses in that category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    name: CategoryName,
    descriptions: Vec<String>,
}

impl Category {
    /// Create a category with no descriptions.
    pub fn new(name: CategoryName) -> Self {
        Self {
            name,
            descriptions: Vec::new(),
        }
    }

    /// The unique name of the category.
    pub fn name(&self) -> &CategoryName {
        &self.name
    }

    /// The description tags in the order they were defined.
    pub fn descriptions(&self) -> &[String] {
        &self.descriptions
    }

    pub(super) fn add_description(&mut self, description: String) {
        self.descriptions.push(description);
    }
}

#[cfg(test)]
mod category_name_tests {
    use crate::{Error, category::CategoryName};

    #[test]
    fn new_fails_on_empty_string() {
        let name = CategoryName::new("");

        assert_eq!(name, Err(Error::EmptyCategoryName));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        let name = CategoryName::new("\n\t \r");

        assert_eq!(name, Err(Error::EmptyCategoryName));
    }

    #[test]
    fn new_trims_whitespace() {
        let name = CategoryName::new("  Food ").unwrap();

        assert_eq!(name.as_ref(), "Food");
    }

    #[test]
    fn new_succeeds_on_non_empty_string() {
        let name = CategoryName::new("🔥");

        assert!(name.is_ok())
    }
}
