//! The catalog of expense categories.

use std::collections::HashMap;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::{
    Error,
    category::{Category, CategoryName, CategorySource},
};

/// The set of expense categories and their description tags.
///
/// Categories are kept in the order they were first defined and can be looked
/// up by name in constant time. The catalog is immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    categories: Vec<Category>,
    index: HashMap<CategoryName, usize>,
}

impl Catalog {
    /// Load the catalog from `source`, falling back to an empty catalog.
    ///
    /// A source that cannot be read is not fatal: the failure is logged and an
    /// empty catalog is returned so the application can keep running. Use
    /// [Catalog::try_load] to handle the error yourself.
    pub fn load<S: CategorySource + ?Sized>(source: &S) -> Self {
        match Self::try_load(source) {
            Ok(catalog) => catalog,
            Err(error) => {
                tracing::warn!("Continuing with an empty category catalog: {error}");
                Self::default()
            }
        }
    }

    /// Load the catalog from `source`.
    ///
    /// # Errors
    /// Returns an [Error::CatalogLoadFailed] if the source cannot be read.
    pub fn try_load<S: CategorySource + ?Sized>(source: &S) -> Result<Self, Error> {
        let lines = source.read_lines()?;
        let catalog = Self::from_lines(&lines);

        tracing::info!("Loaded {} categories", catalog.len());

        Ok(catalog)
    }

    /// Build a catalog from definition lines of the form `name,description,...`.
    ///
    /// Fields are trimmed. Blank lines, lines with an empty name and empty
    /// description fields are skipped. A name that was already seen appends
    /// its descriptions to the existing category.
    pub fn from_lines<T: AsRef<str>>(lines: &[T]) -> Self {
        let mut catalog = Self::default();

        for (line_number, line) in lines.iter().enumerate() {
            let line = line.as_ref();

            if line.trim().is_empty() {
                continue;
            }

            let record = match parse_line(line) {
                Some(record) => record,
                None => {
                    tracing::warn!(
                        "Skipping malformed category definition on line {}",
                        line_number + 1
                    );
                    continue;
                }
            };

            let mut fields = record.iter();
            let name = match fields.next().map(CategoryName::new) {
                Some(Ok(name)) => name,
                _ => {
                    tracing::warn!(
                        "Skipping category definition with no name on line {}",
                        line_number + 1
                    );
                    continue;
                }
            };

            let category = catalog.entry(name);
            fields
                .filter(|description| !description.is_empty())
                .for_each(|description| category.add_description(description.to_owned()));
        }

        catalog
    }

    /// Get the category called `name`.
    pub fn find_by_name(&self, name: &str) -> Option<&Category> {
        self.index
            .get(name.trim())
            .map(|&position| &self.categories[position])
    }

    /// The description tags for the category called `name`.
    ///
    /// Returns an empty slice if there is no such category.
    pub fn descriptions_for(&self, name: &str) -> &[String] {
        self.find_by_name(name)
            .map(Category::descriptions)
            .unwrap_or_default()
    }

    /// Whether `description` is one of the description tags of the category `name`.
    pub fn has_description(&self, name: &str, description: &str) -> bool {
        self.descriptions_for(name)
            .iter()
            .any(|known| known == description)
    }

    /// Iterate over the categories in the order they were first defined.
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    /// The number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether the catalog has no categories.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    fn entry(&mut self, name: CategoryName) -> &mut Category {
        let position = match self.index.get(&name) {
            Some(&position) => position,
            None => {
                self.categories.push(Category::new(name.clone()));
                let position = self.categories.len() - 1;
                self.index.insert(name, position);
                position
            }
        };

        &mut self.categories[position]
    }
}

fn parse_line(line: &str) -> Option<StringRecord> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(line.as_bytes())
        .records()
        .next()?
        .ok()
}
