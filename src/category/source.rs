//! Sources of category definitions.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::Error;

/// Provides the raw, line-oriented category definitions.
///
/// Each line has the form `name,description,description,...`.
pub trait CategorySource {
    /// Read every definition line.
    ///
    /// # Errors
    /// Returns an [Error::CatalogLoadFailed] if the source cannot be read.
    fn read_lines(&self) -> Result<Vec<String>, Error>;
}

/// Reads category definitions from a text file, one category per line.
#[derive(Debug, Clone)]
pub struct FileCategorySource {
    path: PathBuf,
}

impl FileCategorySource {
    /// Create a source for the file at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The path of the definition file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CategorySource for FileCategorySource {
    fn read_lines(&self) -> Result<Vec<String>, Error> {
        let text = fs::read_to_string(&self.path).map_err(|error| {
            Error::CatalogLoadFailed(format!("could not read {:?}: {error}", self.path))
        })?;

        Ok(text.lines().map(str::to_owned).collect())
    }
}

impl<T: AsRef<str>> CategorySource for [T] {
    fn read_lines(&self) -> Result<Vec<String>, Error> {
        Ok(self.iter().map(|line| line.as_ref().to_owned()).collect())
    }
}
