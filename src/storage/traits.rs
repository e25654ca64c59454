//! Storage traits and error types
//!
//! This module defines the trait interface for collection stores and
//! associated error types.

use crate::model::Collection;
use crate::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid collection name: {0:?}")]
    InvalidName(String),

    #[error("Collection not found: {0}")]
    NotFound(String),

    #[error("Malformed record in {collection}, row {row}: {message}")]
    MalformedRecord {
        collection: String,
        row: usize,
        message: String,
    },

    #[error("Stored data violates product rules: {0}")]
    Validation(#[from] ValidationError),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A folder of collections, one file per collection
///
/// The file name is the collection name plus the store's extension, so a
/// collection saved under a name is loaded back under the same name.
pub trait CollectionStore {
    /// Writes a collection, replacing any existing one with the same name
    ///
    /// Returns the path written.
    fn save(&self, collection: &Collection) -> StorageResult<PathBuf>;

    /// Loads one collection by name
    ///
    /// Fails as a whole if any record is malformed.
    fn load(&self, name: &str) -> StorageResult<Collection>;

    /// Names of every stored collection, sorted
    fn list_names(&self) -> StorageResult<Vec<String>>;

    /// Removes a collection; returns false if it did not exist
    fn delete(&self, name: &str) -> StorageResult<bool>;

    /// Loads every stored collection, sorted by name
    fn load_all(&self) -> StorageResult<Vec<Collection>> {
        self.list_names()?
            .iter()
            .map(|name| self.load(name))
            .collect()
    }
}
