//! Storage module for persisting collections
//!
//! This module handles reading and writing harvested collections, including:
//! - One CSV file per collection in the configured CSV folder
//! - One JSON file per collection in the configured JSON folder
//! - Listing, loading and deleting stored collections

mod csv_store;
mod folder;
mod json_store;
mod records;
mod traits;

pub use csv_store::{collection_to_csv_string, read_collection_csv, write_collection_csv, CsvStore};
pub use folder::validate_collection_name;
pub use json_store::{read_collection_json, write_collection_json, JsonStore};
pub use records::{CollectionDocument, CsvRow, ProductRecord, CSV_HEADER};
pub use traits::{CollectionStore, StorageError, StorageResult};

use crate::config::OutputConfig;
use crate::model::Collection;
use std::path::PathBuf;

/// Both collection stores of an output configuration
#[derive(Debug, Clone)]
pub struct CollectionStores {
    pub csv: CsvStore,
    pub json: JsonStore,
}

impl CollectionStores {
    /// Opens the stores named in the output configuration
    ///
    /// Folders are created lazily on first save.
    pub fn open(config: &OutputConfig) -> Self {
        Self {
            csv: CsvStore::new(&config.csv_dir),
            json: JsonStore::new(&config.json_dir),
        }
    }

    /// Writes a collection in both formats
    ///
    /// # Returns
    ///
    /// The CSV path and the JSON path, in that order
    pub fn save(&self, collection: &Collection) -> StorageResult<(PathBuf, PathBuf)> {
        let csv = self.csv.save(collection)?;
        let json = self.json.save(collection)?;
        tracing::info!(
            name = collection.name(),
            products = collection.len(),
            "collection saved"
        );
        Ok((csv, json))
    }

    /// Loads a collection, preferring the JSON copy
    pub fn load(&self, name: &str) -> StorageResult<Collection> {
        match self.json.load(name) {
            Err(StorageError::NotFound(_)) => self.csv.load(name),
            other => other,
        }
    }

    /// Sorted, de-duplicated names across both folders
    pub fn list_names(&self) -> StorageResult<Vec<String>> {
        let mut names = self.csv.list_names()?;
        names.extend(self.json.list_names()?);
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Deletes a collection from both folders
    ///
    /// Returns false when neither folder held it.
    pub fn delete(&self, name: &str) -> StorageResult<bool> {
        let csv = self.csv.delete(name)?;
        let json = self.json.delete(name)?;
        if csv || json {
            tracing::info!(name, "collection deleted");
        }
        Ok(csv || json)
    }
}
