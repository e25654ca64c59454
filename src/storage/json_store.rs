//! JSON collection store
//!
//! Each collection is one `<name>.json` file holding
//! `{"name": ..., "products": [{"productID": ..., ...}]}`.

use crate::model::{Collection, Product};
use crate::storage::folder::CollectionFolder;
use crate::storage::records::CollectionDocument;
use crate::storage::traits::{CollectionStore, StorageError, StorageResult};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Collection store backed by a folder of JSON files
#[derive(Debug, Clone)]
pub struct JsonStore {
    folder: CollectionFolder,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            folder: CollectionFolder::new(dir, "json"),
        }
    }

    pub fn dir(&self) -> &Path {
        self.folder.dir()
    }
}

impl CollectionStore for JsonStore {
    fn save(&self, collection: &Collection) -> StorageResult<PathBuf> {
        let path = self.folder.prepare_write(collection.name())?;
        let mut writer = BufWriter::new(File::create(&path)?);
        write_collection_json(&mut writer, collection)?;
        writer.flush()?;
        tracing::debug!(path = %path.display(), products = collection.len(), "collection written as JSON");
        Ok(path)
    }

    /// Loads `<name>.json`; the collection takes the file's name
    fn load(&self, name: &str) -> StorageResult<Collection> {
        let path = self.folder.existing(name)?;
        let mut collection = read_collection_json(BufReader::new(File::open(path)?))?;
        collection.set_name(name)?;
        Ok(collection)
    }

    fn list_names(&self) -> StorageResult<Vec<String>> {
        self.folder.list_names()
    }

    fn delete(&self, name: &str) -> StorageResult<bool> {
        self.folder.delete(name)
    }
}

/// Writes a collection as pretty-printed JSON
pub fn write_collection_json<W: Write>(writer: W, collection: &Collection) -> StorageResult<()> {
    serde_json::to_writer_pretty(writer, &CollectionDocument::from(collection))?;
    Ok(())
}

/// Reads a collection from JSON, validating every product
pub fn read_collection_json<R: Read>(reader: R) -> StorageResult<Collection> {
    let document: CollectionDocument = serde_json::from_reader(reader)?;
    let name = document.name;

    let products = document
        .products
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            record
                .into_product()
                .map_err(|e| StorageError::MalformedRecord {
                    collection: name.clone(),
                    row: index + 1,
                    message: e.to_string(),
                })
        })
        .collect::<StorageResult<Vec<Product>>>()?;

    Ok(Collection::new(name, products)?)
}
