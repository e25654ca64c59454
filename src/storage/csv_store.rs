//! CSV collection store
//!
//! Each collection is one `<name>.csv` file with the header
//! `productID,name,price,url,rating,description,reviews`. The reviews cell
//! holds a JSON array of strings.

use crate::model::{Collection, Product};
use crate::storage::folder::CollectionFolder;
use crate::storage::records::{CsvRow, CSV_HEADER};
use crate::storage::traits::{CollectionStore, StorageError, StorageResult};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Collection store backed by a folder of CSV files
#[derive(Debug, Clone)]
pub struct CsvStore {
    folder: CollectionFolder,
}

impl CsvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            folder: CollectionFolder::new(dir, "csv"),
        }
    }

    pub fn dir(&self) -> &Path {
        self.folder.dir()
    }
}

impl CollectionStore for CsvStore {
    fn save(&self, collection: &Collection) -> StorageResult<PathBuf> {
        let path = self.folder.prepare_write(collection.name())?;
        write_collection_csv(File::create(&path)?, collection)?;
        tracing::debug!(path = %path.display(), products = collection.len(), "collection written as CSV");
        Ok(path)
    }

    fn load(&self, name: &str) -> StorageResult<Collection> {
        let path = self.folder.existing(name)?;
        read_collection_csv(name, File::open(path)?)
    }

    fn list_names(&self) -> StorageResult<Vec<String>> {
        self.folder.list_names()
    }

    fn delete(&self, name: &str) -> StorageResult<bool> {
        self.folder.delete(name)
    }
}

/// Writes a collection as CSV, header first
pub fn write_collection_csv<W: Write>(writer: W, collection: &Collection) -> StorageResult<()> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv.write_record(CSV_HEADER)?;
    for product in collection.products() {
        csv.serialize(CsvRow::from_product(product)?)?;
    }
    csv.flush()?;
    Ok(())
}

/// Reads a collection from CSV
///
/// Any malformed row, unparseable reviews cell or invalid product fails the
/// whole read.
pub fn read_collection_csv<R: Read>(name: &str, reader: R) -> StorageResult<Collection> {
    let mut csv = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

    let mut products: Vec<Product> = Vec::new();
    for (index, row) in csv.deserialize::<CsvRow>().enumerate() {
        let row_number = index + 1;
        let malformed = |message: String| StorageError::MalformedRecord {
            collection: name.to_string(),
            row: row_number,
            message,
        };

        let record = row
            .map_err(|e| malformed(e.to_string()))?
            .into_record()
            .map_err(|e| malformed(format!("reviews cell is not a JSON list: {}", e)))?;
        products.push(record.into_product().map_err(|e| malformed(e.to_string()))?);
    }

    Ok(Collection::new(name, products)?)
}

/// Renders a collection as a CSV string
pub fn collection_to_csv_string(collection: &Collection) -> StorageResult<String> {
    let mut buffer = Vec::new();
    write_collection_csv(&mut buffer, collection)?;
    String::from_utf8(buffer).map_err(|e| {
        StorageError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}
