use crate::storage::traits::{StorageError, StorageResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Checks that a collection name can be used as a file stem
///
/// Names must be non-blank, must not start with a dot and must not contain
/// path separators or NUL.
pub fn validate_collection_name(name: &str) -> StorageResult<()> {
    let invalid = name.trim().is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\', '\0']);

    if invalid {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// A directory holding one file per collection with a fixed extension
#[derive(Debug, Clone)]
pub(crate) struct CollectionFolder {
    dir: PathBuf,
    extension: &'static str,
}

impl CollectionFolder {
    pub fn new(dir: impl Into<PathBuf>, extension: &'static str) -> Self {
        Self {
            dir: dir.into(),
            extension,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> StorageResult<PathBuf> {
        validate_collection_name(name)?;
        Ok(self.dir.join(format!("{}.{}", name, self.extension)))
    }

    /// Path for writing, creating the directory if needed
    pub fn prepare_write(&self, name: &str) -> StorageResult<PathBuf> {
        let path = self.path_for(name)?;
        fs::create_dir_all(&self.dir)?;
        Ok(path)
    }

    /// Path of an existing collection file
    pub fn existing(&self, name: &str) -> StorageResult<PathBuf> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(StorageError::NotFound(name.to_string()));
        }
        Ok(path)
    }

    pub fn list_names(&self) -> StorageResult<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(self.extension) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    pub fn delete(&self, name: &str) -> StorageResult<bool> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
