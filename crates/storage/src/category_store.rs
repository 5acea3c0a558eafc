use serde::Serialize;
use std::path::{Path, PathBuf};
use tally_core::{CategoryError, CategoryMap, CategoryStore};

use crate::error::StorageError;

/// Category map persisted as a flat JSON object of name → keywords.
#[derive(Debug, Clone)]
pub struct JsonCategoryStore {
    path: PathBuf,
}

impl JsonCategoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, categories: &CategoryMap) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, to_pretty_json(categories)?)?;
        Ok(())
    }
}

impl CategoryStore for JsonCategoryStore {
    fn load(&self) -> CategoryMap {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return CategoryMap::new(),
            Err(e) => {
                tracing::warn!(
                    "Category map {} unreadable, starting empty: {e}",
                    self.path.display()
                );
                return CategoryMap::new();
            }
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Category map {} is corrupt, starting empty: {e}", self.path.display());
            CategoryMap::new()
        })
    }

    fn save(&self, categories: &CategoryMap) -> Result<(), CategoryError> {
        self.write(categories).map_err(|e| CategoryError::Store(Box::new(e)))
    }
}

/// Pretty JSON with a four-space indent.
pub(crate) fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}
