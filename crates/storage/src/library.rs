//! Saved statements and their exclusions.
//!
//! The manifest is a JSON object keyed by dataset name. Each saved statement
//! is copied into the datasets directory so later edits to the source file
//! do not change what was saved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tally_core::{CategoryMap, Dataset, ExclusionSet};
use tally_import::import::import_file;
use tally_import::CsvOptions;

use crate::category_store::to_pretty_json;
use crate::config::StorageConfig;
use crate::error::StorageError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedDataset {
    pub file_path: PathBuf,
    #[serde(default)]
    pub excluded_transactions: ExclusionSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

/// Older manifests stored only the file path.
#[derive(Deserialize)]
#[serde(untagged)]
enum ManifestEntry {
    Saved(SavedDataset),
    Legacy(PathBuf),
}

impl From<ManifestEntry> for SavedDataset {
    fn from(entry: ManifestEntry) -> Self {
        match entry {
            ManifestEntry::Saved(saved) => saved,
            ManifestEntry::Legacy(file_path) => SavedDataset {
                file_path,
                excluded_transactions: ExclusionSet::new(),
                saved_at: None,
            },
        }
    }
}

type Manifest = BTreeMap<String, SavedDataset>;

#[derive(Debug, Clone)]
pub struct DatasetLibrary {
    manifest_path: PathBuf,
    datasets_dir: PathBuf,
    options: CsvOptions,
}

impl DatasetLibrary {
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        Ok(Self::with_paths(
            config.manifest_path(),
            config.datasets_path(),
            config.csv_options()?,
        ))
    }

    pub fn with_paths(
        manifest_path: impl Into<PathBuf>,
        datasets_dir: impl Into<PathBuf>,
        options: CsvOptions,
    ) -> Self {
        Self {
            manifest_path: manifest_path.into(),
            datasets_dir: datasets_dir.into(),
            options,
        }
    }

    /// Copies `source` into the datasets directory as `<name>.csv` and
    /// records it with `exclusions`. An existing entry of the same name is
    /// replaced.
    pub fn save(
        &self,
        name: &str,
        source: &Path,
        exclusions: &ExclusionSet,
    ) -> Result<SavedDataset, StorageError> {
        validate_name(name)?;
        let mut manifest = self.load_manifest()?;
        std::fs::create_dir_all(&self.datasets_dir)?;
        let file_path = self.datasets_dir.join(format!("{name}.csv"));
        if source != file_path {
            std::fs::copy(source, &file_path)?;
        }

        let saved = SavedDataset {
            file_path,
            excluded_transactions: exclusions.clone(),
            saved_at: Some(Utc::now()),
        };
        manifest.insert(name.to_string(), saved.clone());
        self.write_manifest(&manifest)?;

        tracing::info!(
            "Saved dataset '{name}' ({} exclusions) to {}",
            exclusions.len(),
            saved.file_path.display()
        );
        Ok(saved)
    }

    pub fn update_exclusions(
        &self,
        name: &str,
        exclusions: &ExclusionSet,
    ) -> Result<(), StorageError> {
        let mut manifest = self.load_manifest()?;
        let entry = manifest
            .get_mut(name)
            .ok_or_else(|| StorageError::NotFound(name.to_string()))?;
        entry.excluded_transactions = exclusions.clone();
        self.write_manifest(&manifest)?;
        tracing::debug!("Updated exclusions for '{name}' ({} keys)", exclusions.len());
        Ok(())
    }

    /// Saved names, sorted.
    pub fn list(&self) -> Vec<String> {
        self.read_manifest().into_keys().collect()
    }

    pub fn get(&self, name: &str) -> Option<SavedDataset> {
        self.read_manifest().remove(name)
    }

    pub fn exclusions(&self, name: &str) -> Result<ExclusionSet, StorageError> {
        self.get(name)
            .map(|saved| saved.excluded_transactions)
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    /// Re-imports the saved statement and restores its exclusions.
    pub fn open(&self, name: &str, categories: &CategoryMap) -> Result<Dataset, StorageError> {
        let saved = self
            .get(name)
            .ok_or_else(|| StorageError::NotFound(name.to_string()))?;
        let table = import_file(&saved.file_path, &self.options, categories)?;
        Ok(Dataset::with_exclusions(name, table, saved.excluded_transactions))
    }

    /// Removes the entry and its copied statement.
    pub fn delete(&self, name: &str) -> Result<(), StorageError> {
        let mut manifest = self.load_manifest()?;
        let saved = manifest
            .remove(name)
            .ok_or_else(|| StorageError::NotFound(name.to_string()))?;

        match std::fs::remove_file(&saved.file_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    "Saved file for '{name}' already gone: {}",
                    saved.file_path.display()
                );
            }
            Err(e) => return Err(e.into()),
        }
        self.write_manifest(&manifest)?;
        tracing::info!("Deleted dataset '{name}'");
        Ok(())
    }

    /// Manifest for read-only queries. Unreadable or corrupt manifests read
    /// as empty.
    fn read_manifest(&self) -> Manifest {
        self.load_manifest().unwrap_or_else(|e| {
            tracing::warn!(
                "Manifest {} unusable, treating as empty: {e}",
                self.manifest_path.display()
            );
            Manifest::new()
        })
    }

    /// Manifest for writes. Only a missing file reads as empty, so a manifest
    /// that fails to parse is never overwritten.
    fn load_manifest(&self) -> Result<Manifest, StorageError> {
        let content = match std::fs::read_to_string(&self.manifest_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Manifest::new()),
            Err(e) => return Err(e.into()),
        };
        let entries: BTreeMap<String, ManifestEntry> = serde_json::from_str(&content)?;
        Ok(entries.into_iter().map(|(k, v)| (k, v.into())).collect())
    }

    fn write_manifest(&self, manifest: &Manifest) -> Result<(), StorageError> {
        if let Some(parent) = self.manifest_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.manifest_path, to_pretty_json(manifest)?)?;
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), StorageError> {
    let invalid = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\']);
    if invalid {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(())
}
