use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tally_import::CsvOptions;

use crate::error::StorageError;

/// Where the category map, manifest and saved statements live.
///
/// Every key is optional in the TOML file. Relative paths resolve under
/// `data_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub category_map_file: PathBuf,
    pub manifest_file: PathBuf,
    pub datasets_dir: PathBuf,
    pub delimiter: char,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            category_map_file: PathBuf::from("category_map.json"),
            manifest_file: PathBuf::from("saved_csvs.json"),
            datasets_dir: PathBuf::from("saved_csvs"),
            delimiter: ',',
        }
    }
}

impl StorageConfig {
    /// Defaults rooted at `data_dir`.
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Defaults rooted at the platform data directory.
    pub fn default_location() -> Result<Self, StorageError> {
        let project_dirs = directories::ProjectDirs::from("com", "tally", "Tally")
            .ok_or(StorageError::NoDataDir)?;
        Ok(Self::in_dir(project_dirs.data_dir()))
    }

    pub fn from_toml(content: &str) -> Result<Self, StorageError> {
        let config: Self = toml::from_str(content)?;
        config.delimiter_byte()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, StorageError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn category_map_path(&self) -> PathBuf {
        self.resolve(&self.category_map_file)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.resolve(&self.manifest_file)
    }

    pub fn datasets_path(&self) -> PathBuf {
        self.resolve(&self.datasets_dir)
    }

    pub fn csv_options(&self) -> Result<CsvOptions, StorageError> {
        Ok(CsvOptions {
            delimiter: self.delimiter_byte()?,
        })
    }

    fn delimiter_byte(&self) -> Result<u8, StorageError> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(StorageError::InvalidDelimiter(self.delimiter))
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }
}
