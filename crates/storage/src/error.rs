use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid config: delimiter '{0}' is not a single-byte character")]
    InvalidDelimiter(char),
    #[error("No platform data directory available")]
    NoDataDir,
    #[error("Saved dataset not found: {0}")]
    NotFound(String),
    #[error("Invalid dataset name: '{0}'")]
    InvalidName(String),
    #[error(transparent)]
    Import(#[from] tally_import::ImportError),
}
