pub mod category_store;
pub mod config;
pub mod error;
pub mod library;

pub use category_store::JsonCategoryStore;
pub use config::StorageConfig;
pub use error::StorageError;
pub use library::{DatasetLibrary, SavedDataset};
