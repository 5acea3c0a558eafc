pub mod csv;
pub mod normalize;

pub use csv::{CsvError, CsvOptions, RawTable};
pub use normalize::{NormalizeError, Schema};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error(transparent)]
    Csv(#[from] crate::csv::CsvError),
    #[error(transparent)]
    Normalize(#[from] crate::normalize::NormalizeError),
}

pub mod import {
    use std::io::Read;
    use std::path::{Path, PathBuf};

    use tally_core::{CategoryMap, TransactionTable};

    use crate::csv::{read_table, read_table_from_path, CsvOptions};
    use crate::normalize::normalize;
    use crate::ImportError;

    pub fn import_statement<R: Read>(
        data: R,
        options: &CsvOptions,
        categories: &CategoryMap,
    ) -> Result<TransactionTable, ImportError> {
        let table = read_table(data, options)?;
        Ok(normalize(&table, categories)?)
    }

    pub fn import_file(
        path: &Path,
        options: &CsvOptions,
        categories: &CategoryMap,
    ) -> Result<TransactionTable, ImportError> {
        let table = read_table_from_path(path, options)?;
        Ok(normalize(&table, categories)?)
    }

    /// Imports each file independently; one bad file does not stop the rest.
    pub fn import_files<P: AsRef<Path>>(
        paths: &[P],
        options: &CsvOptions,
        categories: &CategoryMap,
    ) -> Vec<(PathBuf, Result<TransactionTable, ImportError>)> {
        paths
            .iter()
            .map(|p| {
                let path = p.as_ref();
                let result = import_file(path, options, categories);
                if let Err(e) = &result {
                    tracing::warn!(path = %path.display(), error = %e, "statement import failed");
                }
                (path.to_path_buf(), result)
            })
            .collect()
    }

}
