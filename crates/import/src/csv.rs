use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Malformed input: {0}")]
    Malformed(#[from] csv::Error),
    #[error("Malformed input: no header row")]
    MissingHeader,
}

#[derive(Debug, Clone)]
pub struct CsvOptions {
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// A header row plus data rows, cells kept as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Header names are trimmed and stripped of a leading byte-order mark.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let headers = headers
            .into_iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Cell text; short rows read as missing trailing cells.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }
}

pub fn read_table<R: Read>(data: R, options: &CsvOptions) -> Result<RawTable, CsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(options.delimiter)
        .from_reader(data);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(CsvError::MissingHeader);
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable::new(headers, rows))
}

pub fn read_table_from_path(path: &Path, options: &CsvOptions) -> Result<RawTable, CsvError> {
    let file = File::open(path)?;
    read_table(file, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_headers_and_rows() {
        let data = b"Started Date,Description,Amount,Balance\n2024-03-01,Tesco,-45.00,120.00\n";
        let table = read_table(data.as_ref(), &CsvOptions::default()).unwrap();
        assert_eq!(table.headers(), ["Started Date", "Description", "Amount", "Balance"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.cell(0, 2), Some("-45.00"));
        assert_eq!(table.column("Balance"), Some(3));
    }

    #[test]
    fn strips_bom_and_header_whitespace() {
        let data = "\u{feff} Date ,Details\n01/03/2024,Rent\n";
        let table = read_table(data.as_bytes(), &CsvOptions::default()).unwrap();
        assert!(table.has_column("Date"));
        assert!(table.has_column("Details"));
    }

    #[test]
    fn ragged_rows_and_blank_lines() {
        let data = b"Date,Details,Debit,Credit\n01/03/2024,Rent\n,,,\n02/03/2024,Pay,,100\n";
        let table = read_table(data.as_ref(), &CsvOptions::default()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, 2), None);
        assert_eq!(table.cell(1, 3), Some("100"));
    }

    #[test]
    fn custom_delimiter() {
        let data = b"Amount;Description\n-1.50;Coffee\n";
        let options = CsvOptions { delimiter: b';' };
        let table = read_table(data.as_ref(), &options).unwrap();
        assert_eq!(table.cell(0, 1), Some("Coffee"));
    }

    #[test]
    fn empty_input_has_no_header() {
        let result = read_table(b"".as_ref(), &CsvOptions::default());
        assert!(matches!(result, Err(CsvError::MissingHeader)));
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        let data: &[u8] = b"Amount,Description\n-1.00,\xff\xfe\n";
        let result = read_table(data, &CsvOptions::default());
        assert!(matches!(result, Err(CsvError::Malformed(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = read_table_from_path(
            Path::new("/nonexistent/statement.csv"),
            &CsvOptions::default(),
        );
        assert!(matches!(result, Err(CsvError::IoError(_))));
    }
}
