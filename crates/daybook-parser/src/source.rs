//! Delimited record sources

use async_trait::async_trait;
use std::path::Path;

use crate::error::ParseError;
use crate::record::RawRecord;

/// Reader options for delimited input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub has_headers: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_headers: false,
        }
    }
}

/// Trait for sources of raw ledger rows
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Split delimited text into raw rows
    fn parse_records(&self, content: &str) -> Result<Vec<RawRecord>, ParseError>;

    /// Read and split a file
    async fn read_records(&self, path: &Path) -> Result<Vec<RawRecord>, ParseError>;
}

/// CSV source backed by the `csv` crate
#[derive(Debug, Default, Clone)]
pub struct CsvRecordSource {
    options: CsvOptions,
}

impl CsvRecordSource {
    pub fn new(options: CsvOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> CsvOptions {
        self.options
    }
}

/// Reject files that do not carry a `.csv` name
pub fn ensure_csv_path(path: &Path) -> Result<(), ParseError> {
    let is_csv = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if is_csv {
        Ok(())
    } else {
        Err(ParseError::UnsupportedFile {
            path: path.to_string_lossy().to_string(),
        })
    }
}

#[async_trait]
impl RecordSource for CsvRecordSource {
    fn parse_records(&self, content: &str) -> Result<Vec<RawRecord>, ParseError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            .has_headers(self.options.has_headers)
            .flexible(true)
            .from_reader(content.as_bytes());

        let first_row = if self.options.has_headers { 2 } else { 1 };
        let mut records = Vec::new();
        for (index, result) in rdr.records().enumerate() {
            let record = result?;
            let row = record
                .position()
                .map(|pos| pos.line() as usize)
                .unwrap_or(first_row + index);
            records.push(RawRecord::from_fields(row, record.iter())?);
        }

        log::debug!("Read {} raw records", records.len());
        Ok(records)
    }

    async fn read_records(&self, path: &Path) -> Result<Vec<RawRecord>, ParseError> {
        ensure_csv_path(path)?;
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ParseError::ReadFailed {
                path: path.to_string_lossy().to_string(),
                source,
            })?;
        self.parse_records(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_records_keeps_raw_fields() {
        let source = CsvRecordSource::default();
        let records = source
            .parse_records("2024-01-01,Salary,,100\n2024-01-03,\"Rent, March\",50.00,\n")
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0], RawRecord::new(1, "2024-01-01", "Salary", "", "100"));
        assert_eq!(records[1].description, "Rent, March");
        assert_eq!(records[1].debit, "50.00");
        assert_eq!(records[1].row, 2);
    }

    #[test]
    fn test_header_row_skipped() {
        let source = CsvRecordSource::new(CsvOptions {
            delimiter: b';',
            has_headers: true,
        });
        let records = source
            .parse_records("date;description;debit;credit\n2024-02-01;Gift;;10\n")
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].row, 2);
        assert_eq!(records[0].credit, "10");
    }

    #[test]
    fn test_wrong_field_count_fails() {
        let source = CsvRecordSource::default();
        let err = source
            .parse_records("2024-01-01,A,,1\n2024-01-02,B,1\n")
            .unwrap_err();
        assert!(matches!(err, ParseError::FieldCount { row: 2, found: 3, .. }));
    }

    #[test]
    fn test_ensure_csv_path() {
        assert!(ensure_csv_path(Path::new("bank.csv")).is_ok());
        assert!(ensure_csv_path(Path::new("BANK.CSV")).is_ok());
        assert!(matches!(
            ensure_csv_path(Path::new("bank.xlsx")),
            Err(ParseError::UnsupportedFile { .. })
        ));
        assert!(ensure_csv_path(Path::new("bank")).is_err());
    }

    #[tokio::test]
    async fn test_read_records_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statement.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "2024-01-01,A,0,100").unwrap();
        writeln!(file, "2024-01-03,B,50,0").unwrap();

        let records = CsvRecordSource::default().read_records(&path).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].date, "2024-01-03");
    }

    #[tokio::test]
    async fn test_read_records_rejects_other_extensions() {
        let err = CsvRecordSource::default()
            .read_records(Path::new("notes.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedFile { .. }));
    }

    #[tokio::test]
    async fn test_missing_file_error_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.csv");

        let err = CsvRecordSource::default().read_records(&path).await.unwrap_err();
        match &err {
            ParseError::ReadFailed { path: p, source } => {
                assert!(p.ends_with("missing.csv"));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().contains("missing.csv"));
    }
}
