//! Core ledger processing and business logic
//!
//! Raw rows are keyed by content identity, stored once, and resampled into
//! a gap-free daily statement on every read.

pub mod error;
pub mod models;
pub mod reports;
pub mod resample;
pub mod store;

use chrono::{Local, Timelike};
use daybook_config::Config;
use daybook_parser::{CsvOptions, CsvRecordSource, RawRecord, SourceRef};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

pub use error::{
    CoreError, CoreResult, DefaultErrorLogger, ErrorCode, ErrorContext, ErrorDetails, ErrorLogger,
    ErrorSeverity,
};
pub use models::{Transaction, UploadRecord};
pub use reports::{BudgetStatement, DailyBucket, StatementResponse, StatementSeries, StatementSummary};
pub use resample::{date_range, resample};
pub use store::{InsertMode, InsertReport, LedgerStore, SqliteStore};

/// Outcome of importing one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub filename: String,
    /// Rows read from the file
    pub rows: usize,
    pub inserted: usize,
    pub skipped: usize,
    pub file_size: u64,
}

/// Ledger over a caller-owned store
pub struct Ledger<S: LedgerStore> {
    config: Config,
    source: SourceRef,
    store: S,
}

impl<S: LedgerStore> Ledger<S> {
    /// Create a ledger with an explicit record source
    pub fn new(config: Config, source: SourceRef, store: S) -> Self {
        Self {
            config,
            source,
            store,
        }
    }

    /// Create a ledger reading CSV with the configured options
    pub fn from_config(config: Config, store: S) -> Self {
        let source = CsvRecordSource::new(CsvOptions {
            delimiter: config.ingest.delimiter_byte(),
            has_headers: config.ingest.has_headers,
        });
        Self::new(config, Arc::new(source), store)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Insert mode selected by the configuration
    pub fn default_insert_mode(&self) -> InsertMode {
        self.config.ingest.on_duplicate.into()
    }

    /// Read raw rows without storing anything
    pub async fn preview(&self, path: &Path) -> CoreResult<Vec<RawRecord>> {
        Ok(self.source.read_records(path).await?)
    }

    /// Import a file: every row must parse before anything is stored
    pub async fn import_file(&self, path: &Path, mode: InsertMode) -> CoreResult<ImportReport> {
        log::info!("Importing {} ({:?})", path.display(), mode);

        let records = self.source.read_records(path).await?;
        let file_size = std::fs::metadata(path)
            .map_err(|e| CoreError::IoError {
                message: format!("{}: {}", path.display(), e),
            })?
            .len();
        let report = self.import_records(&records, mode)?;

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        let uploaded_at = Local::now().naive_local();
        self.store.record_upload(&UploadRecord {
            filename: filename.clone(),
            uploaded_at: uploaded_at.with_nanosecond(0).unwrap_or(uploaded_at),
            num_rows: records.len(),
            file_size,
        })?;

        log::info!(
            "Imported {}: {} rows, {} inserted, {} skipped",
            filename,
            records.len(),
            report.inserted,
            report.skipped
        );

        Ok(ImportReport {
            filename,
            rows: records.len(),
            inserted: report.inserted,
            skipped: report.skipped,
            file_size,
        })
    }

    /// Parse and store rows already read by the caller
    pub fn import_records(&self, records: &[RawRecord], mode: InsertMode) -> CoreResult<InsertReport> {
        let transactions = records
            .iter()
            .map(|raw| {
                Transaction::from_raw(raw).map_err(|e| {
                    log::debug!("Rejecting row {}: {:?}", raw.row, raw);
                    CoreError::from(e)
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        self.store.bulk_insert(&transactions, mode)
    }

    /// Recompute the daily statement from every stored transaction
    pub fn statement(&self) -> CoreResult<BudgetStatement> {
        let transactions = self.store.scan_all()?;
        Ok(resample(&transactions))
    }

    /// Look up one transaction
    pub fn transaction(&self, id: &str) -> CoreResult<Transaction> {
        self.store
            .find(id)?
            .ok_or_else(|| CoreError::TransactionNotFound { id: id.to_string() })
    }

    pub fn upload_history(&self) -> CoreResult<Vec<UploadRecord>> {
        self.store.upload_history()
    }

    /// Release the store
    pub fn close(self) -> CoreResult<()> {
        self.store.close()
    }
}
