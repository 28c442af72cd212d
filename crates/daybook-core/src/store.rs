//! Durable transaction storage

use chrono::NaiveDate;
use daybook_parser::DATE_FORMAT;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::{CoreError, CoreResult};
use crate::models::{Transaction, UploadRecord};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS transactions (
        unique_id TEXT NOT NULL PRIMARY KEY,
        date TEXT NOT NULL,
        description TEXT,
        debit REAL,
        credit REAL
    );
    CREATE TABLE IF NOT EXISTS uploaded_files (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        filename TEXT NOT NULL,
        date_uploaded TEXT NOT NULL,
        num_rows INTEGER NOT NULL,
        file_size INTEGER NOT NULL
    );
"#;

/// How a batch treats rows whose identity is already stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertMode {
    /// First duplicate rolls back the whole batch
    #[default]
    Abort,
    /// Duplicates are counted and left out, the rest commit together
    SkipDuplicates,
}

impl From<daybook_config::DuplicatePolicy> for InsertMode {
    fn from(policy: daybook_config::DuplicatePolicy) -> Self {
        match policy {
            daybook_config::DuplicatePolicy::Abort => InsertMode::Abort,
            daybook_config::DuplicatePolicy::Skip => InsertMode::SkipDuplicates,
        }
    }
}

/// Outcome of a committed batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertReport {
    pub inserted: usize,
    pub skipped: usize,
}

/// Keyed transaction storage
///
/// Inserts never update a stored row. Scans return rows in no particular order.
pub trait LedgerStore: Send + Sync {
    /// Insert a batch as one unit
    fn bulk_insert(&self, records: &[Transaction], mode: InsertMode) -> CoreResult<InsertReport>;

    /// Every stored transaction
    fn scan_all(&self) -> CoreResult<Vec<Transaction>>;

    /// Look up one transaction by identity
    fn find(&self, id: &str) -> CoreResult<Option<Transaction>>;

    /// Number of stored transactions
    fn count(&self) -> CoreResult<usize>;

    /// Track an imported file
    fn record_upload(&self, upload: &UploadRecord) -> CoreResult<()>;

    /// Imported files, newest first
    fn upload_history(&self) -> CoreResult<Vec<UploadRecord>>;

    /// Release the underlying resource
    fn close(self) -> CoreResult<()>
    where
        Self: Sized;
}

/// SQLite-backed store
pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (or create) a database file and ensure the schema exists
    pub fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::StoreUnavailable {
                message: format!("cannot create {}: {}", parent.display(), e),
            })?;
        }

        let conn = Connection::open(path)?;
        log::debug!("Opened ledger database {}", path.display());
        Self::with_connection(conn, Some(path.to_path_buf()))
    }

    /// Private in-memory database
    pub fn open_in_memory() -> CoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?, None)
    }

    /// Delete the database file and start from an empty schema
    pub fn rebuild(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        match std::fs::remove_file(path) {
            Ok(()) => log::info!("Removed existing database {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(CoreError::StoreUnavailable {
                    message: format!("cannot remove {}: {}", path.display(), e),
                })
            }
        }
        Self::open(path)
    }

    fn with_connection(conn: Connection, path: Option<PathBuf>) -> CoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Database file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> CoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| CoreError::StoreUnavailable {
            message: "connection lock poisoned".to_string(),
        })
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<StoredRow> {
        Ok(StoredRow {
            id: row.get(0)?,
            date: row.get_ref(1)?.as_str().ok().map(str::to_owned),
            description: row.get(2)?,
            debit: row.get(3)?,
            credit: row.get(4)?,
        })
    }
}

/// Transaction row as read, before the date is decoded
struct StoredRow {
    id: String,
    date: Option<String>,
    description: Option<String>,
    debit: Option<f64>,
    credit: Option<f64>,
}

impl StoredRow {
    fn into_transaction(self) -> CoreResult<Transaction> {
        let date = self
            .date
            .as_deref()
            .and_then(|text| NaiveDate::parse_from_str(text, DATE_FORMAT).ok());
        let Some(date) = date else {
            return Err(CoreError::StoreUnavailable {
                message: format!("unreadable date {:?} for transaction {}", self.date, self.id),
            });
        };

        Ok(Transaction {
            id: self.id,
            date,
            description: self.description.unwrap_or_default(),
            debit: self.debit.unwrap_or(0.0),
            credit: self.credit.unwrap_or(0.0),
        })
    }
}

fn is_constraint_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(err, _) if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

impl LedgerStore for SqliteStore {
    fn bulk_insert(&self, records: &[Transaction], mode: InsertMode) -> CoreResult<InsertReport> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut report = InsertReport::default();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO transactions (unique_id, date, description, debit, credit)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;

            for record in records {
                let result = stmt.execute(params![
                    record.id,
                    record.date,
                    record.description,
                    record.debit,
                    record.credit,
                ]);

                match result {
                    Ok(_) => report.inserted += 1,
                    Err(e) if is_constraint_violation(&e) => match mode {
                        InsertMode::Abort => {
                            log::warn!(
                                "Duplicate transaction {} on {}, rolling back batch of {}",
                                record.id,
                                record.date,
                                records.len()
                            );
                            return Err(CoreError::Conflict {
                                id: record.id.clone(),
                            });
                        }
                        InsertMode::SkipDuplicates => {
                            log::debug!("Skipping duplicate transaction {}", record.id);
                            report.skipped += 1;
                        }
                    },
                    Err(e) => return Err(e.into()),
                }
            }
        }

        tx.commit()?;
        log::info!(
            "Committed batch: {} inserted, {} skipped",
            report.inserted,
            report.skipped
        );
        Ok(report)
    }

    fn scan_all(&self) -> CoreResult<Vec<Transaction>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT unique_id, date, description, debit, credit FROM transactions")?;
        let rows = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(StoredRow::into_transaction).collect()
    }

    fn find(&self, id: &str) -> CoreResult<Option<Transaction>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT unique_id, date, description, debit, credit
                 FROM transactions WHERE unique_id = ?1",
                params![id],
                Self::map_row,
            )
            .optional()?;
        row.map(StoredRow::into_transaction).transpose()
    }

    fn count(&self) -> CoreResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn record_upload(&self, upload: &UploadRecord) -> CoreResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO uploaded_files (filename, date_uploaded, num_rows, file_size)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                upload.filename,
                upload.uploaded_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                upload.num_rows as i64,
                upload.file_size as i64,
            ],
        )?;
        Ok(())
    }

    fn upload_history(&self) -> CoreResult<Vec<UploadRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT filename, date_uploaded, num_rows, file_size
             FROM uploaded_files ORDER BY date_uploaded DESC, id DESC",
        )?;
        let uploads = stmt
            .query_map([], |row| {
                Ok(UploadRecord {
                    filename: row.get(0)?,
                    uploaded_at: row.get(1)?,
                    num_rows: row.get::<_, i64>(2)? as usize,
                    file_size: row.get::<_, i64>(3)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(uploads)
    }

    fn close(self) -> CoreResult<()> {
        let conn = self.conn.into_inner().map_err(|_| CoreError::StoreUnavailable {
            message: "connection lock poisoned".to_string(),
        })?;
        conn.close().map_err(|(_, e)| CoreError::from(e))
    }
}
