//! Core data models for the ledger

use chrono::{NaiveDate, NaiveDateTime};
use daybook_parser::{ParseError, RawRecord};
use serde::{Deserialize, Serialize};

/// Stored transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Content identity of the raw row (lowercase hex)
    pub id: String,
    /// Calendar day of the transaction
    pub date: NaiveDate,
    /// Free text, may be empty
    pub description: String,
    /// Expense amount, zero when the field was blank
    pub debit: f64,
    /// Income amount, zero when the field was blank
    pub credit: f64,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        date: NaiveDate,
        description: impl Into<String>,
        debit: f64,
        credit: f64,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            description: description.into(),
            debit,
            credit,
        }
    }

    /// Parse a raw row and key it by its content identity
    pub fn from_raw(raw: &RawRecord) -> Result<Self, ParseError> {
        let parsed = raw.parse()?;
        Ok(Self {
            id: raw.identity(),
            date: parsed.date,
            description: parsed.description,
            debit: parsed.debit,
            credit: parsed.credit,
        })
    }

    /// Net effect on the balance
    pub fn net(&self) -> f64 {
        self.credit - self.debit
    }
}

/// Tracking entry for an imported file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadRecord {
    pub filename: String,
    /// Local time of the import, whole seconds
    pub uploaded_at: NaiveDateTime,
    /// Rows read from the file
    pub num_rows: usize,
    /// File size in bytes
    pub file_size: u64,
}
