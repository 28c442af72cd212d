//! Ledger row parsing for daybook
//!
//! Turns delimited rows of `date, description, debit, credit` into typed
//! values and derives the content identity used as the storage key.

use std::sync::Arc;

pub mod error;
pub mod identity;
pub mod record;
pub mod source;

pub use error::ParseError;
pub use identity::identity;
pub use record::{parse_amount, parse_date, ParsedRecord, RawRecord, DATE_FORMAT, FIELD_COUNT};
pub use source::{ensure_csv_path, CsvOptions, CsvRecordSource, RecordSource};

/// Record source reference type
pub type SourceRef = Arc<dyn RecordSource>;
