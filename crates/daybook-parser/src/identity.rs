//! Content identity for raw ledger rows

use sha2::{Digest, Sha256};

/// Digest of the four raw fields, in order, as lowercase hex.
///
/// Fields are hashed exactly as read; `"0"` and `"0.00"` give different ids.
pub fn identity(raw_date: &str, raw_description: &str, raw_debit: &str, raw_credit: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_date.as_bytes());
    hasher.update(raw_description.as_bytes());
    hasher.update(raw_debit.as_bytes());
    hasher.update(raw_credit.as_bytes());
    format!("{:x}", hasher.finalize())
}
