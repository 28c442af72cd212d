//! Raw rows and their typed form

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::identity::identity;

/// Number of fields in every input row
pub const FIELD_COUNT: usize = 4;

/// Date layout of the `date` field
pub const DATE_FORMAT: &str = "%Y-%m-%d";

static DATE_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static AMOUNT_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d+(?:\.\d*)?|\.\d+)$").unwrap());

/// One input row, fields exactly as read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// 1-based row number in the source
    pub row: usize,
    pub date: String,
    pub description: String,
    pub debit: String,
    pub credit: String,
}

/// Typed values of a row; identity is assigned separately
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedRecord {
    pub date: NaiveDate,
    pub description: String,
    pub debit: f64,
    pub credit: f64,
}

impl RawRecord {
    pub fn new(
        row: usize,
        date: impl Into<String>,
        description: impl Into<String>,
        debit: impl Into<String>,
        credit: impl Into<String>,
    ) -> Self {
        Self {
            row,
            date: date.into(),
            description: description.into(),
            debit: debit.into(),
            credit: credit.into(),
        }
    }

    /// Build from a row of fields, which must hold exactly four values
    pub fn from_fields<'a, I>(row: usize, fields: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let fields: Vec<&str> = fields.into_iter().collect();
        if fields.len() != FIELD_COUNT {
            return Err(ParseError::FieldCount {
                row,
                expected: FIELD_COUNT,
                found: fields.len(),
            });
        }
        Ok(Self::new(row, fields[0], fields[1], fields[2], fields[3]))
    }

    /// Content identity of the raw fields
    pub fn identity(&self) -> String {
        identity(&self.date, &self.description, &self.debit, &self.credit)
    }

    /// Parse the fields into typed values
    pub fn parse(&self) -> Result<ParsedRecord, ParseError> {
        Ok(ParsedRecord {
            date: parse_date(self.row, &self.date)?,
            description: self.description.clone(),
            debit: parse_amount(self.row, "debit", &self.debit)?,
            credit: parse_amount(self.row, "credit", &self.credit)?,
        })
    }
}

/// Parse a `YYYY-MM-DD` calendar day
pub fn parse_date(row: usize, value: &str) -> Result<NaiveDate, ParseError> {
    let invalid = || ParseError::InvalidDate {
        row,
        value: value.to_string(),
    };
    if !DATE_SHAPE.is_match(value) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())
}

/// Parse a non-negative amount; a blank field is zero
pub fn parse_amount(row: usize, field: &'static str, value: &str) -> Result<f64, ParseError> {
    if value.is_empty() {
        return Ok(0.0);
    }
    let invalid = || ParseError::InvalidAmount {
        row,
        field,
        value: value.to_string(),
    };
    if !AMOUNT_SHAPE.is_match(value) {
        return Err(invalid());
    }
    let amount = value.parse::<f64>().map_err(|_| invalid())?;
    if !amount.is_finite() {
        return Err(invalid());
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_record() {
        let raw = RawRecord::new(1, "2024-01-03", "Groceries", "50.25", "");
        let parsed = raw.parse().unwrap();
        assert_eq!(parsed.date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(parsed.description, "Groceries");
        assert_eq!(parsed.debit, 50.25);
        assert_eq!(parsed.credit, 0.0);
    }

    #[test]
    fn test_blank_amounts_are_zero() {
        let parsed = RawRecord::new(1, "2024-01-01", "", "", "").parse().unwrap();
        assert_eq!(parsed.debit, 0.0);
        assert_eq!(parsed.credit, 0.0);
        assert!(parsed.description.is_empty());
    }

    #[test]
    fn test_amount_forms() {
        assert_eq!(parse_amount(1, "debit", "100").unwrap(), 100.0);
        assert_eq!(parse_amount(1, "debit", "0.00").unwrap(), 0.0);
        assert_eq!(parse_amount(1, "debit", ".5").unwrap(), 0.5);
        assert_eq!(parse_amount(1, "debit", "7.").unwrap(), 7.0);
    }

    #[test]
    fn test_malformed_amounts_rejected() {
        for value in ["abc", "-5", "1e3", "NaN", "inf", "1,000", " 5", "5 ", "."] {
            let err = parse_amount(4, "credit", value).unwrap_err();
            match err {
                ParseError::InvalidAmount { row, field, value: v } => {
                    assert_eq!(row, 4);
                    assert_eq!(field, "credit");
                    assert_eq!(v, value);
                }
                other => panic!("unexpected error for {:?}: {:?}", value, other),
            }
        }
    }

    #[test]
    fn test_overflowing_amount_rejected() {
        let huge = "9".repeat(400);
        assert!(matches!(
            parse_amount(2, "debit", &huge),
            Err(ParseError::InvalidAmount { row: 2, field: "debit", .. })
        ));
        assert!(RawRecord::new(2, "2024-01-01", "Big", "", &huge).parse().is_err());
    }

    #[test]
    fn test_malformed_dates_rejected() {
        for value in ["2024/01/01", "01-02-2024", "2024-1-5", "2024-02-30", "", "2024-01-01T00:00"] {
            let err = parse_date(2, value).unwrap_err();
            assert!(matches!(err, ParseError::InvalidDate { row: 2, .. }), "{:?}", value);
        }
    }

    #[test]
    fn test_leap_day_accepted() {
        assert_eq!(
            parse_date(1, "2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn test_from_fields_checks_count() {
        let ok = RawRecord::from_fields(3, ["2024-01-01", "A", "", "1"]).unwrap();
        assert_eq!(ok.row, 3);
        assert_eq!(ok.credit, "1");

        let err = RawRecord::from_fields(5, ["2024-01-01", "A", ""]).unwrap_err();
        assert!(matches!(err, ParseError::FieldCount { row: 5, expected: 4, found: 3 }));
    }

    #[test]
    fn test_identity_ignores_row_number() {
        let a = RawRecord::new(1, "2024-01-01", "A", "", "100");
        let b = RawRecord::new(9, "2024-01-01", "A", "", "100");
        assert_eq!(a.identity(), b.identity());
    }
}
