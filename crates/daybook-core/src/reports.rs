//! Statement structures handed to display code

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One calendar day of a statement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyBucket {
    pub date: NaiveDate,
    /// Sum of credits dated this day
    pub income: f64,
    /// Sum of debits dated this day
    pub expense: f64,
    /// Running `income - expense` through this day
    pub balance: f64,
}

impl DailyBucket {
    /// Zeroed bucket for a day
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            income: 0.0,
            expense: 0.0,
            balance: 0.0,
        }
    }

    /// Net change on this day
    pub fn net(&self) -> f64 {
        self.income - self.expense
    }
}

/// Gap-free daily series between the first and last transaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatement {
    /// Ascending by date, one per day
    pub buckets: Vec<DailyBucket>,
    /// Transactions the statement was built from
    pub transaction_count: usize,
}

impl BudgetStatement {
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of days covered
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.buckets.first().map(|b| b.date)
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.buckets.last().map(|b| b.date)
    }

    pub fn bucket(&self, date: NaiveDate) -> Option<&DailyBucket> {
        self.buckets
            .binary_search_by(|b| b.date.cmp(&date))
            .ok()
            .map(|index| &self.buckets[index])
    }

    pub fn total_income(&self) -> f64 {
        self.buckets.iter().map(|b| b.income).sum()
    }

    pub fn total_expense(&self) -> f64 {
        self.buckets.iter().map(|b| b.expense).sum()
    }

    /// Total income minus total expense
    pub fn net(&self) -> f64 {
        self.total_income() - self.total_expense()
    }

    /// Balance on the last day, zero when empty
    pub fn closing_balance(&self) -> f64 {
        self.buckets.last().map(|b| b.balance).unwrap_or(0.0)
    }

    pub fn summary(&self) -> StatementSummary {
        StatementSummary {
            start_date: self.start_date(),
            end_date: self.end_date(),
            day_count: self.len(),
            transaction_count: self.transaction_count,
            total_income: self.total_income(),
            total_expense: self.total_expense(),
            net: self.net(),
        }
    }

    /// Column-oriented copy of the buckets for charting
    pub fn series(&self) -> StatementSeries {
        StatementSeries {
            dates: self.buckets.iter().map(|b| b.date).collect(),
            income: self.buckets.iter().map(|b| b.income).collect(),
            expense: self.buckets.iter().map(|b| b.expense).collect(),
            balance: self.buckets.iter().map(|b| b.balance).collect(),
        }
    }
}

/// Scalar aggregates of a statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementSummary {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub day_count: usize,
    pub transaction_count: usize,
    pub total_income: f64,
    pub total_expense: f64,
    pub net: f64,
}

/// Parallel arrays, index `i` of each is the same day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementSeries {
    pub dates: Vec<NaiveDate>,
    pub income: Vec<f64>,
    pub expense: Vec<f64>,
    pub balance: Vec<f64>,
}

/// Statement plus aggregates, as serialized for consumers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementResponse {
    pub summary: StatementSummary,
    pub buckets: Vec<DailyBucket>,
}

impl From<&BudgetStatement> for StatementResponse {
    fn from(statement: &BudgetStatement) -> Self {
        Self {
            summary: statement.summary(),
            buckets: statement.buckets.clone(),
        }
    }
}
