//! Daily resampling of transactions into a budget statement

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::models::Transaction;
use crate::reports::{BudgetStatement, DailyBucket};

/// Earliest and latest transaction date, `None` for no transactions
pub fn date_range(transactions: &[Transaction]) -> Option<(NaiveDate, NaiveDate)> {
    transactions.iter().fold(None, |range, tx| match range {
        None => Some((tx.date, tx.date)),
        Some((min, max)) => Some((min.min(tx.date), max.max(tx.date))),
    })
}

/// Build the daily statement for a set of transactions.
///
/// Every day from the earliest to the latest date gets a bucket, including
/// days without activity. Input order does not matter.
pub fn resample(transactions: &[Transaction]) -> BudgetStatement {
    let Some((start, end)) = date_range(transactions) else {
        return BudgetStatement::default();
    };

    let mut days: BTreeMap<NaiveDate, DailyBucket> = start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|day| (day, DailyBucket::empty(day)))
        .collect();

    for tx in transactions {
        // Every date lies inside [start, end], so the day exists
        if let Some(bucket) = days.get_mut(&tx.date) {
            bucket.income += tx.credit;
            bucket.expense += tx.debit;
        }
    }

    let mut balance = 0.0;
    let buckets: Vec<DailyBucket> = days
        .into_values()
        .map(|mut bucket| {
            balance += bucket.income - bucket.expense;
            bucket.balance = balance;
            bucket
        })
        .collect();

    log::debug!(
        "Resampled {} transactions into {} days ({} to {})",
        transactions.len(),
        buckets.len(),
        start,
        end
    );

    BudgetStatement {
        buckets,
        transaction_count: transactions.len(),
    }
}
