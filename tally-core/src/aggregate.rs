//! Derived views over a transaction snapshot: monthly totals, per-category
//! breakdown and a month-by-month trend.
//!
//! Everything here is a pure function of its arguments. Month membership is
//! calendar based, never a rolling window.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::category::Kind;
use crate::month::YearMonth;
use crate::transaction::Transaction;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub income: f64,
    pub expense: f64,
    pub net: f64,
}

/// One bucket of [`trend`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub month: YearMonth,
    pub income: f64,
    pub expense: f64,
}

fn in_month(transactions: &[Transaction], month: YearMonth) -> impl Iterator<Item = &Transaction> {
    transactions.iter().filter(move |t| month.contains(t.date))
}

fn totals(transactions: &[Transaction], month: YearMonth) -> (f64, f64) {
    in_month(transactions, month).fold((0.0, 0.0), |(inc, exp), t| match t.kind {
        Kind::Income => (inc + t.amount, exp),
        Kind::Expense => (inc, exp + t.amount),
    })
}

pub fn monthly_summary(transactions: &[Transaction], month: YearMonth) -> MonthlySummary {
    let (income, expense) = totals(transactions, month);
    MonthlySummary {
        income,
        expense,
        net: income - expense,
    }
}

/// Totals per category id for `kind` in `month`. Categories without a
/// matching transaction are absent.
pub fn category_breakdown(
    transactions: &[Transaction],
    month: YearMonth,
    kind: Kind,
) -> HashMap<String, f64> {
    let mut out: HashMap<String, f64> = HashMap::new();
    for t in in_month(transactions, month).filter(|t| t.kind == kind) {
        *out.entry(t.category_id.clone()).or_insert(0.0) += t.amount;
    }
    out
}

/// `month_count` consecutive months ending at `ending` (inclusive), oldest
/// first. Empty months are reported as zeros.
pub fn trend(transactions: &[Transaction], month_count: usize, ending: YearMonth) -> Vec<TrendPoint> {
    let mut months = Vec::with_capacity(month_count);
    let mut m = ending;
    for _ in 0..month_count {
        months.push(m);
        m = m.pred();
    }
    months.reverse();

    months
        .into_iter()
        .map(|month| {
            let (income, expense) = totals(transactions, month);
            TrendPoint { month, income, expense }
        })
        .collect()
}
