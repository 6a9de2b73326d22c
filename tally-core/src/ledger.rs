//! Ledger: the complete application state, passed explicitly to every
//! operation. Its serde shape is the persisted data blob.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::aggregate::{self, MonthlySummary, TrendPoint};
use crate::budget::{Budget, BudgetProgress, BudgetTracker};
use crate::category::{CategoryRegistry, Kind};
use crate::error::Result;
use crate::month::YearMonth;
use crate::recurrence::{self, Frequency, RecurrenceRule};
use crate::settings::Settings;
use crate::store::TransactionStore;
use crate::transaction::{Transaction, TransactionDraft};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Ledger {
    pub transactions: TransactionStore,
    pub categories: CategoryRegistry,
    pub budgets: BudgetTracker,
    pub recurring_transactions: Vec<RecurrenceRule>,
    pub settings: Settings,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a transaction; with `recurring`, also register a rule whose first
    /// instance is this transaction.
    pub fn add_transaction(
        &mut self,
        draft: TransactionDraft,
        recurring: Option<Frequency>,
    ) -> Result<String> {
        let id = self.transactions.add(draft, &self.categories)?;
        if let Some(frequency) = recurring {
            if let Some(txn) = self.transactions.find(&id) {
                self.recurring_transactions
                    .push(RecurrenceRule::from_transaction(txn, frequency));
            }
        }
        Ok(id)
    }

    pub fn update_transaction(&mut self, id: &str, draft: TransactionDraft) -> Result<()> {
        self.transactions.update(id, draft, &self.categories)
    }

    pub fn delete_transaction(&mut self, id: &str) -> Result<Transaction> {
        self.transactions.delete(id)
    }

    /// Run every recurrence rule once against `today`.
    pub fn process_recurring(&mut self, today: NaiveDate) -> Vec<String> {
        recurrence::generate_due(
            &mut self.recurring_transactions,
            &mut self.transactions,
            &self.categories,
            today,
        )
    }

    pub fn set_budget(&mut self, category_id: &str, limit: f64) -> Result<&Budget> {
        self.budgets.set_budget(category_id, limit, &self.categories)
    }

    pub fn remove_budget(&mut self, category_id: &str) -> Result<Budget> {
        self.budgets.remove_budget(category_id)
    }

    pub fn budget_report(&self, month: YearMonth) -> Vec<(&Budget, BudgetProgress)> {
        self.budgets.report(self.transactions.as_slice(), month)
    }

    pub fn summary(&self, month: YearMonth) -> MonthlySummary {
        aggregate::monthly_summary(self.transactions.as_slice(), month)
    }

    pub fn breakdown(&self, month: YearMonth, kind: Kind) -> HashMap<String, f64> {
        aggregate::category_breakdown(self.transactions.as_slice(), month, kind)
    }

    pub fn trend(&self, month_count: usize, ending: YearMonth) -> Vec<TrendPoint> {
        aggregate::trend(self.transactions.as_slice(), month_count, ending)
    }
}
