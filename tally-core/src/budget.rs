//! Monthly spending limits, one per expense category.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::category::{CategoryRegistry, Kind};
use crate::error::{Result, TallyError};
use crate::month::YearMonth;
use crate::transaction::{Transaction, validate_amount};

/// Percentage at which a budget is flagged as close to its limit
pub const WARNING_PERCENT: f64 = 90.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,
    pub category_id: String,
    #[serde(rename = "category", default)]
    pub category_name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(rename = "amount", alias = "limitAmount")]
    pub limit: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetStatus {
    Normal,
    Warning,
    OverBudget,
}

impl BudgetStatus {
    pub fn classify(percentage: f64) -> Self {
        if percentage >= 100.0 {
            BudgetStatus::OverBudget
        } else if percentage >= WARNING_PERCENT {
            BudgetStatus::Warning
        } else {
            BudgetStatus::Normal
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetProgress {
    pub spent: f64,
    /// `max(limit - spent, 0)`
    pub remaining: f64,
    /// `min(spent / limit * 100, 100)`
    pub percentage: f64,
    pub status: BudgetStatus,
}

/// Spend of `budget`'s category in `month` against its limit.
pub fn progress(budget: &Budget, transactions: &[Transaction], month: YearMonth) -> BudgetProgress {
    let spent: f64 = transactions
        .iter()
        .filter(|t| t.is_expense() && t.category_id == budget.category_id && month.contains(t.date))
        .fold(0.0, |acc, t| acc + t.amount);

    // a non-positive limit only counts as exceeded once something is spent
    let percentage = if budget.limit > 0.0 {
        (spent * 100.0 / budget.limit).min(100.0)
    } else if spent > 0.0 {
        100.0
    } else {
        0.0
    };
    BudgetProgress {
        spent,
        remaining: (budget.limit - spent).max(0.0),
        percentage,
        status: BudgetStatus::classify(percentage),
    }
}

/// Owns the budget list and enforces at most one budget per category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BudgetTracker {
    budgets: Vec<Budget>,
}

impl BudgetTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn budgets(&self) -> &[Budget] {
        &self.budgets
    }

    pub fn get(&self, category_id: &str) -> Option<&Budget> {
        self.budgets.iter().find(|b| b.category_id == category_id)
    }

    /// Set the limit for an expense category, replacing any previous budget for it.
    pub fn set_budget(
        &mut self,
        category_id: &str,
        limit: f64,
        registry: &CategoryRegistry,
    ) -> Result<&Budget> {
        validate_amount(limit)
            .map_err(|_| TallyError::validation(format!("budget limit must be greater than zero, got {limit}")))?;
        let category = registry.resolve(Kind::Expense, category_id)?;

        let budget = Budget {
            id: Uuid::new_v4().to_string(),
            category_id: category.id.clone(),
            category_name: category.name.clone(),
            icon: category.icon.clone(),
            limit,
        };

        self.budgets.retain(|b| b.category_id != category_id);
        self.budgets.push(budget);
        debug!(category_id, limit, "budget set");

        let idx = self.budgets.len() - 1;
        Ok(&self.budgets[idx])
    }

    pub fn remove_budget(&mut self, category_id: &str) -> Result<Budget> {
        let idx = self
            .budgets
            .iter()
            .position(|b| b.category_id == category_id)
            .ok_or_else(|| TallyError::not_found(category_id))?;
        debug!(category_id, "budget removed");
        Ok(self.budgets.remove(idx))
    }

    /// Progress for every budget, in budget order.
    pub fn report<'a>(
        &'a self,
        transactions: &[Transaction],
        month: YearMonth,
    ) -> Vec<(&'a Budget, BudgetProgress)> {
        self.budgets
            .iter()
            .map(|b| (b, progress(b, transactions, month)))
            .collect()
    }
}
