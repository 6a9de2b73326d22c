//! Recurring transactions.
//!
//! Rules are evaluated once per run (startup), not scheduled. Each rule is
//! either due or not due for a given `today`; a due rule materializes exactly
//! one transaction dated `today` and moves its `last_generated` to `today`.
//!
//! Missed periods are not back-filled: a monthly rule last generated in
//! January and evaluated in March yields one transaction, not two.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};
use uuid::Uuid;

use crate::category::{CategoryRegistry, Kind};
use crate::error::TallyError;
use crate::store::TransactionStore;
use crate::transaction::{PaymentMethod, Transaction, TransactionDraft};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Frequency {
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "weekly")]
    Weekly,
    #[serde(rename = "monthly")]
    Monthly,
    #[serde(rename = "yearly")]
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }

    /// Whether a rule last generated on `last` is due on `today`.
    pub fn is_due(&self, last: NaiveDate, today: NaiveDate) -> bool {
        match self {
            Frequency::Daily => (today - last).num_days() >= 1,
            Frequency::Weekly => (today - last).num_days() >= 7,
            Frequency::Monthly => today.month() != last.month() || today.year() != last.year(),
            Frequency::Yearly => today.year() != last.year(),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            other => Err(TallyError::validation(format!("unknown frequency '{other}'"))),
        }
    }
}

fn new_rule_id() -> String {
    Uuid::new_v4().to_string()
}

/// A template transaction plus its period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    #[serde(default = "new_rule_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: Kind,
    pub amount: f64,
    pub category_id: String,
    /// Category name at the time the rule was created, for display
    #[serde(rename = "category", default)]
    pub category_name: String,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub frequency: Frequency,
    #[serde(rename = "lastGeneratedDate", alias = "lastGenerated")]
    pub last_generated: NaiveDate,
}

impl RecurrenceRule {
    /// Rule repeating `txn`; the transaction itself counts as the first instance.
    pub fn from_transaction(txn: &Transaction, frequency: Frequency) -> Self {
        Self {
            id: new_rule_id(),
            kind: txn.kind,
            amount: txn.amount,
            category_id: txn.category_id.clone(),
            category_name: txn.category_name.clone(),
            payment_method: txn.payment_method,
            description: txn.description.clone(),
            frequency,
            last_generated: txn.date,
        }
    }

    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.frequency.is_due(self.last_generated, today)
    }

    /// Draft for the instance dated `date`.
    pub fn instance(&self, date: NaiveDate) -> TransactionDraft {
        TransactionDraft {
            kind: self.kind,
            amount: self.amount,
            category_id: self.category_id.clone(),
            date,
            description: self.description.clone(),
            payment_method: self.payment_method,
        }
    }
}

/// Evaluate every rule against `today`, inserting at most one transaction per
/// rule. Returns the ids of the generated transactions in rule order.
///
/// A rule whose instance fails validation (e.g. its category was removed from
/// the registry) is skipped and keeps its `last_generated`.
pub fn generate_due(
    rules: &mut [RecurrenceRule],
    store: &mut TransactionStore,
    registry: &CategoryRegistry,
    today: NaiveDate,
) -> Vec<String> {
    let mut generated = Vec::new();

    for rule in rules.iter_mut() {
        if !rule.is_due(today) {
            continue;
        }

        match store.add(rule.instance(today), registry) {
            Ok(id) => {
                info!(
                    rule = %rule.id,
                    frequency = %rule.frequency,
                    category = %rule.category_id,
                    amount = rule.amount,
                    "generated recurring transaction"
                );
                rule.last_generated = today;
                generated.push(id);
            }
            Err(err) => {
                warn!(rule = %rule.id, "skipping recurring rule: {err}");
            }
        }
    }

    generated
}
