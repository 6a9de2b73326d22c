//! Transaction records and the drafts they are created from.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::category::{Category, CategoryRegistry, Kind};
use crate::error::TallyError;

/// How a transaction was paid
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "cash")]
    Cash,
    #[serde(rename = "card")]
    Card,
    #[serde(rename = "bankTransfer")]
    BankTransfer,
    #[serde(rename = "digitalWallet")]
    DigitalWallet,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::BankTransfer => "bankTransfer",
            PaymentMethod::DigitalWallet => "digitalWallet",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = TallyError;

    /// Accepts the stored camelCase tag as well as kebab/snake spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match norm.as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "banktransfer" | "bank" => Ok(PaymentMethod::BankTransfer),
            "digitalwallet" | "wallet" => Ok(PaymentMethod::DigitalWallet),
            _ => Err(TallyError::validation(format!("unknown payment method '{s}'"))),
        }
    }
}

/// A stored income/expense record.
///
/// `category_name`, `icon` and `color` are copied from the registry when the
/// record is created or replaced; later registry edits do not touch them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: Kind,
    pub amount: f64,
    pub category_id: String,
    #[serde(rename = "category")]
    pub category_name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// Milliseconds since the Unix epoch, strictly increasing within a store
    #[serde(alias = "timestamp")]
    pub created_at: i64,
}

impl Transaction {
    pub(crate) fn from_draft(
        id: String,
        draft: TransactionDraft,
        category: &Category,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            kind: draft.kind,
            amount: draft.amount,
            category_id: draft.category_id,
            category_name: category.name.clone(),
            icon: category.icon.clone(),
            color: category.color.clone(),
            date: draft.date,
            description: draft.description,
            payment_method: draft.payment_method,
            created_at,
        }
    }

    pub fn is_income(&self) -> bool {
        self.kind == Kind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == Kind::Expense
    }

    /// The user-editable fields of this record, e.g. as a starting point for an edit.
    pub fn to_draft(&self) -> TransactionDraft {
        TransactionDraft {
            kind: self.kind,
            amount: self.amount,
            category_id: self.category_id.clone(),
            date: self.date,
            description: self.description.clone(),
            payment_method: self.payment_method,
        }
    }
}

/// User-supplied fields for a new or replacement transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub kind: Kind,
    pub amount: f64,
    pub category_id: String,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub payment_method: PaymentMethod,
}

impl TransactionDraft {
    pub fn new(kind: Kind, amount: f64, category_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            kind,
            amount,
            category_id: category_id.into(),
            date,
            description: None,
            payment_method: PaymentMethod::default(),
        }
    }

    /// Blank descriptions are stored as `None`.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let d = description.into();
        self.description = if d.trim().is_empty() { None } else { Some(d) };
        self
    }

    pub fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = method;
        self
    }

    /// Check invariants and return the category this draft refers to.
    pub fn validate<'r>(&self, registry: &'r CategoryRegistry) -> Result<&'r Category, TallyError> {
        validate_amount(self.amount)?;
        registry.resolve(self.kind, &self.category_id)
    }
}

/// Amounts must be finite and strictly positive.
pub fn validate_amount(amount: f64) -> Result<(), TallyError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(TallyError::validation(format!(
            "amount must be greater than zero, got {amount}"
        )));
    }
    Ok(())
}
