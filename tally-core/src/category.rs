//! Category registry: id -> {name, icon, color}, partitioned by kind.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TallyError;

/// Income or expense classification of a transaction/category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    #[serde(rename = "income")]
    Income,
    #[serde(rename = "expense")]
    Expense,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Income => "income",
            Kind::Expense => "expense",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Kind::Income),
            "expense" => Ok(Kind::Expense),
            other => Err(TallyError::validation(format!("unknown kind '{other}'"))),
        }
    }
}

/// A single category entry. Its kind is given by the registry list it lives in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
    /// RGB hex, e.g. `#10b981`
    pub color: String,
}

impl Category {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        icon: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: icon.into(),
            color: color.into(),
        }
    }
}

/// Category lists per kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryRegistry {
    pub income: Vec<Category>,
    pub expense: Vec<Category>,
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self {
            income: vec![
                Category::new("salary", "Salary", "💼", "#10b981"),
                Category::new("freelance", "Freelance", "💻", "#3b82f6"),
                Category::new("investment", "Investment", "📈", "#8b5cf6"),
                Category::new("gift", "Gift", "🎁", "#ec4899"),
                Category::new("other-income", "Other", "💰", "#6366f1"),
            ],
            expense: vec![
                Category::new("food", "Food", "🍔", "#ef4444"),
                Category::new("transport", "Transport", "🚗", "#f59e0b"),
                Category::new("shopping", "Shopping", "🛍️", "#ec4899"),
                Category::new("bills", "Bills", "📄", "#6366f1"),
                Category::new("entertainment", "Entertainment", "🎮", "#8b5cf6"),
                Category::new("health", "Health", "🏥", "#10b981"),
                Category::new("education", "Education", "📚", "#3b82f6"),
                Category::new("other-expense", "Other", "💸", "#64748b"),
            ],
        }
    }
}

impl CategoryRegistry {
    pub fn of_kind(&self, kind: Kind) -> &[Category] {
        match kind {
            Kind::Income => &self.income,
            Kind::Expense => &self.expense,
        }
    }

    /// Look up `id` in the list for `kind` only.
    pub fn get(&self, kind: Kind, id: &str) -> Option<&Category> {
        self.of_kind(kind).iter().find(|c| c.id == id)
    }

    /// Like [`get`](Self::get) but an unknown id is a validation error.
    pub fn resolve(&self, kind: Kind, id: &str) -> Result<&Category, TallyError> {
        self.get(kind, id).ok_or_else(|| {
            TallyError::validation(format!("'{id}' is not a known {kind} category"))
        })
    }

    /// All categories, income first, tagged with their kind.
    pub fn iter(&self) -> impl Iterator<Item = (Kind, &Category)> {
        self.income
            .iter()
            .map(|c| (Kind::Income, c))
            .chain(self.expense.iter().map(|c| (Kind::Expense, c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_ids_unique_per_kind() {
        let reg = CategoryRegistry::default();
        for kind in [Kind::Income, Kind::Expense] {
            let list = reg.of_kind(kind);
            let mut ids: Vec<_> = list.iter().map(|c| c.id.as_str()).collect();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), list.len());
        }
        assert_eq!(reg.iter().count(), 13);
    }

    #[test]
    fn test_resolve_is_scoped_to_kind() {
        let reg = CategoryRegistry::default();
        assert_eq!(reg.resolve(Kind::Expense, "food").unwrap().name, "Food");
        assert!(matches!(
            reg.resolve(Kind::Income, "food"),
            Err(TallyError::Validation(_))
        ));
    }

    #[test]
    fn test_kind_parse_and_serde() {
        assert_eq!("Income".parse::<Kind>().unwrap(), Kind::Income);
        assert!("refund".parse::<Kind>().is_err());
        assert_eq!(serde_json::to_string(&Kind::Expense).unwrap(), "\"expense\"");
    }
}
