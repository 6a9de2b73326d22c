//! TransactionStore: ordered, id-addressable transaction collection.
//!
//! Records keep insertion order (exports and legacy blobs rely on it).
//! Lookups are linear; a personal ledger stays small enough that an index
//! would only add bookkeeping.
//!
//! Mutations validate first and only then touch the collection, so a failed
//! add/update/delete leaves the store exactly as it was.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

use crate::category::{CategoryRegistry, Kind};
use crate::error::{Result, TallyError};
use crate::transaction::{Transaction, TransactionDraft};

/// Conjunction of optional predicates applied by [`TransactionStore::list`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub kind: Option<Kind>,
    pub category_id: Option<String>,
    /// Case-insensitive substring over category name and description
    pub search: Option<String>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kind(mut self, kind: Kind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.search = if text.trim().is_empty() { None } else { Some(text) };
        self
    }

    pub fn matches(&self, t: &Transaction) -> bool {
        if self.kind.is_some_and(|k| k != t.kind) {
            return false;
        }
        if self.category_id.as_ref().is_some_and(|c| *c != t.category_id) {
            return false;
        }
        if let Some(needle) = &self.search {
            let needle = needle.to_lowercase();
            let in_category = t.category_name.to_lowercase().contains(&needle);
            let in_description = t
                .description
                .as_ref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !in_category && !in_description {
                return false;
            }
        }
        true
    }
}

/// Listing order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// createdAt descending
    #[default]
    Newest,
    Oldest,
    /// amount descending
    Highest,
    Lowest,
}

impl FromStr for SortOrder {
    type Err = TallyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" => Ok(SortOrder::Newest),
            "oldest" => Ok(SortOrder::Oldest),
            "highest" => Ok(SortOrder::Highest),
            "lowest" => Ok(SortOrder::Lowest),
            other => Err(TallyError::validation(format!("unknown sort order '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionStore {
    transactions: Vec<Transaction>,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Immutable snapshot in store order, the input to aggregation.
    pub fn as_slice(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn find(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// Validate, snapshot the category and append. Returns the new id.
    pub fn add(&mut self, draft: TransactionDraft, registry: &CategoryRegistry) -> Result<String> {
        let category = draft.validate(registry)?;
        let id = Uuid::new_v4().to_string();
        let created_at = self.next_created_at();

        let txn = Transaction::from_draft(id.clone(), draft, category, created_at);
        debug!(id = %txn.id, kind = %txn.kind, amount = txn.amount, "transaction added");
        self.transactions.push(txn);
        Ok(id)
    }

    /// Replace the record with `id`, keeping its id and createdAt.
    pub fn update(
        &mut self,
        id: &str,
        draft: TransactionDraft,
        registry: &CategoryRegistry,
    ) -> Result<()> {
        let idx = self.position(id)?;
        let category = draft.validate(registry)?;

        let slot = &mut self.transactions[idx];
        let created_at = slot.created_at;
        *slot = Transaction::from_draft(id.to_string(), draft, category, created_at);
        debug!(id, "transaction updated");
        Ok(())
    }

    /// Remove the record with `id`. Deleting twice yields NotFound the second time.
    pub fn delete(&mut self, id: &str) -> Result<Transaction> {
        let idx = self.position(id)?;
        let removed = self.transactions.remove(idx);
        debug!(id, "transaction deleted");
        Ok(removed)
    }

    pub fn list(&self, filter: &TransactionFilter, sort: SortOrder) -> Vec<&Transaction> {
        let mut out: Vec<&Transaction> = self
            .transactions
            .iter()
            .filter(|t| filter.matches(t))
            .collect();

        // sort_by is stable: equal keys keep insertion order
        out.sort_by(|a, b| match sort {
            SortOrder::Newest => b.created_at.cmp(&a.created_at),
            SortOrder::Oldest => a.created_at.cmp(&b.created_at),
            SortOrder::Highest => cmp_amount(b, a),
            SortOrder::Lowest => cmp_amount(a, b),
        });
        out
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TallyError::not_found(id))
    }

    // Wall-clock millis, bumped past the newest stored value so ordering by
    // createdAt never ties within one store.
    fn next_created_at(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        match self.transactions.iter().map(|t| t.created_at).max() {
            Some(last) if last >= now => last + 1,
            _ => now,
        }
    }
}

fn cmp_amount(a: &Transaction, b: &Transaction) -> Ordering {
    a.amount.total_cmp(&b.amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::PaymentMethod;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn expense(amount: f64, cat: &str) -> TransactionDraft {
        TransactionDraft::new(Kind::Expense, amount, cat, d(2024, 6, 1))
    }

    #[test]
    fn test_add_then_find_returns_draft_fields() {
        let reg = CategoryRegistry::default();
        let mut store = TransactionStore::new();
        let draft = expense(42.5, "food")
            .with_description("Lunch")
            .with_payment_method(PaymentMethod::Card);

        let id = store.add(draft.clone(), &reg).unwrap();
        let t = store.find(&id).unwrap();

        assert_eq!(t.to_draft(), draft);
        assert_eq!(t.category_name, "Food");
        assert_eq!(t.icon, "🍔");
        assert_eq!(t.color, "#ef4444");
    }

    #[test]
    fn test_add_rejects_invalid_without_mutation() {
        let reg = CategoryRegistry::default();
        let mut store = TransactionStore::new();

        assert!(matches!(store.add(expense(0.0, "food"), &reg), Err(TallyError::Validation(_))));
        assert!(matches!(store.add(expense(5.0, "salary"), &reg), Err(TallyError::Validation(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_ids_unique_and_created_at_strictly_increasing() {
        let reg = CategoryRegistry::default();
        let mut store = TransactionStore::new();
        for _ in 0..50 {
            store.add(expense(1.0, "food"), &reg).unwrap();
        }
        let txns = store.as_slice();
        for w in txns.windows(2) {
            assert!(w[0].created_at < w[1].created_at);
            assert_ne!(w[0].id, w[1].id);
        }
    }

    #[test]
    fn test_update_preserves_created_at_and_resnapshots() {
        let reg = CategoryRegistry::default();
        let mut store = TransactionStore::new();
        let id = store.add(expense(10.0, "food"), &reg).unwrap();
        let created = store.find(&id).unwrap().created_at;

        store.update(&id, expense(15.0, "transport"), &reg).unwrap();
        let t = store.find(&id).unwrap();
        assert_eq!(t.amount, 15.0);
        assert_eq!(t.category_name, "Transport");
        assert_eq!(t.created_at, created);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_missing_or_invalid_is_noop() {
        let reg = CategoryRegistry::default();
        let mut store = TransactionStore::new();
        let id = store.add(expense(10.0, "food"), &reg).unwrap();
        let before = store.clone();

        assert_eq!(
            store.update("nope", expense(1.0, "food"), &reg),
            Err(TallyError::NotFound("nope".to_string()))
        );
        assert!(store.update(&id, expense(-1.0, "food"), &reg).is_err());
        assert_eq!(store, before);
    }

    #[test]
    fn test_delete_twice_is_not_found() {
        let reg = CategoryRegistry::default();
        let mut store = TransactionStore::new();
        let id = store.add(expense(10.0, "food"), &reg).unwrap();

        store.delete(&id).unwrap();
        assert!(store.find(&id).is_none());
        assert_eq!(store.delete(&id), Err(TallyError::NotFound(id)));
    }

    #[test]
    fn test_registry_edit_does_not_rewrite_history() {
        let mut reg = CategoryRegistry::default();
        let mut store = TransactionStore::new();
        let id = store.add(expense(10.0, "food"), &reg).unwrap();

        reg.expense[0].name = "Groceries".to_string();
        assert_eq!(store.find(&id).unwrap().category_name, "Food");
    }

    #[test]
    fn test_list_filters_are_conjunctive() {
        let reg = CategoryRegistry::default();
        let mut store = TransactionStore::new();
        store.add(expense(10.0, "food").with_description("Pizza night"), &reg).unwrap();
        store.add(expense(20.0, "transport").with_description("Train"), &reg).unwrap();
        store
            .add(TransactionDraft::new(Kind::Income, 900.0, "salary", d(2024, 6, 1)), &reg)
            .unwrap();

        let all = store.list(&TransactionFilter::new(), SortOrder::Oldest);
        assert_eq!(all.len(), 3);

        let incomes = store.list(&TransactionFilter::new().with_kind(Kind::Income), SortOrder::Newest);
        assert_eq!(incomes.len(), 1);

        // matches description, case-insensitive
        let pizza = store.list(&TransactionFilter::new().with_search("PIZZA"), SortOrder::Newest);
        assert_eq!(pizza.len(), 1);

        // matches category name
        let transport = store.list(&TransactionFilter::new().with_search("transp"), SortOrder::Newest);
        assert_eq!(transport.len(), 1);

        let none = store.list(
            &TransactionFilter::new().with_kind(Kind::Income).with_category("food"),
            SortOrder::Newest,
        );
        assert!(none.is_empty());
    }

    #[test]
    fn test_list_sort_orders() {
        let reg = CategoryRegistry::default();
        let mut store = TransactionStore::new();
        for amount in [30.0, 10.0, 20.0] {
            store.add(expense(amount, "food"), &reg).unwrap();
        }
        let f = TransactionFilter::new();
        let amounts = |s| store.list(&f, s).iter().map(|t| t.amount).collect::<Vec<_>>();

        assert_eq!(amounts(SortOrder::Oldest), vec![30.0, 10.0, 20.0]);
        assert_eq!(amounts(SortOrder::Newest), vec![20.0, 10.0, 30.0]);
        assert_eq!(amounts(SortOrder::Highest), vec![30.0, 20.0, 10.0]);
        assert_eq!(amounts(SortOrder::Lowest), vec![10.0, 20.0, 30.0]);
    }
}
