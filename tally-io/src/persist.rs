//! JSON data-file persistence for the [`Ledger`].
//!
//! The file holds one blob, written whole after every mutation (last write
//! wins). Loading is forgiving: a missing, unreadable or malformed file
//! yields the default ledger, and within a readable object each top-level
//! key is taken independently so one damaged section does not discard the
//! others. The list sections are read record by record: a record that does
//! not parse, or whose amount or limit is not positive, is dropped on its own.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use tally_core::error::{Result, TallyError};
use tally_core::transaction::validate_amount;
use tally_core::{Budget, Ledger, RecurrenceRule, Transaction};

/// Read the raw blob. `Ok(None)` when the file does not exist yet.
pub fn read_blob(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    fs::read_to_string(path)
        .map(Some)
        .map_err(|e| TallyError::persistence(format!("read {}: {e}", path.display())))
}

/// Shallow-merge a JSON blob over the default ledger.
pub fn parse_ledger(text: &str) -> Ledger {
    let mut ledger = Ledger::default();

    let obj: Map<String, Value> = match serde_json::from_str(text) {
        Ok(Value::Object(obj)) => obj,
        Ok(_) => {
            warn!("data file is not a JSON object; using defaults");
            return ledger;
        }
        Err(e) => {
            warn!("data file is not valid JSON ({e}); using defaults");
            return ledger;
        }
    };

    merge_records(&obj, "transactions", &mut ledger.transactions, |t: &Transaction| {
        validate_amount(t.amount)
    });
    merge_key(&obj, "categories", &mut ledger.categories);
    merge_records(&obj, "budgets", &mut ledger.budgets, |b: &Budget| validate_amount(b.limit));
    merge_records(
        &obj,
        "recurringTransactions",
        &mut ledger.recurring_transactions,
        |r: &RecurrenceRule| validate_amount(r.amount),
    );
    merge_key(&obj, "settings", &mut ledger.settings);

    ledger
}

fn merge_key<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str, slot: &mut T) {
    let Some(value) = obj.get(key) else { return };
    match T::deserialize(value) {
        Ok(parsed) => *slot = parsed,
        Err(e) => warn!(key, "ignoring malformed section ({e}); keeping defaults"),
    }
}

/// Rebuild a list section from the records of type `R` that parse and pass
/// `check`. A section that is not an array keeps its default.
fn merge_records<R, T>(
    obj: &Map<String, Value>,
    key: &str,
    slot: &mut T,
    check: impl Fn(&R) -> Result<()>,
) where
    R: DeserializeOwned,
    T: DeserializeOwned,
{
    let Some(value) = obj.get(key) else { return };
    let Value::Array(items) = value else {
        warn!(key, "ignoring section that is not a list; keeping defaults");
        return;
    };

    let mut kept = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let outcome = R::deserialize(item)
            .map_err(|e| e.to_string())
            .and_then(|record| check(&record).map_err(|e| e.to_string()));
        match outcome {
            Ok(()) => kept.push(item.clone()),
            Err(e) => warn!(key, index, "dropping malformed record ({e})"),
        }
    }

    match T::deserialize(Value::Array(kept)) {
        Ok(parsed) => *slot = parsed,
        Err(e) => warn!(key, "ignoring malformed section ({e}); keeping defaults"),
    }
}

/// Load the ledger at `path`, falling back to defaults on any failure.
pub fn load_ledger(path: &Path) -> Ledger {
    match read_blob(path) {
        Ok(Some(text)) => {
            let ledger = parse_ledger(&text);
            debug!(
                path = %path.display(),
                transactions = ledger.transactions.len(),
                "ledger loaded"
            );
            ledger
        }
        Ok(None) => {
            debug!(path = %path.display(), "no data file yet; starting empty");
            Ledger::default()
        }
        Err(e) => {
            warn!("{e}; starting with an empty ledger");
            Ledger::default()
        }
    }
}

/// Overwrite `path` with the full ledger blob.
pub fn save_ledger(path: &Path, ledger: &Ledger) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .map_err(|e| TallyError::persistence(format!("create {}: {e}", dir.display())))?;
    }
    let json = serde_json::to_string(ledger)
        .map_err(|e| TallyError::persistence(format!("serialize ledger: {e}")))?;
    fs::write(path, json)
        .map_err(|e| TallyError::persistence(format!("write {}: {e}", path.display())))?;
    debug!(path = %path.display(), "ledger saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::Theme;

    #[test]
    fn test_garbage_blob_gives_defaults() {
        assert_eq!(parse_ledger("{not json"), Ledger::default());
        assert_eq!(parse_ledger("[1,2,3]"), Ledger::default());
        assert_eq!(parse_ledger(""), Ledger::default());
    }

    #[test]
    fn test_bad_section_keeps_other_sections() {
        let text = r#"{
            "transactions": "oops",
            "settings": {"currency": "EUR", "theme": "dark"},
            "unknownKey": 42
        }"#;
        let ledger = parse_ledger(text);
        assert!(ledger.transactions.is_empty());
        assert_eq!(ledger.settings.currency, "EUR");
        assert_eq!(ledger.settings.theme, Theme::Dark);
        // untouched key keeps the built-in registry
        assert_eq!(ledger.categories.expense.len(), 8);
    }

    #[test]
    fn test_bad_records_are_dropped_one_by_one() {
        let text = r#"{
            "transactions": [
                {"id": "1", "type": "expense", "amount": 12.5, "categoryId": "food",
                 "category": "Food", "date": "2024-06-03", "createdAt": 1},
                {"id": "2", "type": "expense", "amount": null, "categoryId": "food",
                 "date": "2024-06-04", "createdAt": 2},
                {"id": "3", "type": "income", "amount": 0, "categoryId": "salary",
                 "date": "2024-06-05", "createdAt": 3}
            ],
            "budgets": [
                {"id": "b1", "categoryId": "food", "amount": 0},
                {"id": "b2", "categoryId": "bills", "amount": 80}
            ],
            "recurringTransactions": [
                {"type": "expense", "amount": -5, "categoryId": "food",
                 "frequency": "weekly", "lastGeneratedDate": "2024-06-01"}
            ]
        }"#;
        let ledger = parse_ledger(text);

        let ids: Vec<&str> = ledger.transactions.as_slice().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
        assert_eq!(ledger.budgets.budgets().len(), 1);
        assert_eq!(ledger.budgets.budgets()[0].category_id, "bills");
        assert!(ledger.recurring_transactions.is_empty());
    }
}
