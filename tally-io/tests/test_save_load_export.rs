use chrono::NaiveDate;
use std::fs;
use tally_core::{Frequency, Kind, Ledger, PaymentMethod, TransactionDraft};
use tally_io::{export_csv, export_json, load_ledger, read_csv, save_ledger};
use tempfile::TempDir;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn populated() -> Ledger {
    let mut ledger = Ledger::new();
    ledger
        .add_transaction(
            TransactionDraft::new(Kind::Income, 4200.0, "salary", d(2024, 5, 1))
                .with_payment_method(PaymentMethod::BankTransfer),
            Some(Frequency::Monthly),
        )
        .unwrap();
    ledger
        .add_transaction(
            TransactionDraft::new(Kind::Expense, 18.4, "transport", d(2024, 5, 2)).with_description("Metro card"),
            None,
        )
        .unwrap();
    ledger.set_budget("transport", 120.0).unwrap();
    ledger.settings.set_exchange_rate("EUR", 0.92).unwrap();
    ledger
}

#[test]
fn test_save_then_load_is_lossless() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("data.json");
    let ledger = populated();

    save_ledger(&path, &ledger).unwrap();
    let loaded = load_ledger(&path);

    assert_eq!(loaded, ledger);
}

#[test]
fn test_missing_and_corrupt_files_fall_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.json");
    assert_eq!(load_ledger(&path), Ledger::default());

    fs::write(&path, "{\"transactions\": [").unwrap();
    assert_eq!(load_ledger(&path), Ledger::default());
}

#[test]
fn test_last_write_wins() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.json");
    let mut ledger = populated();
    save_ledger(&path, &ledger).unwrap();

    let id = ledger.transactions.as_slice()[1].id.clone();
    ledger.delete_transaction(&id).unwrap();
    save_ledger(&path, &ledger).unwrap();

    assert_eq!(load_ledger(&path).transactions.len(), 1);
}

#[test]
fn test_recurring_rule_survives_reload_and_generates() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.json");
    save_ledger(&path, &populated()).unwrap();

    let mut ledger = load_ledger(&path);
    let generated = ledger.process_recurring(d(2024, 8, 20));
    assert_eq!(generated.len(), 1);
    assert_eq!(ledger.recurring_transactions[0].last_generated, d(2024, 8, 20));
}

#[test]
fn test_csv_export_row_count_and_amounts() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.csv");
    let ledger = populated();

    let written = export_csv(ledger.transactions.as_slice(), &path).unwrap();
    assert_eq!(written, ledger.transactions.len());

    let rows = read_csv(fs::File::open(&path).unwrap()).unwrap();
    assert_eq!(rows.len(), ledger.transactions.len());
    let amounts: Vec<f64> = rows.iter().map(|r| r.amount).collect();
    assert_eq!(amounts, vec![4200.0, 18.4]);
    assert_eq!(rows[1].category, "Transport");

    let text = fs::read_to_string(&path).unwrap();
    assert!(!text.contains('$'));
}

#[test]
fn test_json_export_is_pretty_full_blob() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.json");
    let ledger = populated();

    export_json(&ledger, &path).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\n  \"recurringTransactions\""));

    let parsed: Ledger = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, ledger);
}

#[test]
fn test_one_bad_record_does_not_erase_history_on_next_save() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.json");
    fs::write(
        &path,
        r#"{"transactions": [
            {"id": "1", "type": "expense", "amount": 9.99, "categoryId": "shopping",
             "category": "Shopping", "date": "2024-04-02", "createdAt": 1712000000000},
            {"id": "2", "type": "expense", "amount": null, "categoryId": "food",
             "category": "Food", "date": "2024-04-03", "createdAt": 1712000000001}
        ]}"#,
    )
    .unwrap();

    let mut ledger = load_ledger(&path);
    assert_eq!(ledger.transactions.len(), 1);
    ledger.set_budget("food", 150.0).unwrap();
    save_ledger(&path, &ledger).unwrap();

    let reloaded = load_ledger(&path);
    assert_eq!(reloaded.transactions.len(), 1);
    assert_eq!(reloaded.transactions.find("1").unwrap().amount, 9.99);
    assert_eq!(reloaded.budgets.budgets().len(), 1);
}
