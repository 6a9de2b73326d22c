//! CSV and JSON exports of the ledger.
//!
//! CSV layout, one row per transaction in store order:
//! Date,Type,Category,Amount,Description,Payment Method
//!
//! Amounts are written as the plain stored number (no currency symbol).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use tally_core::error::{Result, TallyError};
use tally_core::{Kind, Ledger, PaymentMethod, Transaction};

pub const CSV_HEADER: [&str; 6] = ["Date", "Type", "Category", "Amount", "Description", "Payment Method"];

#[derive(Serialize)]
struct CsvRowRef<'a> {
    date: NaiveDate,
    kind: Kind,
    category: &'a str,
    amount: f64,
    description: Option<&'a str>,
    payment_method: PaymentMethod,
}

/// A row read back from an exported CSV
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CsvRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Type")]
    pub kind: Kind,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Amount")]
    pub amount: f64,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Payment Method")]
    pub payment_method: PaymentMethod,
}

fn csv_err(e: impl std::fmt::Display) -> TallyError {
    TallyError::persistence(format!("csv: {e}"))
}

/// Write the header plus one row per transaction. Returns the row count.
pub fn write_csv<W: Write>(transactions: &[Transaction], out: W) -> Result<usize> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    wtr.write_record(CSV_HEADER).map_err(csv_err)?;

    for t in transactions {
        wtr.serialize(CsvRowRef {
            date: t.date,
            kind: t.kind,
            category: &t.category_name,
            amount: t.amount,
            description: t.description.as_deref(),
            payment_method: t.payment_method,
        })
        .map_err(csv_err)?;
    }

    wtr.flush().map_err(csv_err)?;
    Ok(transactions.len())
}

pub fn export_csv(transactions: &[Transaction], path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    let file = File::create(path)
        .map_err(|e| TallyError::persistence(format!("create {}: {e}", path.display())))?;
    write_csv(transactions, file)
}

/// Parse a CSV produced by [`write_csv`].
pub fn read_csv<R: Read>(input: R) -> Result<Vec<CsvRow>> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(input);

    let headers = rdr.headers().map_err(csv_err)?;
    if headers.iter().ne(CSV_HEADER) {
        return Err(TallyError::persistence(format!(
            "unexpected csv header: {}",
            headers.iter().collect::<Vec<_>>().join(",")
        )));
    }

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        rows.push(result.map_err(csv_err)?);
    }
    Ok(rows)
}

/// The whole blob, pretty-printed.
pub fn ledger_to_json(ledger: &Ledger) -> Result<String> {
    serde_json::to_string_pretty(ledger).map_err(|e| TallyError::persistence(format!("json: {e}")))
}

pub fn export_json(ledger: &Ledger, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = ledger_to_json(ledger)?;
    std::fs::write(path, json)
        .map_err(|e| TallyError::persistence(format!("write {}: {e}", path.display())))
}

/// `tally_<YYYY-MM-DD>.<ext>`
pub fn default_export_name(date: NaiveDate, ext: &str) -> String {
    format!("tally_{}.{ext}", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::TransactionDraft;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn ledger() -> Ledger {
        let mut l = Ledger::new();
        l.add_transaction(
            TransactionDraft::new(Kind::Expense, 12.75, "food", d(2024, 6, 3))
                .with_description("Tacos, extra salsa")
                .with_payment_method(PaymentMethod::Card),
            None,
        )
        .unwrap();
        l.add_transaction(TransactionDraft::new(Kind::Income, 3000.0, "salary", d(2024, 6, 1)), None)
            .unwrap();
        l
    }

    #[test]
    fn test_csv_text_layout() {
        let l = ledger();
        let mut buf = Vec::new();
        assert_eq!(write_csv(l.transactions.as_slice(), &mut buf).unwrap(), 2);

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Date,Type,Category,Amount,Description,Payment Method");
        assert_eq!(lines[1], "2024-06-03,expense,Food,12.75,\"Tacos, extra salsa\",card");
        assert_eq!(lines[2], "2024-06-01,income,Salary,3000.0,,cash");
    }

    #[test]
    fn test_empty_store_still_writes_header() {
        let mut buf = Vec::new();
        assert_eq!(write_csv(&[], &mut buf).unwrap(), 0);
        assert_eq!(String::from_utf8(buf).unwrap().trim_end(), CSV_HEADER.join(","));
    }

    #[test]
    fn test_read_back_matches_store() {
        let l = ledger();
        let mut buf = Vec::new();
        write_csv(l.transactions.as_slice(), &mut buf).unwrap();

        let rows = read_csv(buf.as_slice()).unwrap();
        assert_eq!(rows.len(), l.transactions.len());
        for (row, t) in rows.iter().zip(l.transactions.as_slice()) {
            assert_eq!(row.amount, t.amount);
            assert_eq!(row.date, t.date);
            assert_eq!(row.kind, t.kind);
            assert_eq!(row.description, t.description);
        }
    }

    #[test]
    fn test_read_rejects_foreign_header() {
        let input = "When,What\n2024-01-01,x\n";
        assert!(matches!(read_csv(input.as_bytes()), Err(TallyError::Persistence(_))));
    }

    #[test]
    fn test_default_export_name() {
        assert_eq!(default_export_name(d(2024, 6, 9), "csv"), "tally_2024-06-09.csv");
    }
}
