//! tally-io: the on-disk side of the ledger: JSON data file and exports.

pub mod export;
pub mod persist;

pub use export::{CsvRow, default_export_name, export_csv, export_json, ledger_to_json, read_csv, write_csv};
pub use persist::{load_ledger, parse_ledger, save_ledger};
