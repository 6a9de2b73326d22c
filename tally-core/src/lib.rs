//! tally-core: ledger types and the logic over them (category registry,
//! transaction store, recurrence, aggregation and budgets).

pub mod aggregate;
pub mod budget;
pub mod category;
pub mod error;
pub mod ledger;
pub mod month;
pub mod recurrence;
pub mod settings;
pub mod store;
pub mod time;
pub mod transaction;

pub use aggregate::{MonthlySummary, TrendPoint, category_breakdown, monthly_summary, trend};
pub use budget::{Budget, BudgetProgress, BudgetStatus, BudgetTracker};
pub use category::{Category, CategoryRegistry, Kind};
pub use error::TallyError;
pub use ledger::Ledger;
pub use month::YearMonth;
pub use recurrence::{Frequency, RecurrenceRule};
pub use settings::{Language, Settings, Theme, format_amount};
pub use store::{SortOrder, TransactionFilter, TransactionStore};
pub use transaction::{PaymentMethod, Transaction, TransactionDraft};
