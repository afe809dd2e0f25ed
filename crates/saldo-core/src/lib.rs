//! Transaction model and the client-side logic derived from it
//!
//! - models/types: the record as stored and exchanged over the wire
//! - balance: running balance engine and summaries
//! - filter: inclusive date-range filtering
//! - export: tabular rows and the sheet writer seam
//! - edit: edit-mode state machine for the entry forms

pub mod balance;
pub mod edit;
pub mod error;
pub mod export;
pub mod filter;
pub mod models;
pub mod types;

pub use balance::{apply_running_balances, balance_series, BalancePoint, BalanceSign, BalanceSummary};
pub use edit::{EditSession, EditState, EntryForm, FormMode, SubmitAction};
pub use error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger, ErrorSeverity};
pub use export::{CsvSheetWriter, ExportRow, SheetWriter};
pub use filter::{filter_by_date, DateFilter, DateRange};
pub use models::{description_or_placeholder, parse_amount, NewTransaction, Transaction, TransactionPatch};
pub use types::TransactionType;
