//! Controller tying the store client, application state and preferences together
//!
//! Every store interaction is awaited in place. Failures are logged through
//! the error logger and turned into notifications; none of them is fatal.
//! After a successful write the collection is fetched again so the cached
//! records always mirror the store.

use chrono::{Local, NaiveDate};
use saldo_config::Config;
use saldo_core::export::{export_all_file_name, export_range_file_name};
use saldo_core::{
    CoreError, CoreResult, CsvSheetWriter, DateRange, DefaultErrorLogger, ErrorContext,
    ErrorLogger, ErrorSeverity, ExportRow, NewTransaction, SheetWriter, SubmitAction, Transaction,
    TransactionType,
};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::http::{ApiRef, HttpStoreClient};
use crate::prefs::{DisplayPreferences, FilePreferences, PreferenceStore};
use crate::state::{ClientState, NotificationLevel};

pub const LOAD_FAILED: &str = "Failed to load data from server.";
pub const SAVE_FAILED: &str = "Failed to save the transaction.";
pub const DELETE_FAILED: &str = "Failed to delete the transaction.";
pub const CLEAR_FAILED: &str = "Failed to clear the history.";
pub const EDIT_TARGET_GONE: &str =
    "The transaction being edited no longer exists; it may have been deleted elsewhere.";
pub const BALANCE_FAILED: &str = "Balances could not be computed from the stored amounts.";

/// The client application
pub struct FinanceApp {
    api: ApiRef,
    prefs: Arc<dyn PreferenceStore>,
    logger: Arc<dyn ErrorLogger>,
    date_format: String,
    state: ClientState,
}

impl FinanceApp {
    pub fn new(api: ApiRef, prefs: Arc<dyn PreferenceStore>, date_format: impl Into<String>) -> Self {
        let preferences = DisplayPreferences::load(prefs.as_ref());
        Self {
            api,
            prefs,
            logger: Arc::new(DefaultErrorLogger),
            date_format: date_format.into(),
            state: ClientState::new(preferences),
        }
    }

    /// Build the HTTP-backed application described by the client config section
    pub fn from_config(config: &Config) -> CoreResult<Self> {
        let api: ApiRef = Arc::new(HttpStoreClient::new(&config.client.server_url));
        let prefs: Arc<dyn PreferenceStore> =
            Arc::new(FilePreferences::open(&config.client.preferences_path)?);
        Ok(Self::new(api, prefs, config.client.date_format.clone()))
    }

    pub fn with_logger(mut self, logger: Arc<dyn ErrorLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ClientState {
        &mut self.state
    }

    /// Fetch the collection and recompute balances
    pub async fn refresh(&mut self) -> bool {
        match self.api.list().await {
            Ok(transactions) => {
                log::debug!("loaded {} transactions", transactions.len());
                match self.state.replace_transactions(transactions) {
                    Ok(()) => true,
                    Err(e) => {
                        self.fail(e, ErrorContext::new("refresh"), BALANCE_FAILED);
                        false
                    }
                }
            }
            Err(e) => {
                self.fail(e, ErrorContext::new("refresh"), LOAD_FAILED);
                false
            }
        }
    }

    /// Put user input into the form of the given type
    pub fn fill_form(&mut self, kind: TransactionType, amount: &str, description: &str) {
        let form = self.state.edit.form_mut(kind);
        form.amount = amount.to_string();
        form.description = description.to_string();
    }

    /// Fill the form and submit it, dating new records today
    pub async fn submit(&mut self, kind: TransactionType, amount: &str, description: &str) -> bool {
        self.fill_form(kind, amount, description);
        self.submit_form(kind, Local::now().date_naive()).await
    }

    /// Submit whatever the form of `kind` holds.
    ///
    /// In normal mode this creates a record dated `today`; in edit mode it
    /// updates amount and description of the target. Invalid input is
    /// reported without touching the store. A failed write keeps the edit
    /// session and form input so the user can retry, unless the edited
    /// record is gone from the store; then edit mode ends and the list is
    /// fetched again.
    pub async fn submit_form(&mut self, kind: TransactionType, today: NaiveDate) -> bool {
        if !self.state.edit.form(kind).enabled {
            self.state
                .notify(NotificationLevel::Warning, "Finish or cancel the current edit first");
            return false;
        }

        let action = match self.state.edit.prepare_submit(kind) {
            Ok(action) => action,
            Err(e) => {
                self.state.notify(NotificationLevel::Warning, e.user_message());
                return false;
            }
        };

        let (result, context, done) = match action {
            SubmitAction::Create {
                kind,
                amount,
                description,
            } => {
                let new = NewTransaction::dated(kind, amount, &description, today, &self.date_format);
                let result = self.api.create(&new).await;
                (result, ErrorContext::new("create"), "Transaction added")
            }
            SubmitAction::Update { id, patch } => {
                let result = self.api.update(&id, &patch).await;
                (
                    result,
                    ErrorContext::new("update").with_record_id(id),
                    "Transaction updated",
                )
            }
        };

        match result {
            Ok(saved) => {
                log::info!("saved {} {}", saved.kind, saved.id);
                self.state.edit.finish_submit();
                self.state.notify(NotificationLevel::Success, done);
                self.refresh().await;
                true
            }
            Err(e @ CoreError::TransactionNotFound { .. }) => {
                self.state.edit.cancel();
                self.fail(e, context, EDIT_TARGET_GONE);
                self.refresh().await;
                false
            }
            Err(e) => {
                self.fail(e, context, SAVE_FAILED);
                false
            }
        }
    }

    /// Enter edit mode for a cached record
    pub fn begin_edit(&mut self, id: &str) -> bool {
        let record = match self.state.find(id) {
            Some(record) => record.clone(),
            None => {
                self.state
                    .notify(NotificationLevel::Warning, format!("Transaction {} not found", id));
                return false;
            }
        };

        if let Some(previous) = self.state.edit.begin_edit(record) {
            if previous.id != id {
                self.logger.log_warning(
                    &format!("unsaved edit of {} discarded", previous.id),
                    &ErrorContext::new("begin_edit").with_record_id(id),
                );
            }
        }
        true
    }

    pub fn cancel_edit(&mut self) -> Option<Transaction> {
        self.state.edit.cancel()
    }

    pub async fn delete(&mut self, id: &str) -> bool {
        match self.api.delete(id).await {
            Ok(()) => {
                if self.state.edit.target().map(|tx| tx.id.as_str()) == Some(id) {
                    self.state.edit.cancel();
                }
                self.state.notify(NotificationLevel::Success, "Transaction deleted");
                self.refresh().await;
                true
            }
            Err(e) => {
                self.fail(e, ErrorContext::new("delete").with_record_id(id), DELETE_FAILED);
                false
            }
        }
    }

    /// Remove every record from the store
    pub async fn clear_history(&mut self) -> bool {
        match self.api.delete_all().await {
            Ok(()) => {
                self.state.edit.cancel();
                self.state.notify(NotificationLevel::Success, "History cleared");
                self.refresh().await;
                true
            }
            Err(e) => {
                self.fail(e, ErrorContext::new("clear_history"), CLEAR_FAILED);
                false
            }
        }
    }

    /// Restrict the history view to `[start, end]`
    pub fn apply_filter(&mut self, start: &str, end: &str) -> bool {
        match DateRange::parse(start, end) {
            Ok(range) => {
                self.state.filter = Some(range);
                if self.state.history().is_empty() {
                    self.state.notify(
                        NotificationLevel::Info,
                        format!("No transactions from {}", range.description()),
                    );
                }
                true
            }
            Err(e) => {
                self.state.notify(NotificationLevel::Warning, e.user_message());
                false
            }
        }
    }

    pub fn reset_filter(&mut self) {
        self.state.filter = None;
    }

    /// Write every record to `ledger_all_<today>.csv` inside `dir`
    pub fn export_all(&mut self, dir: &Path, today: NaiveDate) -> Option<PathBuf> {
        let rows = saldo_core::export::export_all(self.state.transactions());
        self.export(rows, dir.join(export_all_file_name(today)))
    }

    /// Write the records inside `[start, end]` to `history_<start>_<end>.csv`
    pub fn export_range(&mut self, start: &str, end: &str, dir: &Path) -> Option<PathBuf> {
        let range = match DateRange::parse(start, end) {
            Ok(range) => range,
            Err(e) => {
                self.state.notify(NotificationLevel::Warning, e.user_message());
                return None;
            }
        };
        let rows = saldo_core::export::export_range(self.state.transactions(), &range);
        self.export(rows, dir.join(export_range_file_name(&range)))
    }

    fn export(&mut self, rows: CoreResult<Vec<ExportRow>>, path: PathBuf) -> Option<PathBuf> {
        let written = rows.and_then(|rows| write_sheet(&path, &rows));
        match written {
            Ok(count) => {
                log::info!("exported {} rows to {}", count, path.display());
                self.state.notify(
                    NotificationLevel::Success,
                    format!("Exported {} rows to {}", count, path.display()),
                );
                Some(path)
            }
            Err(e) => {
                let context = ErrorContext::new("export")
                    .with_data("path", serde_json::json!(path.display().to_string()));
                self.fail(e, context, "Export failed.");
                None
            }
        }
    }

    /// Flip dark mode and persist the new value; returns the new value
    pub fn toggle_dark_mode(&mut self) -> bool {
        let preferences = &mut self.state.preferences;
        preferences.dark_mode = !preferences.dark_mode;
        let preferences = *preferences;

        if let Err(e) = preferences.save(self.prefs.as_ref()) {
            self.fail(e, ErrorContext::new("toggle_dark_mode"), "Could not save preferences.");
        }
        preferences.dark_mode
    }

    fn fail(&mut self, error: CoreError, context: ErrorContext, message: &str) {
        let level = match error.severity() {
            ErrorSeverity::Info | ErrorSeverity::Warning => {
                self.logger.log_warning(&error.to_string(), &context);
                NotificationLevel::Warning
            }
            ErrorSeverity::Error | ErrorSeverity::Critical => {
                self.logger.log_error(&error, &context);
                NotificationLevel::Error
            }
        };
        let message = match &error {
            CoreError::ValidationError { .. } => error.user_message(),
            _ => message.to_string(),
        };
        self.state.notify(level, message);
    }
}

fn write_sheet(path: &Path, rows: &[ExportRow]) -> CoreResult<usize> {
    let mut writer = CsvSheetWriter::new(File::create(path)?);
    let count = writer.write_rows(rows)?;
    writer.into_inner()?;
    Ok(count)
}

trait UserMessage {
    fn user_message(&self) -> String;
}

impl UserMessage for CoreError {
    /// Validation messages are shown as written; everything else uses Display
    fn user_message(&self) -> String {
        match self {
            CoreError::ValidationError { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::{MemoryPreferences, DARK_MODE_KEY};
    use crate::state::Notification;
    use crate::test_support::{spawn_server, unreachable_url};
    use rust_decimal::Decimal;
    use saldo_core::FormMode;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    async fn app() -> FinanceApp {
        let api: ApiRef = Arc::new(HttpStoreClient::new(&spawn_server().await));
        FinanceApp::new(api, Arc::new(MemoryPreferences::default()), "%-d/%-m/%Y")
    }

    async fn add(app: &mut FinanceApp, kind: TransactionType, amount: &str, on: &str) -> bool {
        app.fill_form(kind, amount, "");
        app.submit_form(kind, date(on)).await
    }

    fn last(app: &FinanceApp) -> Notification {
        app.state().notifications().last().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_running_balances_through_store() {
        let mut app = app().await;
        assert!(add(&mut app, TransactionType::Income, "100000", "2024-01-01").await);
        assert!(add(&mut app, TransactionType::Income, "50000", "2024-01-02").await);
        assert!(add(&mut app, TransactionType::Expense, "30000", "2024-01-03").await);

        let balances: Vec<_> = app.state().transactions().iter().map(|t| t.balance).collect();
        assert_eq!(
            balances,
            vec![
                Some(Decimal::from(100000)),
                Some(Decimal::from(150000)),
                Some(Decimal::from(120000))
            ]
        );
        assert_eq!(app.state().current_balance(), Decimal::from(120000));

        let first = &app.state().transactions()[0];
        assert_eq!(first.date, "1/1/2024");
        assert_eq!(first.date_iso, "2024-01-01");
        assert_eq!(first.description, "(no desc)");
        assert_eq!(last(&app).level, NotificationLevel::Success);
    }

    #[tokio::test]
    async fn test_invalid_amount_never_writes() {
        let mut app = app().await;
        for input in ["0", "-5", "abc", ""] {
            assert!(!app.submit(TransactionType::Income, input, "x").await);
            assert_eq!(last(&app).level, NotificationLevel::Warning);
        }

        assert!(app.refresh().await);
        assert!(app.state().transactions().is_empty());
    }

    #[tokio::test]
    async fn test_edit_updates_amount_and_description() {
        let mut app = app().await;
        app.fill_form(TransactionType::Expense, "30000", "Groceries");
        assert!(app.submit_form(TransactionType::Expense, date("2024-01-03")).await);
        let id = app.state().transactions()[0].id.clone();

        assert!(app.begin_edit(&id));
        let session = &app.state().edit;
        assert_eq!(session.expense.amount, "30000");
        assert_eq!(session.expense.mode, FormMode::SaveChanges);
        assert!(!session.income.enabled);

        // the disabled form cannot submit
        assert!(!app.submit(TransactionType::Income, "1", "x").await);

        app.state_mut().edit.expense.amount = "45000".to_string();
        assert!(app.submit_form(TransactionType::Expense, date("2024-02-01")).await);

        let updated = &app.state().transactions()[0];
        assert_eq!(updated.id, id);
        assert_eq!(updated.amount, Decimal::from(45000));
        assert_eq!(updated.description, "Groceries");
        assert_eq!(updated.date_iso, "2024-01-03");
        assert!(!app.state().edit.is_editing());
        assert!(app.state().edit.income.enabled);
    }

    #[tokio::test]
    async fn test_begin_edit_unknown_id() {
        let mut app = app().await;
        assert!(!app.begin_edit("missing"));
        assert!(!app.state().edit.is_editing());
    }

    #[tokio::test]
    async fn test_delete_and_clear_history() {
        let mut app = app().await;
        for (amount, on) in [("1", "2024-01-01"), ("2", "2024-01-02"), ("3", "2024-01-03")] {
            add(&mut app, TransactionType::Income, amount, on).await;
        }

        let id = app.state().transactions()[0].id.clone();
        assert!(app.begin_edit(&id));
        assert!(app.delete(&id).await);
        assert_eq!(app.state().transactions().len(), 2);
        assert!(!app.state().edit.is_editing());

        assert!(app.clear_history().await);
        assert!(app.state().transactions().is_empty());
        assert_eq!(app.state().current_balance(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_filter_history() {
        let mut app = app().await;
        add(&mut app, TransactionType::Income, "1", "2023-12-31").await;
        add(&mut app, TransactionType::Income, "2", "2024-01-15").await;
        add(&mut app, TransactionType::Expense, "1", "2024-02-01").await;

        assert!(!app.apply_filter("2024-01-01", ""));
        assert_eq!(last(&app).message, "Select a date range");
        assert!(app.state().filter.is_none());

        assert!(app.apply_filter("2024-01-01", "2024-01-31"));
        let history = app.state().history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].date_iso, "2024-01-15");

        app.reset_filter();
        assert_eq!(app.state().history().len(), 3);
    }

    #[tokio::test]
    async fn test_export_files() {
        let mut app = app().await;
        let dir = tempfile::tempdir().unwrap();

        assert!(app.export_all(dir.path(), date("2024-03-01")).is_none());
        assert_eq!(last(&app).level, NotificationLevel::Warning);

        add(&mut app, TransactionType::Income, "100000", "2024-01-15").await;
        add(&mut app, TransactionType::Expense, "30000", "2024-02-01").await;

        let path = app.export_all(dir.path(), date("2024-03-01")).unwrap();
        assert!(path.ends_with("ledger_all_2024-03-01.csv"));
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Date,Description,Income,Expense,Balance");
        assert_eq!(lines.len(), 3);
        assert!(lines[2].ends_with(",0,30000,70000"));

        let path = app
            .export_range("2024-01-01", "2024-01-31", dir.path())
            .unwrap();
        assert!(path.ends_with("history_2024-01-01_2024-01-31.csv"));
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 2);

        assert!(app.export_range("2025-01-01", "2025-01-31", dir.path()).is_none());
    }

    #[tokio::test]
    async fn test_dark_mode_toggle_persists() {
        let prefs = Arc::new(MemoryPreferences::default());
        let api: ApiRef = Arc::new(HttpStoreClient::new(&unreachable_url().await));
        let mut app = FinanceApp::new(api.clone(), prefs.clone(), "%-d/%-m/%Y");
        assert!(app.state().preferences.dark_mode);

        assert!(!app.toggle_dark_mode());
        assert_eq!(prefs.get(DARK_MODE_KEY).as_deref(), Some("false"));

        let reloaded = FinanceApp::new(api, prefs, "%-d/%-m/%Y");
        assert!(!reloaded.state().preferences.dark_mode);
    }

    #[tokio::test]
    async fn test_unreachable_server_notifies() {
        let api: ApiRef = Arc::new(HttpStoreClient::new(&unreachable_url().await));
        let mut app = FinanceApp::new(api, Arc::new(MemoryPreferences::default()), "%-d/%-m/%Y");

        assert!(!app.refresh().await);
        let notification = last(&app);
        assert_eq!(notification.level, NotificationLevel::Error);
        assert_eq!(notification.message, LOAD_FAILED);

        // input survives a failed save for retry
        assert!(!app.submit(TransactionType::Income, "500", "Gift").await);
        assert_eq!(last(&app).message, SAVE_FAILED);
        assert_eq!(app.state().edit.income.amount, "500");
    }

    #[tokio::test]
    async fn test_edit_of_record_deleted_elsewhere() {
        let url = spawn_server().await;
        let api: ApiRef = Arc::new(HttpStoreClient::new(&url));
        let mut app = FinanceApp::new(api.clone(), Arc::new(MemoryPreferences::default()), "%-d/%-m/%Y");
        add(&mut app, TransactionType::Income, "100", "2024-01-01").await;
        let id = app.state().transactions()[0].id.clone();

        assert!(app.begin_edit(&id));
        api.delete(&id).await.unwrap();

        app.state_mut().edit.income.amount = "200".to_string();
        assert!(!app.submit_form(TransactionType::Income, date("2024-01-02")).await);
        assert!(app
            .state()
            .notifications()
            .iter()
            .any(|n| n.message == EDIT_TARGET_GONE && n.level == NotificationLevel::Warning));
        assert!(!app.state().edit.is_editing());
        assert!(app.state().edit.expense.enabled);
        assert!(app.state().transactions().is_empty());
    }

    #[tokio::test]
    async fn test_overflowing_amounts_do_not_panic() {
        let url = spawn_server().await;
        let api: ApiRef = Arc::new(HttpStoreClient::new(&url));
        let huge = NewTransaction {
            date: "1/1/2024".to_string(),
            date_iso: "2024-01-01".to_string(),
            kind: TransactionType::Income,
            amount: Decimal::from_str_exact("70000000000000000000000000000").unwrap(),
            description: "huge".to_string(),
        };
        api.create(&huge).await.unwrap();
        api.create(&huge).await.unwrap();

        let mut app = FinanceApp::new(api, Arc::new(MemoryPreferences::default()), "%-d/%-m/%Y");
        assert!(!app.refresh().await);
        let notification = last(&app);
        assert_eq!(notification.level, NotificationLevel::Error);
        assert_eq!(notification.message, BALANCE_FAILED);
        assert!(app.state().transactions().is_empty());
    }
}
