//! Application state owned by the client and its rendering layer

use rust_decimal::Decimal;
use saldo_core::{
    apply_running_balances, balance_series, filter_by_date, BalancePoint, BalanceSummary,
    CoreResult, DateRange, EditSession, Transaction,
};

use crate::prefs::DisplayPreferences;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationLevel::Info => write!(f, "info"),
            NotificationLevel::Success => write!(f, "success"),
            NotificationLevel::Warning => write!(f, "warning"),
            NotificationLevel::Error => write!(f, "error"),
        }
    }
}

/// Transient message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// Everything the views render from
#[derive(Debug, Default)]
pub struct ClientState {
    /// Records in creation order, each carrying its running balance
    transactions: Vec<Transaction>,
    summary: BalanceSummary,
    pub edit: EditSession,
    pub filter: Option<DateRange>,
    pub preferences: DisplayPreferences,
    notifications: Vec<Notification>,
}

impl ClientState {
    pub fn new(preferences: DisplayPreferences) -> Self {
        Self {
            preferences,
            ..Default::default()
        }
    }

    /// Replace the cached records with the store's listing and recompute
    /// every derived field. The listing order is kept as is. When the
    /// balances cannot be computed the previous records stay in place.
    pub fn replace_transactions(&mut self, mut transactions: Vec<Transaction>) -> CoreResult<()> {
        apply_running_balances(&mut transactions)?;
        self.summary = BalanceSummary::from_transactions(&transactions)?;
        self.transactions = transactions;
        Ok(())
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn summary(&self) -> &BalanceSummary {
        &self.summary
    }

    pub fn current_balance(&self) -> Decimal {
        self.summary.final_balance
    }

    pub fn find(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.id == id)
    }

    /// History rows, newest first, restricted to the active filter
    pub fn history(&self) -> Vec<Transaction> {
        let mut rows = match self.filter {
            Some(ref range) => filter_by_date(&self.transactions, range),
            None => self.transactions.clone(),
        };
        rows.reverse();
        rows
    }

    /// Management rows: every record, newest first
    pub fn manage_rows(&self) -> Vec<&Transaction> {
        self.transactions.iter().rev().collect()
    }

    /// Balance after each record, for the balance chart
    pub fn balance_series(&self) -> Vec<BalancePoint> {
        balance_series(&self.transactions)
    }

    /// Income and expense totals, for the split chart
    pub fn income_expense_split(&self) -> (Decimal, Decimal) {
        (self.summary.total_income, self.summary.total_expense)
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.push(Notification {
            level,
            message: message.into(),
        });
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Take pending notifications, leaving none behind
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use saldo_core::TransactionType;

    fn tx(id: &str, kind: TransactionType, amount: i64, date_iso: &str) -> Transaction {
        let now = Utc::now();
        Transaction {
            id: id.to_string(),
            date: date_iso.to_string(),
            date_iso: date_iso.to_string(),
            kind,
            amount: Decimal::from(amount),
            description: id.to_string(),
            created_at: now,
            updated_at: now,
            balance: None,
        }
    }

    fn state() -> ClientState {
        let mut state = ClientState::default();
        state.replace_transactions(vec![
            tx("a", TransactionType::Income, 100000, "2023-12-31"),
            tx("b", TransactionType::Income, 50000, "2024-01-15"),
            tx("c", TransactionType::Expense, 30000, "2024-02-01"),
        ])
        .unwrap();
        state
    }

    #[test]
    fn test_replace_runs_balance_engine() {
        let state = state();
        let balances: Vec<_> = state.transactions().iter().map(|t| t.balance).collect();
        assert_eq!(
            balances,
            vec![
                Some(Decimal::from(100000)),
                Some(Decimal::from(150000)),
                Some(Decimal::from(120000))
            ]
        );
        assert_eq!(state.current_balance(), Decimal::from(120000));
        assert_eq!(state.income_expense_split(), (Decimal::from(150000), Decimal::from(30000)));
        assert_eq!(state.balance_series().len(), 3);
    }

    #[test]
    fn test_history_is_newest_first_and_filtered() {
        let mut state = state();
        let ids: Vec<String> = state.history().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);

        state.filter = Some(DateRange::parse("2024-01-01", "2024-01-31").unwrap());
        let history = state.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, "b");
        assert_eq!(history[0].balance, Some(Decimal::from(150000)));

        // management view ignores the filter
        assert_eq!(state.manage_rows().len(), 3);
        assert_eq!(state.manage_rows()[0].id, "c");
    }

    #[test]
    fn test_notifications_drain() {
        let mut state = ClientState::default();
        state.notify(NotificationLevel::Error, "boom");
        assert_eq!(state.notifications().len(), 1);

        let drained = state.drain_notifications();
        assert_eq!(drained[0].level, NotificationLevel::Error);
        assert_eq!(drained[0].level.to_string(), "error");
        assert!(state.notifications().is_empty());
    }

    #[test]
    fn test_overflowing_listing_keeps_previous_records() {
        let mut state = state();
        let huge = Decimal::from_str_exact("70000000000000000000000000000").unwrap();
        let mut a = tx("x", TransactionType::Income, 1, "2024-03-01");
        let mut b = tx("y", TransactionType::Income, 1, "2024-03-02");
        a.amount = huge;
        b.amount = huge;

        assert!(state.replace_transactions(vec![a, b]).is_err());
        assert_eq!(state.transactions().len(), 3);
        assert_eq!(state.current_balance(), Decimal::from(120000));
    }
}
