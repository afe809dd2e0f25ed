//! Date-range filtering over the in-memory record sequence

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::models::{Transaction, ISO_DATE_FORMAT};

/// Inclusive closed interval of calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Build a range from two `YYYY-MM-DD` inputs; both bounds are required
    pub fn parse(start: &str, end: &str) -> CoreResult<Self> {
        let (start, end) = (start.trim(), end.trim());
        if start.is_empty() || end.is_empty() {
            return Err(CoreError::validation("Select a date range"));
        }
        Ok(Self {
            start: parse_bound(start)?,
            end: parse_bound(end)?,
        })
    }

    /// Check if a date is within the range
    pub fn contains(&self, date: &NaiveDate) -> bool {
        *date >= self.start && *date <= self.end
    }

    /// Get a human-readable description of the range
    pub fn description(&self) -> String {
        format!("{} to {}", self.start, self.end)
    }
}

fn parse_bound(value: &str) -> CoreResult<NaiveDate> {
    NaiveDate::parse_from_str(value, ISO_DATE_FORMAT)
        .map_err(|_| CoreError::validation(format!("'{}' is not a YYYY-MM-DD date", value)))
}

/// Date filtering trait
pub trait DateFilter {
    /// Whether the item falls inside the range
    fn within(&self, range: &DateRange) -> bool;
}

impl DateFilter for Transaction {
    fn within(&self, range: &DateRange) -> bool {
        // records whose dateISO does not parse are never in range
        self.date_naive().map_or(false, |date| range.contains(&date))
    }
}

/// Records inside the range, in their original order
pub fn filter_by_date(transactions: &[Transaction], range: &DateRange) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|tx| tx.within(range))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionType;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn dated(id: &str, date_iso: &str) -> Transaction {
        let now = Utc::now();
        Transaction {
            id: id.to_string(),
            date: String::new(),
            date_iso: date_iso.to_string(),
            kind: TransactionType::Income,
            amount: Decimal::ONE,
            description: String::new(),
            created_at: now,
            updated_at: now,
            balance: None,
        }
    }

    #[test]
    fn test_january_filter() {
        let txs = vec![
            dated("a", "2023-12-31"),
            dated("b", "2024-01-15"),
            dated("c", "2024-02-01"),
        ];
        let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();
        let filtered = filter_by_date(&txs, &range);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "b");
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let txs = vec![dated("a", "2024-01-01"), dated("b", "2024-01-31")];
        let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();
        assert_eq!(filter_by_date(&txs, &range).len(), 2);
    }

    #[test]
    fn test_missing_bound_is_rejected() {
        assert!(matches!(
            DateRange::parse("", "2024-01-31"),
            Err(CoreError::ValidationError { .. })
        ));
        assert!(DateRange::parse("2024-01-01", " ").is_err());
        assert!(DateRange::parse("01/01/2024", "2024-01-31").is_err());
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let txs = vec![dated("a", "2024-01-15")];
        let range = DateRange::parse("2024-01-31", "2024-01-01").unwrap();
        assert!(filter_by_date(&txs, &range).is_empty());
    }

    #[test]
    fn test_unparsable_date_excluded() {
        let txs = vec![dated("a", "not-a-date"), dated("b", "2024-01-10")];
        let range = DateRange::parse("2000-01-01", "2100-01-01").unwrap();
        let filtered = filter_by_date(&txs, &range);
        assert_eq!(filtered.len(), 1);
        assert_eq!(range.description(), "2000-01-01 to 2100-01-01");
    }
}
