//! Core data models for transaction records

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::TransactionType;

/// Description stored when the user leaves the field empty
pub const EMPTY_DESCRIPTION: &str = "(no desc)";

/// Format of the `dateISO` field
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// A stored income or expense record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Store-assigned identifier
    #[serde(alias = "_id")]
    pub id: String,
    /// Localized, human-readable date
    pub date: String,
    /// Calendar date (YYYY-MM-DD)
    #[serde(rename = "dateISO")]
    pub date_iso: String,
    /// Income or expense
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Positive magnitude.
    ///
    /// Travels over the wire as a JSON number (an `f64`), so only about 15
    /// significant digits survive a round trip; `12345678901234567.89` comes
    /// back as `12345678901234568`.
    pub amount: Decimal,
    /// Free-text label
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Running balance after this record; derived, never persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<Decimal>,
}

impl Transaction {
    /// Get the `dateISO` field as NaiveDate
    pub fn date_naive(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date_iso, ISO_DATE_FORMAT).ok()
    }

    /// Amount with the sign it contributes to the balance
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    /// Replace the fields present in `patch`; the identifier never changes
    pub fn apply_patch(&mut self, patch: &TransactionPatch) {
        if let Some(ref date) = patch.date {
            self.date = date.clone();
        }
        if let Some(ref date_iso) = patch.date_iso {
            self.date_iso = date_iso.clone();
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(ref description) = patch.description {
            self.description = description.clone();
        }
    }

    /// Strip derived fields before the record is written anywhere
    pub fn without_balance(mut self) -> Self {
        self.balance = None;
        self
    }
}

/// Body of a create call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub date: String,
    #[serde(rename = "dateISO")]
    pub date_iso: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Decimal,
    pub description: String,
}

impl NewTransaction {
    /// Build a record dated `on`, with the localized date rendered using
    /// `date_format`
    pub fn dated(
        kind: TransactionType,
        amount: Decimal,
        description: &str,
        on: NaiveDate,
        date_format: &str,
    ) -> Self {
        Self {
            date: saldo_utils::format_local_date(on, date_format),
            date_iso: on.format(ISO_DATE_FORMAT).to_string(),
            kind,
            amount,
            description: description_or_placeholder(description),
        }
    }

    /// Check the shape of the record; amount sign is not checked here
    pub fn validate_shape(&self) -> CoreResult<()> {
        if self.date.trim().is_empty() {
            return Err(CoreError::validation("date must not be empty"));
        }
        validate_iso_date(&self.date_iso)
    }
}

/// Body of an update call; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransactionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "dateISO", default, skip_serializing_if = "Option::is_none")]
    pub date_iso: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TransactionPatch {
    /// The patch sent when an edit is submitted: amount and description only
    pub fn amount_and_description(amount: Decimal, description: &str) -> Self {
        Self {
            amount: Some(amount),
            description: Some(description_or_placeholder(description)),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.date_iso.is_none()
            && self.kind.is_none()
            && self.amount.is_none()
            && self.description.is_none()
    }

    /// Check the shape of the fields that are present
    pub fn validate_shape(&self) -> CoreResult<()> {
        if let Some(ref date) = self.date {
            if date.trim().is_empty() {
                return Err(CoreError::validation("date must not be empty"));
            }
        }
        if let Some(ref date_iso) = self.date_iso {
            validate_iso_date(date_iso)?;
        }
        Ok(())
    }
}

fn validate_iso_date(value: &str) -> CoreResult<()> {
    NaiveDate::parse_from_str(value, ISO_DATE_FORMAT)
        .map(|_| ())
        .map_err(|_| CoreError::validation(format!("dateISO '{}' is not a YYYY-MM-DD date", value)))
}

/// Parse a user-entered amount; zero, negative, or unparsable input is rejected
pub fn parse_amount(input: &str) -> CoreResult<Decimal> {
    let amount = input
        .trim()
        .parse::<Decimal>()
        .unwrap_or(Decimal::ZERO);
    if amount <= Decimal::ZERO {
        return Err(CoreError::validation("Amount must be greater than 0"));
    }
    Ok(amount)
}

/// Use the placeholder when the description is blank; other text is kept as typed
pub fn description_or_placeholder(input: &str) -> String {
    if input.trim().is_empty() {
        EMPTY_DESCRIPTION.to_string()
    } else {
        input.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample() -> Transaction {
        let now = Utc::now();
        Transaction {
            id: "t-1".to_string(),
            date: "15/1/2024".to_string(),
            date_iso: "2024-01-15".to_string(),
            kind: TransactionType::Expense,
            amount: Decimal::from(30000),
            description: "Groceries".to_string(),
            created_at: now,
            updated_at: now,
            balance: None,
        }
    }

    #[test]
    fn test_transaction_wire_names() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["dateISO"], "2024-01-15");
        assert_eq!(value["type"], "expense");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("balance").is_none());
    }

    #[test]
    fn test_transaction_accepts_underscore_id() {
        let json = r#"{
            "_id": "65a1", "date": "1/2/2024", "dateISO": "2024-02-01",
            "type": "income", "amount": 100000, "description": "Salary",
            "createdAt": "2024-02-01T08:00:00Z", "updatedAt": "2024-02-01T08:00:00Z"
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.id, "65a1");
        assert_eq!(tx.amount, Decimal::from(100000));
        assert!(tx.is_income());
    }

    #[test]
    fn test_signed_amount() {
        let mut tx = sample();
        assert_eq!(tx.signed_amount(), Decimal::from(-30000));
        tx.kind = TransactionType::Income;
        assert_eq!(tx.signed_amount(), Decimal::from(30000));
    }

    #[test]
    fn test_apply_patch_only_touches_present_fields() {
        let mut tx = sample();
        let patch = TransactionPatch {
            amount: Some(Decimal::from(45000)),
            ..Default::default()
        };
        tx.apply_patch(&patch);

        assert_eq!(tx.amount, Decimal::from(45000));
        assert_eq!(tx.description, "Groceries");
        assert_eq!(tx.kind, TransactionType::Expense);
        assert_eq!(tx.id, "t-1");
    }

    #[test]
    fn test_patch_rejects_unknown_fields() {
        let result: Result<TransactionPatch, _> = serde_json::from_str(r#"{"id": "x"}"#);
        assert!(result.is_err());

        let patch: TransactionPatch = serde_json::from_str(r#"{"amount": 10}"#).unwrap();
        assert_eq!(patch.amount, Some(Decimal::from(10)));
        assert!(!patch.is_empty());
        assert!(TransactionPatch::default().is_empty());
    }

    #[test]
    fn test_new_transaction_shape() {
        let on = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let new = NewTransaction::dated(TransactionType::Income, Decimal::from(10), "", on, "%-d/%-m/%Y");
        assert_eq!(new.date, "5/1/2024");
        assert_eq!(new.date_iso, "2024-01-05");
        assert_eq!(new.description, EMPTY_DESCRIPTION);
        assert!(new.validate_shape().is_ok());

        let mut bad = new.clone();
        bad.date_iso = "2024-13-01".to_string();
        assert!(bad.validate_shape().is_err());

        let mut bad = new;
        bad.date = " ".to_string();
        assert!(bad.validate_shape().is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("100000").unwrap(), Decimal::from(100000));
        assert_eq!(parse_amount(" 12.5 ").unwrap(), Decimal::from_str("12.5").unwrap());
        assert!(parse_amount("0").is_err());
        assert!(parse_amount("-5").is_err());
        assert!(parse_amount("").is_err());
        assert!(parse_amount("abc").is_err());
    }

    #[test]
    fn test_description_placeholder() {
        assert_eq!(description_or_placeholder("  "), "(no desc)");
        assert_eq!(description_or_placeholder(" Rent "), " Rent ");
        assert_eq!(description_or_placeholder(""), "(no desc)");
    }

    #[test]
    fn test_amount_travels_as_json_number() {
        let json = serde_json::json!({
            "id": "a",
            "date": "1/1/2024",
            "dateISO": "2024-01-01",
            "type": "income",
            "amount": 120000,
            "description": "x",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z",
        });
        let mut tx: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(tx.amount, Decimal::from(120000));
        assert!(serde_json::to_value(&tx).unwrap()["amount"].is_number());

        // beyond f64 precision the digits do not survive
        tx.amount = Decimal::from_str("12345678901234567.89").unwrap();
        let back: Transaction = serde_json::from_value(serde_json::to_value(&tx).unwrap()).unwrap();
        assert_ne!(back.amount, tx.amount);
    }
}
