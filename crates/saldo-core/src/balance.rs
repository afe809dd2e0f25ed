//! Running balance computation
//!
//! The engine walks records in the order it is given (ascending creation
//! order, as listed by the store) and annotates each one with the balance
//! after applying it. It never reorders its input.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::models::Transaction;

fn add(total: Decimal, amount: Decimal, tx: &Transaction) -> CoreResult<Decimal> {
    total.checked_add(amount).ok_or_else(|| CoreError::InvalidFormat {
        message: format!("balance overflows at transaction {} ({})", tx.id, tx.amount),
    })
}

/// Annotate every record with its running balance and return the final one.
///
/// Fails when a sum leaves the `Decimal` range; records are left without a
/// balance in that case.
pub fn apply_running_balances(transactions: &mut [Transaction]) -> CoreResult<Decimal> {
    let mut balance = Decimal::ZERO;
    let mut balances = Vec::with_capacity(transactions.len());
    for tx in transactions.iter() {
        balance = add(balance, tx.signed_amount(), tx)?;
        balances.push(balance);
    }
    for (tx, balance) in transactions.iter_mut().zip(balances) {
        tx.balance = Some(balance);
    }
    Ok(balance)
}

/// Sign of the final balance, drives how the summary is highlighted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceSign {
    Positive,
    Negative,
    Zero,
}

/// Totals over a record sequence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceSummary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub final_balance: Decimal,
    pub count: usize,
}

impl BalanceSummary {
    pub fn from_transactions(transactions: &[Transaction]) -> CoreResult<Self> {
        let mut summary = BalanceSummary::default();
        for tx in transactions {
            if tx.is_income() {
                summary.total_income = add(summary.total_income, tx.amount, tx)?;
            } else {
                summary.total_expense = add(summary.total_expense, tx.amount, tx)?;
            }
            summary.final_balance = add(summary.final_balance, tx.signed_amount(), tx)?;
            summary.count += 1;
        }
        Ok(summary)
    }

    pub fn sign(&self) -> BalanceSign {
        if self.final_balance > Decimal::ZERO {
            BalanceSign::Positive
        } else if self.final_balance < Decimal::ZERO {
            BalanceSign::Negative
        } else {
            BalanceSign::Zero
        }
    }
}

/// One point of the balance-over-time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalancePoint {
    pub label: String,
    pub balance: Decimal,
}

/// Balance after each record, labelled with the record's display date.
/// Records that have not been through `apply_running_balances` are skipped.
pub fn balance_series(transactions: &[Transaction]) -> Vec<BalancePoint> {
    transactions
        .iter()
        .filter_map(|tx| {
            tx.balance.map(|balance| BalancePoint {
                label: tx.date.clone(),
                balance,
            })
        })
        .collect()
}
