//! Formatting helpers shared by the saldo crates

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use saldo_config::{CurrencyConfig, SymbolPosition};

/// Format a string of digits with a thousands separator
pub fn format_number(digits: &str, separator: &str) -> String {
    let mut result = String::new();
    let mut count = 0;
    for c in digits.chars().rev() {
        if count == 3 {
            result.push_str(&separator.chars().rev().collect::<String>());
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    result.chars().rev().collect()
}

/// Format an amount as currency, e.g. `Rp 120.000` or `-Rp 30.000`
pub fn format_currency(value: Decimal, currency: &CurrencyConfig) -> String {
    let rounded = value
        .round_dp_with_strategy(currency.decimal_places, RoundingStrategy::MidpointAwayFromZero)
        .abs();

    let text = format!("{:.*}", currency.decimal_places as usize, rounded);
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut number = format_number(int_part, &currency.thousands_separator);
    if let Some(frac) = frac_part {
        number.push_str(&currency.decimal_separator);
        number.push_str(frac);
    }

    let sign = if value.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    match currency.symbol_position {
        SymbolPosition::Before => format!("{}{} {}", sign, currency.symbol, number),
        SymbolPosition::After => format!("{}{} {}", sign, number, currency.symbol),
    }
}

/// Human-readable date for the `date` field of a record
pub fn format_local_date(date: NaiveDate, pattern: &str) -> String {
    date.format(pattern).to_string()
}
