//! Tabular export of the record sequence
//!
//! Rows are built from records that already carry their running balance.
//! Writing the rows out is delegated to a [`SheetWriter`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::io::Write;

use crate::error::{CoreError, CoreResult};
use crate::filter::{filter_by_date, DateRange};
use crate::models::Transaction;

/// Column headers, in row order
pub const EXPORT_HEADERS: [&str; 5] = ["Date", "Description", "Income", "Expense", "Balance"];

/// One exported row
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub date: String,
    pub description: String,
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

impl From<&Transaction> for ExportRow {
    fn from(tx: &Transaction) -> Self {
        let (income, expense) = if tx.is_income() {
            (tx.amount, Decimal::ZERO)
        } else {
            (Decimal::ZERO, tx.amount)
        };
        Self {
            date: tx.date.clone(),
            description: tx.description.clone(),
            income,
            expense,
            balance: tx.balance.unwrap_or_default(),
        }
    }
}

pub fn export_rows(transactions: &[Transaction]) -> Vec<ExportRow> {
    transactions.iter().map(ExportRow::from).collect()
}

/// Rows for every record; fails when there is nothing to export
pub fn export_all(transactions: &[Transaction]) -> CoreResult<Vec<ExportRow>> {
    if transactions.is_empty() {
        return Err(CoreError::validation("No data to export yet"));
    }
    Ok(export_rows(transactions))
}

/// Rows for the records inside `range`; fails when the range holds none
pub fn export_range(transactions: &[Transaction], range: &DateRange) -> CoreResult<Vec<ExportRow>> {
    let filtered = filter_by_date(transactions, range);
    if filtered.is_empty() {
        return Err(CoreError::validation("No data in the selected range"));
    }
    Ok(export_rows(&filtered))
}

pub fn export_all_file_name(today: NaiveDate) -> String {
    format!("ledger_all_{}.csv", today)
}

pub fn export_range_file_name(range: &DateRange) -> String {
    format!("history_{}_{}.csv", range.start, range.end)
}

/// The spreadsheet-writing capability
pub trait SheetWriter {
    /// Write the header and all rows; returns the number of data rows written
    fn write_rows(&mut self, rows: &[ExportRow]) -> CoreResult<usize>;
}

/// Writes rows as CSV
pub struct CsvSheetWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSheetWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
        }
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(self) -> CoreResult<W> {
        self.writer.into_inner().map_err(|e| CoreError::ExportError {
            message: e.to_string(),
        })
    }
}

impl<W: Write> SheetWriter for CsvSheetWriter<W> {
    fn write_rows(&mut self, rows: &[ExportRow]) -> CoreResult<usize> {
        self.writer.write_record(EXPORT_HEADERS)?;

        for row in rows {
            self.writer.write_record(&[
                row.date.clone(),
                row.description.clone(),
                row.income.normalize().to_string(),
                row.expense.normalize().to_string(),
                row.balance.normalize().to_string(),
            ])?;
        }

        self.writer.flush()?;
        Ok(rows.len())
    }
}
