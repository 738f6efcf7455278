//! Ledger rows in, transaction records out.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::amount::amount_expression;

/// Both renderings of the same spreadsheet cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellValue {
    /// Human-formatted value, e.g. `1,245.50`
    pub display: String,
    /// Raw formula text, e.g. `=1200+45.5`
    pub formula: String,
}

impl CellValue {
    pub fn new(display: impl Into<String>, formula: impl Into<String>) -> Self {
        Self {
            display: display.into(),
            formula: formula.into(),
        }
    }

    /// A cell whose display and formula renderings are the same text.
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            display: text.clone(),
            formula: text,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.display.trim().is_empty() && self.formula.trim().is_empty()
    }
}

/// One ledger row as fetched from the source sheet.
///
/// `cells` holds every column between the date column and the note column,
/// in sheet order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub date: String,
    pub cells: Vec<CellValue>,
    pub note: String,
}

impl LedgerRow {
    /// Build a row from the full list of cells, date first and note last.
    pub fn from_cells(mut cells: Vec<CellValue>) -> Self {
        let date = if cells.is_empty() {
            String::new()
        } else {
            cells.remove(0).display
        };
        let note = cells.pop().map(|c| c.display).unwrap_or_default();
        Self { date, cells, note }
    }

    /// Cell at a zero-based sheet column (column 0 is the date, the last
    /// column the note).
    ///
    /// Columns past the end of the row read as blank.
    pub fn column(&self, index: usize) -> CellValue {
        match index {
            0 => CellValue::plain(self.date.clone()),
            i if i <= self.cells.len() => self.cells[i - 1].clone(),
            i if i == self.cells.len() + 1 => CellValue::plain(self.note.clone()),
            _ => CellValue::default(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.date.trim().is_empty()
            && self.note.trim().is_empty()
            && self.cells.iter().all(CellValue::is_blank)
    }
}

/// Output transaction types understood by the bookkeeping sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Income,
    Expense,
    Transfer,
    /// A credit-card charge
    Pay,
    /// A reversal or refund on the credit card
    Void,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
            TransactionType::Transfer => "Transfer",
            TransactionType::Pay => "Pay",
            TransactionType::Void => "Void",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized, single-amount output row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date: String,
    /// Only set on opening-balance rows
    pub balance_after: Option<String>,
    pub kind: Option<TransactionType>,
    /// Amount as a formula, e.g. `=45.5`
    pub amount: Option<String>,
    pub category: Option<String>,
    pub note: String,
}

/// Number of columns in a written output row.
pub const RECORD_WIDTH: usize = 8;

impl TransactionRecord {
    /// The opening-balance row that starts every output batch.
    pub fn opening_balance(date: impl Into<String>, balance: f64) -> Self {
        Self {
            date: date.into(),
            balance_after: Some(amount_expression(balance)),
            kind: None,
            amount: None,
            category: None,
            note: String::new(),
        }
    }

    pub fn transaction(
        date: impl Into<String>,
        kind: TransactionType,
        amount: f64,
        category: Option<String>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            balance_after: None,
            kind: Some(kind),
            amount: Some(amount_expression(amount)),
            category,
            note: note.into(),
        }
    }

    /// Numeric value behind the amount formula, if there is one.
    pub fn amount_value(&self) -> Option<f64> {
        self.amount
            .as_deref()
            .and_then(|a| a.strip_prefix('='))
            .and_then(|a| a.parse().ok())
    }

    /// Destination row layout:
    /// `[blank, date, balance, type, amount, category, blank, note]`.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            String::new(),
            self.date.clone(),
            self.balance_after.clone().unwrap_or_default(),
            self.kind.map(|k| k.to_string()).unwrap_or_default(),
            self.amount.clone().unwrap_or_default(),
            self.category.clone().unwrap_or_default(),
            String::new(),
            self.note.clone(),
        ]
    }
}
