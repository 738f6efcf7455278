//! Banking ledger rows decomposed into one record per amount.
//!
//! Sheet layout (zero-based columns of `A1:K`):
//!   0 date | 1 balance | 2 net income (formula) | 3 net expense total
//!   4 unused | 5..=9 category cells (formula) | 10 note
//!
//! A minus inside a category cell is money flowing back in, not a smaller
//! expense: `=120-20` in Food is a 120 expense and a 20 income.

use serde::{Deserialize, Serialize};

use rebook_core::{LedgerRow, Result, TransactionRecord, TransactionType, clean_cell, parse, plus_terms, to_amount};

use crate::category_rules::{CategoryMapping, CategoryTable};

/// Column positions of a banking ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankingLayout {
    pub balance: usize,
    pub net_income: usize,
    pub net_expense: usize,
    pub first_category: usize,
    pub category_count: usize,
    pub note: usize,
}

impl Default for BankingLayout {
    fn default() -> Self {
        Self {
            balance: 1,
            net_income: 2,
            net_expense: 3,
            first_category: 5,
            category_count: 5,
            note: 10,
        }
    }
}

impl BankingLayout {
    /// Header labels of the category columns.
    pub fn category_headers(&self, header_row: &LedgerRow) -> Vec<String> {
        (self.first_category..self.first_category + self.category_count)
            .map(|i| header_row.column(i).display)
            .collect()
    }

    /// Bind the header row's category columns against the mapping table.
    pub fn resolve_columns(
        &self,
        header_row: &LedgerRow,
        table: &CategoryTable,
    ) -> Result<Vec<CategoryMapping>> {
        table.resolve_headers(&self.category_headers(header_row))
    }

    pub fn opening_balance(&self, row: &LedgerRow) -> Result<TransactionRecord> {
        let balance = to_amount(&row.column(self.balance).display)?;
        Ok(TransactionRecord::opening_balance(row.date.clone(), balance))
    }
}

/// Whether a row carries any activity worth decomposing.
///
/// Only a positive net expense total counts; a refund day with no income
/// (negative total) is skipped.
pub fn has_activity(row: &LedgerRow, layout: &BankingLayout) -> Result<bool> {
    let net_income = clean_cell(&row.column(layout.net_income).formula);
    let net_expense = to_amount(&clean_cell(&row.column(layout.net_expense).display))?;

    if net_income.trim().is_empty() && net_expense < 0.0 {
        tracing::warn!(
            date = %row.date,
            net_expense,
            "skipping row with negative net expense and no income"
        );
    }

    Ok(!net_income.trim().is_empty() || net_expense > 0.0)
}

/// Explode one banking row into income and category records.
///
/// `columns` are the mappings for the layout's category cells, in column order.
pub fn decompose(
    row: &LedgerRow,
    layout: &BankingLayout,
    columns: &[CategoryMapping],
) -> Result<Vec<TransactionRecord>> {
    let note = row.column(layout.note).display;
    let mut incomes = plus_terms(&row.column(layout.net_income).formula)?;
    let mut expenses = Vec::with_capacity(columns.len());

    for (i, mapping) in columns.iter().enumerate() {
        let parsed = parse(&row.column(layout.first_category + i).formula)?;
        incomes.extend_from_slice(&parsed.negatives);
        expenses.push((mapping, parsed.positives));
    }

    let mut records = Vec::new();
    for amount in incomes {
        records.push(TransactionRecord::transaction(
            row.date.clone(),
            TransactionType::Income,
            amount,
            None,
            note.clone(),
        ));
    }
    for (mapping, amounts) in expenses {
        for amount in amounts {
            records.push(TransactionRecord::transaction(
                row.date.clone(),
                mapping.kind,
                amount,
                mapping.category.clone(),
                note.clone(),
            ));
        }
    }

    tracing::debug!(date = %row.date, records = records.len(), "decomposed banking row");
    Ok(records)
}
