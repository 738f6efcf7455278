//! Credit-card ledger: running-total reconciliation and line-item split.
//!
//! Sheet layout (zero-based columns of `A1:K`):
//!   0 date | 1 running total | 2 net outflow | 4 outflow breakdown (formula) | 5 note
//!
//! The running total only drops when a payment was made from another
//! account. That payment never shows up as a row, so it is inferred from the
//! drop and written as a `Transfer`.

use serde::{Deserialize, Serialize};

use rebook_core::{LedgerRow, Result, TransactionRecord, TransactionType, clean_cell, signed_terms, to_amount};

/// Column positions of a credit ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditLayout {
    pub running_total: usize,
    pub net_outflow: usize,
    pub breakdown: usize,
    pub note: usize,
}

impl Default for CreditLayout {
    fn default() -> Self {
        Self {
            running_total: 1,
            net_outflow: 2,
            breakdown: 4,
            note: 5,
        }
    }
}

impl CreditLayout {
    pub fn running_total(&self, row: &LedgerRow) -> Result<f64> {
        to_amount(&clean_cell(&row.column(self.running_total).display))
    }

    pub fn net_outflow(&self, row: &LedgerRow) -> Result<f64> {
        to_amount(&clean_cell(&row.column(self.net_outflow).display))
    }
}

/// Running total carried from one row to the next within a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningBalance {
    pub previous_total: f64,
}

impl RunningBalance {
    pub fn new(previous_total: f64) -> Self {
        Self { previous_total }
    }

    /// Seed the state from the opening-balance row and emit its record.
    pub fn opening(row: &LedgerRow, layout: &CreditLayout) -> Result<(Self, TransactionRecord)> {
        let total = layout.running_total(row)?;
        Ok((
            Self::new(total),
            TransactionRecord::opening_balance(row.date.clone(), total),
        ))
    }

    /// Process one row: infer a payout, split the outflow, then carry the total.
    ///
    /// A transfer amount of zero or below is kept as is.
    pub fn reconcile(&mut self, row: &LedgerRow, layout: &CreditLayout) -> Result<Vec<TransactionRecord>> {
        let total = layout.running_total(row)?;
        let net_outflow = layout.net_outflow(row)?;
        let mut records = Vec::new();

        if total < self.previous_total {
            let payout = self.previous_total - total + net_outflow;
            tracing::debug!(date = %row.date, previous = self.previous_total, total, payout, "credit payout");
            records.push(TransactionRecord::transaction(
                row.date.clone(),
                TransactionType::Transfer,
                payout,
                None,
                "",
            ));
        }

        if net_outflow != 0.0 {
            records.extend(line_items(
                &row.date,
                &row.column(layout.breakdown).formula,
                &row.column(layout.note).display,
            )?);
        }

        self.previous_total = total;
        Ok(records)
    }
}

/// One `Pay`/`Void` record per signed term of the breakdown cell.
pub fn line_items(date: &str, breakdown: &str, note: &str) -> Result<Vec<TransactionRecord>> {
    let terms = signed_terms(breakdown)?;
    let notes = split_notes(note, terms.len());

    Ok(terms
        .into_iter()
        .zip(notes)
        .map(|(term, note)| {
            let kind = if term > 0.0 {
                TransactionType::Pay
            } else {
                TransactionType::Void
            };
            TransactionRecord::transaction(date, kind, term.abs(), None, note)
        })
        .collect())
}

/// Split a note on `,` or `+` when it has one segment per term, else repeat it.
pub fn split_notes(note: &str, count: usize) -> Vec<String> {
    let segments: Vec<String> = note
        .replace('+', ",")
        .split(',')
        .map(|s| s.trim().to_string())
        .collect();

    if segments.len() == count {
        segments
    } else {
        vec![note.to_string(); count]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rebook_core::CellValue;

    /// date, total, net outflow, unused, breakdown, note
    fn credit_row(total: &str, net_out: &str, breakdown: &str, note: &str) -> LedgerRow {
        LedgerRow::from_cells(vec![
            CellValue::plain("12/04/2024"),
            CellValue::plain(total),
            CellValue::plain(net_out),
            CellValue::default(),
            CellValue::new("", breakdown),
            CellValue::plain(note),
            CellValue::default(),
        ])
    }

    #[test]
    fn test_payout_closes_balance_equation() {
        let mut state = RunningBalance::new(1000.0);
        let row = credit_row("200", "50", "=50", "groceries");
        let records = state.reconcile(&row, &CreditLayout::default()).unwrap();

        assert_eq!(records[0].kind, Some(TransactionType::Transfer));
        assert_eq!(records[0].amount.as_deref(), Some("=850"));
        assert_eq!(records[0].note, "");
        assert_eq!(records[1].kind, Some(TransactionType::Pay));
        assert_eq!(records[1].amount.as_deref(), Some("=50"));
        assert_eq!(state.previous_total, 200.0);
    }

    #[test]
    fn test_no_payout_when_total_grows() {
        let mut state = RunningBalance::new(100.0);
        let row = credit_row("130", "30", "=30", "taxi");
        let records = state.reconcile(&row, &CreditLayout::default()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, Some(TransactionType::Pay));
        assert_eq!(state.previous_total, 130.0);
    }

    #[test]
    fn test_state_carries_on_idle_rows() {
        let mut state = RunningBalance::new(500.0);
        let idle = credit_row("500", "", "", "");
        assert!(state.reconcile(&idle, &CreditLayout::default()).unwrap().is_empty());
        assert_eq!(state.previous_total, 500.0);

        let blank = credit_row("", "", "", "");
        let records = state.reconcile(&blank, &CreditLayout::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount_value(), Some(500.0));
        assert_eq!(state.previous_total, 0.0);
    }

    #[test]
    fn test_negative_payout_is_kept() {
        let mut state = RunningBalance::new(100.0);
        let row = credit_row("90", "-20", "=-20", "refund");
        let records = state.reconcile(&row, &CreditLayout::default()).unwrap();

        assert_eq!(records[0].kind, Some(TransactionType::Transfer));
        assert_eq!(records[0].amount_value(), Some(-10.0));
        assert_eq!(records[1].kind, Some(TransactionType::Void));
        assert_eq!(records[1].amount_value(), Some(20.0));
    }

    #[test]
    fn test_notes_zip_with_terms() {
        let records = line_items("01/01", "+100-50", "coffee, lunch").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, Some(TransactionType::Pay));
        assert_eq!(records[0].note, "coffee");
        assert_eq!(records[1].kind, Some(TransactionType::Void));
        assert_eq!(records[1].amount.as_deref(), Some("=50"));
        assert_eq!(records[1].note, "lunch");
    }

    #[test]
    fn test_single_note_repeats() {
        let records = line_items("01/01", "+100-50", "single note").unwrap();
        assert!(records.iter().all(|r| r.note == "single note"));
    }

    #[test]
    fn test_split_notes() {
        assert_eq!(split_notes("a+b, c", 3), vec!["a", "b", "c"]);
        assert_eq!(split_notes("a, b", 3), vec!["a, b"; 3]);
        assert!(split_notes("", 0).is_empty());
    }

    #[test]
    fn test_zero_term_is_void() {
        let records = line_items("01/01", "=0", "").unwrap();
        assert_eq!(records[0].kind, Some(TransactionType::Void));
        assert_eq!(records[0].amount_value(), Some(0.0));
    }

    #[test]
    fn test_opening_seeds_state() {
        let row = credit_row("1,000", "", "", "");
        let (state, record) = RunningBalance::opening(&row, &CreditLayout::default()).unwrap();
        assert_eq!(state.previous_total, 1000.0);
        assert_eq!(record.balance_after.as_deref(), Some("=1000"));
    }

    #[test]
    fn test_opening_reads_total_like_data_rows() {
        let layout = CreditLayout::default();
        let row = credit_row("(1,000)", "", "", "");
        let (state, record) = RunningBalance::opening(&row, &layout).unwrap();
        assert_eq!(state.previous_total, layout.running_total(&row).unwrap());
        assert_eq!(record.balance_after.as_deref(), Some("=1000"));
    }
}
