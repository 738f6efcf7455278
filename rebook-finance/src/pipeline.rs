//! Pipeline driver: fetch once, transform every row in order, write once.
//!
//! The first fetched row is the header, the second the opening balance.
//! Nothing is written unless every row transformed cleanly.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;

use rebook_core::{LedgerError, LedgerRow, TransactionRecord};
use rebook_ingest::{RangeSpec, RecordSink, RowSource};

use crate::banking::{self, BankingLayout};
use crate::category_rules::CategoryTable;
use crate::credit::{CreditLayout, RunningBalance};

/// Which ledger the rows come from.
#[derive(Debug, Clone)]
pub enum LedgerKind {
    Banking {
        layout: BankingLayout,
        categories: CategoryTable,
    },
    Credit {
        layout: CreditLayout,
    },
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Data rows after the header and opening-balance rows
    pub rows_seen: usize,
    pub rows_skipped: usize,
    pub records: usize,
    pub by_type: BTreeMap<String, usize>,
}

impl RunSummary {
    fn tally(&mut self, records: &[TransactionRecord]) {
        self.records = records.len();
        self.by_type.clear();
        for record in records {
            let key = record
                .kind
                .map(|k| k.to_string())
                .unwrap_or_else(|| "Opening".to_string());
            *self.by_type.entry(key).or_insert(0) += 1;
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub records: Vec<TransactionRecord>,
    pub summary: RunSummary,
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    pub kind: LedgerKind,
    pub source_range: RangeSpec,
    pub destination_range: RangeSpec,
}

impl Pipeline {
    pub fn new(kind: LedgerKind, source_range: RangeSpec, destination_range: RangeSpec) -> Self {
        Self {
            kind,
            source_range,
            destination_range,
        }
    }

    /// Fetch and transform without writing anything.
    pub async fn preview<S: RowSource>(&self, source: &S) -> Result<RunOutput> {
        let rows = source
            .fetch(&self.source_range)
            .await
            .with_context(|| format!("fetching {}", self.source_range))?;
        tracing::info!(rows = rows.len(), range = %self.source_range, "fetched ledger rows");

        Ok(self.transform(rows)?)
    }

    /// Fetch, transform, then bulk-write all records.
    pub async fn run<S: RowSource, W: RecordSink>(&self, source: &S, sink: &mut W) -> Result<RunOutput> {
        let output = self.preview(source).await?;

        sink.write(&self.destination_range, &output.records)
            .await
            .with_context(|| format!("writing {}", self.destination_range))?;
        tracing::info!(
            records = output.summary.records,
            range = %self.destination_range,
            "wrote transaction records"
        );

        Ok(output)
    }

    /// Turn fetched rows into the full output batch.
    pub fn transform(&self, rows: Vec<LedgerRow>) -> rebook_core::Result<RunOutput> {
        let mut rows = rows.into_iter();
        let header = rows.next().ok_or(LedgerError::MissingRow("header"))?;
        let opening = rows.next().ok_or(LedgerError::MissingRow("opening balance"))?;

        let mut summary = RunSummary::default();
        let mut records = Vec::new();

        match &self.kind {
            LedgerKind::Banking { layout, categories } => {
                let columns = layout.resolve_columns(&header, categories)?;
                records.push(layout.opening_balance(&opening)?);

                for row in rows {
                    summary.rows_seen += 1;
                    if row.is_blank() || !banking::has_activity(&row, layout)? {
                        summary.rows_skipped += 1;
                        continue;
                    }
                    records.extend(banking::decompose(&row, layout, &columns)?);
                }
            }
            LedgerKind::Credit { layout } => {
                let (mut state, opening_record) = RunningBalance::opening(&opening, layout)?;
                records.push(opening_record);

                for row in rows {
                    summary.rows_seen += 1;
                    // Blank rows keep the running total; reconciling one would read as a full payout.
                    if row.is_blank() {
                        summary.rows_skipped += 1;
                        continue;
                    }
                    records.extend(state.reconcile(&row, layout)?);
                }
            }
        }

        summary.tally(&records);
        tracing::info!(
            rows = summary.rows_seen,
            skipped = summary.rows_skipped,
            records = summary.records,
            "transformed ledger"
        );

        Ok(RunOutput { records, summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rebook_core::{CellValue, TransactionType};

    fn row(cells: &[&str]) -> LedgerRow {
        LedgerRow::from_cells(cells.iter().map(|c| CellValue::plain(*c)).collect())
    }

    fn credit_pipeline() -> Pipeline {
        Pipeline::new(
            LedgerKind::Credit {
                layout: CreditLayout::default(),
            },
            RangeSpec::parse("A1:K").unwrap(),
            RangeSpec::parse("A2:H").unwrap(),
        )
    }

    #[test]
    fn test_missing_rows_fail() {
        let err = credit_pipeline().transform(vec![]).unwrap_err();
        assert_eq!(err, LedgerError::MissingRow("header"));

        let err = credit_pipeline()
            .transform(vec![row(&["Date", "Total"])])
            .unwrap_err();
        assert_eq!(err, LedgerError::MissingRow("opening balance"));
    }

    #[test]
    fn test_credit_transform_seeds_from_opening_balance() {
        let rows = vec![
            row(&["Date", "Total", "Out", "", "Items", "Note", ""]),
            row(&["01/04", "1000", "", "", "", "", ""]),
            row(&["02/04", "200", "50", "", "=50", "dinner", ""]),
            row(&["", "", "", "", "", "", ""]),
        ];
        let out = credit_pipeline().transform(rows).unwrap();

        assert_eq!(out.records.len(), 3);
        assert_eq!(out.records[0].balance_after.as_deref(), Some("=1000"));
        assert_eq!(out.records[1].kind, Some(TransactionType::Transfer));
        assert_eq!(out.records[1].amount_value(), Some(850.0));
        assert_eq!(out.records[2].note, "dinner");
        assert_eq!(out.summary.rows_seen, 2);
        assert_eq!(out.summary.rows_skipped, 1);
        assert_eq!(out.summary.by_type.get("Opening"), Some(&1));
        assert_eq!(out.summary.by_type.get("Pay"), Some(&1));
    }

    #[test]
    fn test_blank_credit_row_keeps_running_total() {
        let rows = vec![
            row(&["Date", "Total", "Out", "", "Items", "Note", ""]),
            row(&["01/04", "1000", "", "", "", "", ""]),
            row(&["", "", "", "", "", "", ""]),
            row(&["03/04", "1030", "30", "", "=30", "taxi", ""]),
        ];
        let out = credit_pipeline().transform(rows).unwrap();

        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[1].kind, Some(TransactionType::Pay));
        assert_eq!(out.summary.by_type.get("Transfer"), None);
        assert_eq!(out.summary.rows_skipped, 1);
    }
}
