//! The two seams to the spreadsheet: fetching ledger rows and writing records.

use anyhow::Result;

use rebook_core::{CellValue, LedgerRow, TransactionRecord};

use crate::range::{RangeSpec, pad_row};

/// Anything that can hand back ledger rows for a range, in sheet order.
#[allow(async_fn_in_trait)]
pub trait RowSource {
    async fn fetch(&self, range: &RangeSpec) -> Result<Vec<LedgerRow>>;
}

/// Bulk destination for output records, anchored at the range's first cell.
#[allow(async_fn_in_trait)]
pub trait RecordSink {
    async fn write(&mut self, range: &RangeSpec, records: &[TransactionRecord]) -> Result<()>;
}

/// Zip the formatted and formula renderings of one range into ledger rows.
///
/// Both grids are aligned by position. Missing cells (the sheet drops
/// trailing blanks) read as empty.
pub fn merge_renderings(
    formatted: &[Vec<String>],
    formula: &[Vec<String>],
    width: usize,
) -> Vec<LedgerRow> {
    let rows = formatted.len().max(formula.len());

    (0..rows)
        .map(|i| {
            let shown = pad_row(formatted.get(i).cloned().unwrap_or_default(), width);
            let raw = pad_row(formula.get(i).cloned().unwrap_or_default(), width);
            let cells = shown
                .into_iter()
                .zip(raw)
                .map(|(display, formula)| CellValue::new(display, formula))
                .collect();
            LedgerRow::from_cells(cells)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_merge_aligns_renderings() {
        let formatted = vec![row(&["01/03", "1,200", "lunch"])];
        let formula = vec![row(&["01/03", "=1000+200", "lunch"])];
        let rows = merge_renderings(&formatted, &formula, 3);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, "01/03");
        assert_eq!(rows[0].cells[0], CellValue::new("1,200", "=1000+200"));
        assert_eq!(rows[0].note, "lunch");
    }

    #[test]
    fn test_merge_pads_truncated_rows() {
        let formatted = vec![row(&["01/03"]), row(&["02/03", "5"])];
        let formula = vec![row(&["01/03"])];
        let rows = merge_renderings(&formatted, &formula, 4);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cells.len(), 2);
        assert!(rows[0].cells.iter().all(CellValue::is_blank));
        assert_eq!(rows[1].cells[0], CellValue::new("5", ""));
        assert_eq!(rows[1].note, "");
    }
}
