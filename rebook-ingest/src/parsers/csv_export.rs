//! Offline source/sink backed by CSV exports of the ledger sheet.
//!
//! A sheet is exported twice, once with values shown and once with formulas
//! shown:
//!   <dir>/SCB.formatted.csv
//!   <dir>/SCB.formula.csv
//! The formula export is optional; without it both renderings are the same.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use rebook_core::{LedgerRow, TransactionRecord};

use crate::range::RangeSpec;
use crate::source::{RecordSink, RowSource, merge_renderings};

fn read_grid(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let mut grid = Vec::new();
    for result in rdr.records() {
        let record = result.with_context(|| format!("reading {}", path.display()))?;
        grid.push(record.iter().map(|c| c.to_string()).collect());
    }
    Ok(grid)
}

/// Reads a sheet from a pair of CSV exports.
#[derive(Debug, Clone)]
pub struct CsvExportSource {
    dir: PathBuf,
    sheet: String,
}

impl CsvExportSource {
    pub fn new(dir: impl Into<PathBuf>, sheet: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            sheet: sheet.into(),
        }
    }

    pub fn formatted_path(&self) -> PathBuf {
        self.dir.join(format!("{}.formatted.csv", self.sheet))
    }

    pub fn formula_path(&self) -> PathBuf {
        self.dir.join(format!("{}.formula.csv", self.sheet))
    }
}

impl RowSource for CsvExportSource {
    async fn fetch(&self, range: &RangeSpec) -> Result<Vec<LedgerRow>> {
        let formatted = range.window(&read_grid(&self.formatted_path())?);
        let formula_path = self.formula_path();
        let formula = if formula_path.exists() {
            range.window(&read_grid(&formula_path)?)
        } else {
            formatted.clone()
        };

        Ok(merge_renderings(&formatted, &formula, range.width()))
    }
}

/// Writes output records as plain CSV rows (no header), destination layout.
#[derive(Debug, Clone)]
pub struct CsvRecordSink {
    path: PathBuf,
}

impl CsvRecordSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSink for CsvRecordSink {
    async fn write(&mut self, _range: &RangeSpec, records: &[TransactionRecord]) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.path)
            .with_context(|| format!("creating {}", self.path.display()))?;

        for record in records {
            wtr.write_record(record.to_row())?;
        }
        wtr.flush()
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rebook_core::TransactionType;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rebook-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_fetch_merges_both_exports() {
        let dir = scratch_dir("fetch");
        fs::write(
            dir.join("SCB.formatted.csv"),
            "Date,Balance,Note\n01/03,\"1,200\",lunch\n",
        )
        .unwrap();
        fs::write(
            dir.join("SCB.formula.csv"),
            "Date,Balance,Note\n01/03,=1000+200,lunch\n",
        )
        .unwrap();

        let source = CsvExportSource::new(&dir, "SCB");
        let rows = source.fetch(&RangeSpec::parse("A1:C").unwrap()).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, "Date");
        assert_eq!(rows[1].cells[0].display, "1,200");
        assert_eq!(rows[1].cells[0].formula, "=1000+200");
        assert_eq!(rows[1].note, "lunch");
    }

    #[tokio::test]
    async fn test_fetch_without_formula_export() {
        let dir = scratch_dir("plain");
        fs::write(dir.join("CREDIT.formatted.csv"), "Date,Total\n01/03,50\n").unwrap();

        let source = CsvExportSource::new(&dir, "CREDIT");
        let rows = source.fetch(&RangeSpec::parse("A2:C").unwrap()).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cells[0].formula, "50");
        assert_eq!(rows[0].note, "");
    }

    #[tokio::test]
    async fn test_sink_writes_destination_rows() {
        let dir = scratch_dir("sink");
        let path = dir.join("out.csv");
        let mut sink = CsvRecordSink::new(&path);
        let records = vec![
            TransactionRecord::opening_balance("01/03", 100.0),
            TransactionRecord::transaction("02/03", TransactionType::Pay, 12.5, None, "coffee"),
        ];

        sink.write(&RangeSpec::parse("A2:H").unwrap(), &records)
            .await
            .unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = written.lines().collect();
        assert_eq!(lines, vec![",01/03,=100,,,,,", ",02/03,,Pay,=12.5,,,coffee"]);
    }
}
