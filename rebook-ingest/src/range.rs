//! A1-notation ranges (`A1:K`, `'SCB'!A2:H`).

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use rebook_core::LedgerError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSpec {
    pub sheet: Option<String>,
    /// Zero-based first column
    pub start_col: usize,
    /// One-based first row
    pub start_row: u32,
    /// Zero-based last column, inclusive
    pub end_col: usize,
    /// One-based last row, inclusive; open-ended when absent
    pub end_row: Option<u32>,
}

fn column_index(letters: &str) -> usize {
    letters
        .bytes()
        .fold(0usize, |acc, b| acc * 26 + (b - b'A') as usize + 1)
        - 1
}

fn column_letters(mut index: usize) -> String {
    let mut out = Vec::new();
    loop {
        out.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

impl RangeSpec {
    /// Parse `A1:K`, `A2:H10`, `SCB!A1:K` or `'My Sheet'!A1:K`.
    pub fn parse(spec: &str) -> Result<Self> {
        let re = Regex::new(concat!(
            r"^(?:(?:'(?P<quoted>[^']+)'|(?P<sheet>[^!']+))!)?",
            r"(?P<c1>[A-Z]{1,3})(?P<r1>\d+)?:",
            r"(?P<c2>[A-Z]{1,3})(?P<r2>\d+)?$"
        ))?;

        let invalid = || LedgerError::InvalidRange(spec.to_string());
        let caps = re.captures(spec.trim()).ok_or_else(invalid)?;

        let sheet = caps
            .name("quoted")
            .or_else(|| caps.name("sheet"))
            .map(|m| m.as_str().to_string());
        let start_col = column_index(&caps["c1"]);
        let end_col = column_index(&caps["c2"]);
        let start_row = match caps.name("r1") {
            Some(m) => m.as_str().parse().map_err(|_| invalid())?,
            None => 1,
        };
        let end_row = match caps.name("r2") {
            Some(m) => Some(m.as_str().parse().map_err(|_| invalid())?),
            None => None,
        };

        if end_col < start_col || start_row == 0 || end_row.is_some_and(|r| r < start_row) {
            return Err(invalid().into());
        }

        Ok(Self {
            sheet,
            start_col,
            start_row,
            end_col,
            end_row,
        })
    }

    /// Number of columns covered.
    pub fn width(&self) -> usize {
        self.end_col - self.start_col + 1
    }

    /// Same range on a named sheet.
    pub fn on_sheet(&self, sheet: impl Into<String>) -> Self {
        Self {
            sheet: Some(sheet.into()),
            ..self.clone()
        }
    }

    /// Cut this range out of a full-sheet grid, padding short rows with blanks.
    pub fn window(&self, grid: &[Vec<String>]) -> Vec<Vec<String>> {
        let first = (self.start_row - 1) as usize;
        let take = self
            .end_row
            .map(|r| (r - self.start_row + 1) as usize)
            .unwrap_or(usize::MAX);

        grid.iter()
            .skip(first)
            .take(take)
            .map(|row| pad_row(row.iter().skip(self.start_col).cloned().collect(), self.width()))
            .collect()
    }
}

/// Pad or truncate a row to exactly `width` cells.
pub fn pad_row(mut row: Vec<String>, width: usize) -> Vec<String> {
    row.resize(width, String::new());
    row
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(sheet) = &self.sheet {
            write!(f, "'{}'!", sheet.replace('\'', "''"))?;
        }
        write!(f, "{}{}:{}", column_letters(self.start_col), self.start_row, column_letters(self.end_col))?;
        if let Some(r) = self.end_row {
            write!(f, "{}", r)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_open_ended_range() {
        let r = RangeSpec::parse("A1:K").unwrap();
        assert_eq!(r.sheet, None);
        assert_eq!(r.start_col, 0);
        assert_eq!(r.end_col, 10);
        assert_eq!(r.start_row, 1);
        assert_eq!(r.end_row, None);
        assert_eq!(r.width(), 11);
    }

    #[test]
    fn test_parse_sheet_qualified() {
        let r = RangeSpec::parse("'Credit Card'!A2:H40").unwrap();
        assert_eq!(r.sheet.as_deref(), Some("Credit Card"));
        assert_eq!(r.width(), 8);
        assert_eq!(r.end_row, Some(40));

        let r = RangeSpec::parse("SCB!AA1:AB").unwrap();
        assert_eq!(r.sheet.as_deref(), Some("SCB"));
        assert_eq!(r.start_col, 26);
        assert_eq!(r.width(), 2);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(RangeSpec::parse("K1:A").is_err());
        assert!(RangeSpec::parse("A0:B").is_err());
        assert!(RangeSpec::parse("hello").is_err());
        let err = RangeSpec::parse("A5:B2").unwrap_err();
        assert_eq!(
            err.downcast_ref::<LedgerError>(),
            Some(&LedgerError::InvalidRange("A5:B2".to_string()))
        );
    }

    #[test]
    fn test_display_round_trip() {
        let r = RangeSpec::parse("A2:H").unwrap().on_sheet("SCB");
        assert_eq!(r.to_string(), "'SCB'!A2:H");
        assert_eq!(RangeSpec::parse(&r.to_string()).unwrap(), r);
        assert_eq!(column_letters(27), "AB");
    }

    #[test]
    fn test_window_pads_and_offsets() {
        let grid = vec![
            vec!["skip".to_string()],
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            vec!["d".to_string()],
        ];
        let r = RangeSpec::parse("B2:C").unwrap();
        let w = r.window(&grid);
        assert_eq!(w, vec![vec!["b", "c"], vec!["", ""]]);
    }
}
