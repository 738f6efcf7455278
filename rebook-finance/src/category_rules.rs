//! Ledger category columns mapped to output transaction types and categories.
//!
//! The table is an ordered list of `(column header, mapping)` pairs. It is
//! checked against the fetched header row before any row is decomposed, so
//! a missing entry stops the run instead of dropping transactions.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use rebook_core::{LedgerError, Result, TransactionType};

/// Where amounts from one ledger column end up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMapping {
    /// Column header in the source sheet
    pub header: String,
    pub kind: TransactionType,
    /// Output category; `None` leaves the record uncategorized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl CategoryMapping {
    pub fn new(header: &str, kind: TransactionType, category: Option<&str>) -> Self {
        Self {
            header: header.to_string(),
            kind,
            category: category.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    entries: Vec<CategoryMapping>,
}

impl CategoryTable {
    /// Build a table, rejecting duplicate headers and credit-only types.
    pub fn new(entries: Vec<CategoryMapping>) -> Result<Self> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.header.as_str()) {
                return Err(LedgerError::InvalidMapping(format!(
                    "duplicate header `{}`",
                    entry.header
                )));
            }
            if !matches!(
                entry.kind,
                TransactionType::Income | TransactionType::Expense | TransactionType::Transfer
            ) {
                return Err(LedgerError::InvalidMapping(format!(
                    "`{}` maps to {}, expected Income, Expense or Transfer",
                    entry.header, entry.kind
                )));
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CategoryMapping] {
        &self.entries
    }

    pub fn lookup(&self, header: &str) -> Result<&CategoryMapping> {
        self.entries
            .iter()
            .find(|m| m.header == header)
            .ok_or_else(|| LedgerError::UnknownCategory(header.to_string()))
    }

    /// Bind each category column of the header row to its mapping, in column order.
    pub fn resolve_headers(&self, headers: &[String]) -> Result<Vec<CategoryMapping>> {
        let found = headers.iter().filter(|h| !h.trim().is_empty()).count();
        if found != headers.len() {
            return Err(LedgerError::HeaderMismatch {
                expected: headers.len(),
                found,
            });
        }

        headers
            .iter()
            .map(|h| self.lookup(h.trim()).cloned())
            .collect()
    }
}

impl Default for CategoryTable {
    /// Columns of the KBANK and SCB ledgers.
    fn default() -> Self {
        use TransactionType::*;

        Self {
            entries: vec![
                // KBANK
                CategoryMapping::new("Food", Expense, Some("Food")),
                CategoryMapping::new("Drinks", Expense, Some("Beverage")),
                CategoryMapping::new("Sweets", Expense, Some("Sweets")),
                CategoryMapping::new("Transfer", Transfer, None),
                CategoryMapping::new("Misc", Expense, None),
                // SCB
                CategoryMapping::new("Funding", Expense, Some("Investment")),
                CategoryMapping::new("Subscription", Expense, Some("Subscription")),
                CategoryMapping::new("Debt", Expense, None),
                CategoryMapping::new("Transport", Expense, Some("Transportation")),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_lookup_known_label() {
        let table = CategoryTable::default();
        let drinks = table.lookup("Drinks").unwrap();
        assert_eq!(drinks.kind, TransactionType::Expense);
        assert_eq!(drinks.category.as_deref(), Some("Beverage"));

        let transfer = table.lookup("Transfer").unwrap();
        assert_eq!(transfer.kind, TransactionType::Transfer);
        assert_eq!(transfer.category, None);
    }

    #[test]
    fn test_lookup_unknown_label_fails() {
        let table = CategoryTable::default();
        assert_eq!(
            table.lookup("Groceries").unwrap_err(),
            LedgerError::UnknownCategory("Groceries".to_string())
        );
    }

    #[test]
    fn test_resolve_headers_keeps_column_order() {
        let table = CategoryTable::default();
        let resolved = table
            .resolve_headers(&headers(&["Funding", " Subscription ", "Debt", "Transport", "Misc"]))
            .unwrap();
        let names: Vec<_> = resolved.iter().map(|m| m.header.as_str()).collect();
        assert_eq!(names, vec!["Funding", "Subscription", "Debt", "Transport", "Misc"]);
    }

    #[test]
    fn test_resolve_headers_fails_fast() {
        let table = CategoryTable::default();
        let err = table
            .resolve_headers(&headers(&["Food", "Rent", "Nope"]))
            .unwrap_err();
        assert_eq!(err, LedgerError::UnknownCategory("Rent".to_string()));

        let err = table.resolve_headers(&headers(&["Food", ""])).unwrap_err();
        assert_eq!(err, LedgerError::HeaderMismatch { expected: 2, found: 1 });
    }

    #[test]
    fn test_table_rejects_duplicates_and_credit_types() {
        let dup = CategoryTable::new(vec![
            CategoryMapping::new("Food", TransactionType::Expense, None),
            CategoryMapping::new("Food", TransactionType::Income, None),
        ]);
        assert!(matches!(dup, Err(LedgerError::InvalidMapping(_))));

        let pay = CategoryTable::new(vec![CategoryMapping::new("Card", TransactionType::Pay, None)]);
        assert!(matches!(pay, Err(LedgerError::InvalidMapping(_))));
    }

    #[test]
    fn test_default_table_is_valid() {
        let table = CategoryTable::default();
        assert_eq!(CategoryTable::new(table.entries().to_vec()).unwrap(), table);
        assert_eq!(table.entries().len(), 9);
    }
}
