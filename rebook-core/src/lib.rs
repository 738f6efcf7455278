//! rebook-core: ledger data model, amount expressions and the shared error type

pub mod amount;
pub mod error;
pub mod ledger;

pub use amount::{ParsedAmount, amount_expression, clean_cell, parse, plus_terms, signed_terms, to_amount};
pub use error::{LedgerError, Result};
pub use ledger::{CellValue, LedgerRow, RECORD_WIDTH, TransactionRecord, TransactionType};
