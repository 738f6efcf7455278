//! Errors raised while turning ledger rows into transaction records.
//!
//! Every variant is fatal for a run: the driver aborts before anything is
//! written back.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("malformed amount `{term}` in cell `{raw}`")]
    MalformedAmount { raw: String, term: String },
    #[error("no category mapping for column `{0}`")]
    UnknownCategory(String),
    #[error("expected {expected} category columns, header row has {found}")]
    HeaderMismatch { expected: usize, found: usize },
    #[error("source range has no {0} row")]
    MissingRow(&'static str),
    #[error("invalid category mapping: {0}")]
    InvalidMapping(String),
    #[error("invalid range `{0}`")]
    InvalidRange(String),
}
