//! rebook-finance: category rules, banking decomposition, credit reconciliation and the pipeline driver

pub mod banking;
pub mod category_rules;
pub mod credit;
pub mod pipeline;

pub use banking::{BankingLayout, decompose, has_activity};
pub use category_rules::{CategoryMapping, CategoryTable};
pub use credit::{CreditLayout, RunningBalance, line_items, split_notes};
pub use pipeline::{LedgerKind, Pipeline, RunOutput, RunSummary};
