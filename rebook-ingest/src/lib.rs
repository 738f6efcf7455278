//! rebook-ingest: sheet ranges, row sources/sinks and the offline CSV adapter.

pub mod parsers;
pub mod range;
pub mod source;

pub use parsers::csv_export::{CsvExportSource, CsvRecordSink};
pub use range::RangeSpec;
pub use source::{RecordSink, RowSource, merge_renderings};
