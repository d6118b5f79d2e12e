//! Reports and their output formats

pub mod formatting;
pub mod types;

pub use formatting::{CsvFormatter, JsonFormatter, OutputFormat, TextFormatter};
pub use types::{CaseReport, FieldValue, MetricsRecord, ObserverRange};
