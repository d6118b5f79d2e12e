//! Dataset ingestion: record parsing and case loading

pub mod dataset;
pub mod parser;

pub use dataset::{DatasetLoader, ObjectSelector};
pub use parser::{parse_object, parse_observation, IngestError};
