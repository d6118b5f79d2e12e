//! Input validation, error types and accuracy metrics

pub mod accuracy;
pub mod data;
pub mod error;

pub use accuracy::{geodesic_distance_m, AccuracySummary};
pub use data::{MeasurementIssue, MeasurementValidator};
pub use error::LocalizationError;
