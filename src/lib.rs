//! Bearing-only Triangulation
//!
//! Estimates the geodetic position of a distant target from observers that
//! each report their own GPS fix and the compass bearing (and optionally the
//! pitch) at which they see it. Bearings are intersected pairwise in a local
//! tangent plane and combined with a per-axis median.

pub mod core;
pub mod algorithms;
pub mod processing;
pub mod validation;
pub mod utils;
pub mod api;

// Re-export commonly used types
pub use crate::core::{
    CaseData, EnuPoint, GeodeticPoint, Localization, LocalizationMethod, LocalizationResult,
    ObserverMeasurement, ObserverRecord, Orientation,
};
pub use algorithms::{localize_cases_parallel, BearingTriangulator, LocalFrame};
pub use api::{CaseReport, CsvFormatter, JsonFormatter, MetricsRecord, OutputFormat, TextFormatter};
pub use processing::{DatasetLoader, IngestError};
pub use utils::{ConfigError, ConfigurationManager, EngineConfig};
pub use validation::{AccuracySummary, LocalizationError, MeasurementIssue, MeasurementValidator};
