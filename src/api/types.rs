//! Report types handed to callers of the engine
//!
//! A [`CaseReport`] bundles one case's localization outcome with its accuracy
//! against ground truth. [`MetricsRecord`] flattens it into named scalars for
//! tabular export.

use crate::core::{GeodeticPoint, Localization};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Geodesic distance from one observer to the ground truth
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObserverRange {
    pub observer_id: u32,
    pub distance_m: f64,
}

/// Everything computed for one case
#[derive(Debug, Clone, PartialEq)]
pub struct CaseReport {
    pub case_id: String,
    /// Observer records in the case, usable or not
    pub observer_count: usize,
    /// Known target position, if the case has one
    pub truth: Option<GeodeticPoint>,
    pub localization: Localization,
    /// Geodesic error of the estimate; `None` when unknown
    pub error_m: Option<f64>,
    /// Distances from each observer to the truth
    pub observer_ranges: Vec<ObserverRange>,
}

/// Scalar cell of a metrics record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Real(f64),
    Bool(bool),
    Missing,
}

impl From<Option<f64>> for FieldValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(FieldValue::Missing, FieldValue::Real)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Real(x) => write!(f, "{}", x),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Missing => Ok(()),
        }
    }
}

/// Ordered field name to scalar mapping, one per case
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricsRecord {
    fields: Vec<(&'static str, FieldValue)>,
}

impl MetricsRecord {
    pub const FIELDS: [&'static str; 12] = [
        "case",
        "n_observers",
        "n_obs_used",
        "pairs",
        "has_uav_actual",
        "est_lat",
        "est_lon",
        "est_alt",
        "uav_lat",
        "uav_lon",
        "error_m",
        "method",
    ];

    pub fn push(&mut self, name: &'static str, value: FieldValue) {
        self.fields.push((name, value));
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(field, _)| *field == name).map(|(_, value)| value)
    }

    pub fn fields(&self) -> &[(&'static str, FieldValue)] {
        &self.fields
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(name, _)| *name)
    }

    pub fn values(&self) -> impl Iterator<Item = &FieldValue> {
        self.fields.iter().map(|(_, value)| value)
    }
}

/// Serializes as a JSON object with fields in record order
impl Serialize for MetricsRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Round to three decimals, the precision errors are reported at
fn round_mm(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

impl CaseReport {
    /// Flatten into a metrics row
    pub fn to_record(&self) -> MetricsRecord {
        let estimate = self.localization.estimate();
        let mut record = MetricsRecord::default();

        record.push("case", FieldValue::Text(self.case_id.clone()));
        record.push("n_observers", FieldValue::Integer(self.observer_count as i64));

        let used = match &self.localization {
            Localization::Estimated(result) => result.observers_used,
            Localization::InsufficientObservers { usable } => *usable,
        };
        record.push("n_obs_used", FieldValue::Integer(used as i64));
        record.push(
            "pairs",
            estimate.map_or(FieldValue::Integer(0), |r| FieldValue::Integer(r.pairs_used as i64)),
        );
        record.push("has_uav_actual", FieldValue::Bool(self.truth.is_some()));

        record.push("est_lat", estimate.map(|r| r.position.lat).into());
        record.push("est_lon", estimate.map(|r| r.position.lon).into());
        record.push("est_alt", estimate.and_then(|r| r.position.height).into());
        record.push("uav_lat", self.truth.map(|t| t.lat).into());
        record.push("uav_lon", self.truth.map(|t| t.lon).into());
        record.push("error_m", self.error_m.map(round_mm).into());
        record.push(
            "method",
            estimate.map_or(FieldValue::Missing, |r| FieldValue::Text(r.method.to_string())),
        );

        record
    }
}
