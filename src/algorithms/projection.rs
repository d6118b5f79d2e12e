//! Observer projection into the case's local tangent plane
//!
//! Every usable observer becomes a 2-D line in the (East, North) plane: its
//! origin is the observer's ENU position and its direction comes from the
//! yaw, measured clockwise from true north.

use crate::algorithms::geodetic::LocalFrame;
use crate::core::{ObserverMeasurement, ObserverRecord};
use crate::validation::data::{MeasurementIssue, MeasurementValidator};
use crate::validation::error::LocalizationError;
use log::debug;
use nalgebra::Vector2;

/// Bearing line of one observer in the local frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// (east, north) in meters
    pub origin: Vector2<f64>,
    /// Unit vector (sin yaw, cos yaw)
    pub direction: Vector2<f64>,
}

impl Ray {
    pub fn from_yaw(origin: Vector2<f64>, yaw_deg: f64) -> Self {
        let (sin_yaw, cos_yaw) = yaw_deg.to_radians().sin_cos();
        Self {
            origin,
            direction: Vector2::new(sin_yaw, cos_yaw),
        }
    }
}

/// Observers of one case, expressed in a single local frame
#[derive(Debug, Clone)]
pub struct ProjectedObservers {
    /// Frame anchored at the first usable observer
    pub frame: LocalFrame,
    pub rays: Vec<Ray>,
    /// Pitch per ray, in degrees, when the observer reported a finite one
    pub pitches: Vec<Option<f64>>,
    /// Observer id per ray
    pub ids: Vec<u32>,
    /// Observers left out of the estimation
    pub excluded: Vec<MeasurementIssue>,
}

impl ProjectedObservers {
    pub fn len(&self) -> usize {
        self.rays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rays.is_empty()
    }
}

/// Maps observer poses onto rays in a shared ENU frame
#[derive(Debug, Clone, Copy, Default)]
pub struct ObserverProjector {
    validator: MeasurementValidator,
}

impl ObserverProjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate raw records and project the survivors.
    ///
    /// Returns `Ok(None)` when no record survives validation, since there is
    /// no observer to anchor the frame on.
    pub fn project_records(&self, records: &[ObserverRecord]) -> Result<Option<ProjectedObservers>, LocalizationError> {
        let mut excluded = Vec::new();
        let measurements: Vec<ObserverMeasurement> = records
            .iter()
            .filter_map(|record| match self.validator.validate(record) {
                Ok(measurement) => Some(measurement),
                Err(issue) => {
                    debug!("excluding {}", issue);
                    excluded.push(issue);
                    None
                }
            })
            .collect();

        self.project_validated(&measurements, excluded)
    }

    /// Project measurements whose yaw has already been resolved
    pub fn project(&self, measurements: &[ObserverMeasurement]) -> Result<Option<ProjectedObservers>, LocalizationError> {
        let mut excluded = Vec::new();
        let valid: Vec<ObserverMeasurement> = measurements
            .iter()
            .filter_map(|measurement| match self.validator.validate_measurement(measurement) {
                Ok(valid) => Some(valid),
                Err(issue) => {
                    debug!("excluding {}", issue);
                    excluded.push(issue);
                    None
                }
            })
            .collect();

        self.project_validated(&valid, excluded)
    }

    fn project_validated(
        &self,
        measurements: &[ObserverMeasurement],
        excluded: Vec<MeasurementIssue>,
    ) -> Result<Option<ProjectedObservers>, LocalizationError> {
        let Some(first) = measurements.first() else {
            return Ok(None);
        };

        let frame = LocalFrame::new(first.position)?;

        let mut rays = Vec::with_capacity(measurements.len());
        let mut pitches = Vec::with_capacity(measurements.len());
        let mut ids = Vec::with_capacity(measurements.len());

        for measurement in measurements {
            let local = frame.enu_of(&measurement.position)?;
            rays.push(Ray::from_yaw(Vector2::new(local.east, local.north), measurement.yaw_deg));
            pitches.push(measurement.pitch_deg);
            ids.push(measurement.id);
        }

        Ok(Some(ProjectedObservers { frame, rays, pitches, ids, excluded }))
    }
}
