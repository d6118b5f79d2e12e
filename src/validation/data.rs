use crate::core::{GeodeticPoint, ObserverMeasurement, ObserverRecord};
use log::debug;
use thiserror::Error;

/// Why an observer record cannot take part in the estimation.
///
/// These never fail a case; the observer is left out and the rest proceed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeasurementIssue {
    #[error("observer {id}: non-finite position ({lat}, {lon})")]
    NonFinitePosition { id: u32, lat: f64, lon: f64 },

    #[error("observer {id}: latitude {lat} outside [-90, 90]")]
    LatitudeOutOfRange { id: u32, lat: f64 },

    #[error("observer {id}: longitude {lon} outside [-180, 180]")]
    LongitudeOutOfRange { id: u32, lon: f64 },

    #[error("observer {id}: no finite yaw, compass heading or magnetic yaw")]
    MissingYaw { id: u32 },
}

impl MeasurementIssue {
    pub fn observer_id(&self) -> u32 {
        match self {
            MeasurementIssue::NonFinitePosition { id, .. }
            | MeasurementIssue::LatitudeOutOfRange { id, .. }
            | MeasurementIssue::LongitudeOutOfRange { id, .. }
            | MeasurementIssue::MissingYaw { id } => *id,
        }
    }
}

/// Turns raw observer records into measurements the engine can use
#[derive(Debug, Clone, Copy, Default)]
pub struct MeasurementValidator;

impl MeasurementValidator {
    pub fn new() -> Self {
        Self
    }

    /// Check the position, resolve yaw, and drop non-finite pitch and height
    pub fn validate(&self, record: &ObserverRecord) -> Result<ObserverMeasurement, MeasurementIssue> {
        let id = record.id;
        let position = self.validate_position(id, &record.position)?;

        let yaw_deg = record
            .orientation
            .resolve_yaw()
            .ok_or(MeasurementIssue::MissingYaw { id })?;

        Ok(ObserverMeasurement {
            id,
            position,
            yaw_deg,
            pitch_deg: record.orientation.finite_pitch(),
        })
    }

    /// Same checks for a measurement that arrived with yaw already resolved
    pub fn validate_measurement(&self, measurement: &ObserverMeasurement) -> Result<ObserverMeasurement, MeasurementIssue> {
        let id = measurement.id;
        let position = self.validate_position(id, &measurement.position)?;

        if !measurement.yaw_deg.is_finite() {
            return Err(MeasurementIssue::MissingYaw { id });
        }

        Ok(ObserverMeasurement {
            id,
            position,
            yaw_deg: measurement.yaw_deg,
            pitch_deg: measurement.pitch_deg.filter(|pitch| pitch.is_finite()),
        })
    }

    fn validate_position(&self, id: u32, position: &GeodeticPoint) -> Result<GeodeticPoint, MeasurementIssue> {
        if !position.is_finite() {
            return Err(MeasurementIssue::NonFinitePosition { id, lat: position.lat, lon: position.lon });
        }
        if !(-90.0..=90.0).contains(&position.lat) {
            return Err(MeasurementIssue::LatitudeOutOfRange { id, lat: position.lat });
        }
        if !(-180.0..=180.0).contains(&position.lon) {
            return Err(MeasurementIssue::LongitudeOutOfRange { id, lon: position.lon });
        }

        let height = match position.height {
            Some(h) if !h.is_finite() => {
                debug!("observer {}: non-finite height {}, using 0", id, h);
                None
            }
            other => other,
        };

        Ok(GeodeticPoint { height, ..*position })
    }
}
