use crate::core::{GeodeticPoint, ObserverRecord, Orientation};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// A JSON number that may also arrive as a numeric string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LenientNumber {
    Number(f64),
    Text(String),
}

impl LenientNumber {
    /// Numeric value, or `None` for text that does not parse
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            LenientNumber::Number(value) => Some(*value),
            LenientNumber::Text(text) => text.trim().parse().ok(),
        }
    }
}

/// GPS block of a record
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GpsDto {
    #[serde(default)]
    pub latitude: Option<LenientNumber>,
    #[serde(default)]
    pub longitude: Option<LenientNumber>,
    #[serde(default)]
    pub altitude: Option<LenientNumber>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompassDto {
    #[serde(default)]
    pub heading: Option<LenientNumber>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GyroDto {
    #[serde(default)]
    pub yaw_geo_north: Option<LenientNumber>,
    #[serde(default)]
    pub yaw_magnetic_north: Option<LenientNumber>,
    #[serde(default)]
    pub pitch: Option<LenientNumber>,
}

/// One `data.json` record as written by the capture app.
///
/// GPS fields live either under `gps` or at the top level of the record; the
/// nested block wins when present. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ObservationRecordDto {
    #[serde(default)]
    pub gps: Option<GpsDto>,
    #[serde(flatten)]
    pub inline_gps: GpsDto,
    #[serde(default)]
    pub compass: Option<CompassDto>,
    #[serde(default)]
    pub gyro: Option<GyroDto>,
}

/// Object (ground truth) records share the observation layout; only GPS is read
pub type ObjectRecordDto = ObservationRecordDto;

/// Errors while reading dataset records
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("record has no {field}")]
    MissingPosition { field: &'static str },

    #[error("record {field} is not a number: {value:?}")]
    InvalidPosition { field: &'static str, value: String },
}

fn required(value: &Option<LenientNumber>, field: &'static str) -> Result<f64, IngestError> {
    match value {
        None => Err(IngestError::MissingPosition { field }),
        Some(number) => number.as_f64().ok_or_else(|| IngestError::InvalidPosition {
            field,
            value: format!("{:?}", number),
        }),
    }
}

fn lenient(value: &Option<LenientNumber>) -> Option<f64> {
    value.as_ref().and_then(LenientNumber::as_f64)
}

impl ObservationRecordDto {
    pub fn gps_block(&self) -> &GpsDto {
        self.gps.as_ref().unwrap_or(&self.inline_gps)
    }

    /// Position of the record; latitude and longitude are required
    pub fn position(&self) -> Result<GeodeticPoint, IngestError> {
        let gps = self.gps_block();
        let lat = required(&gps.latitude, "latitude")?;
        let lon = required(&gps.longitude, "longitude")?;

        let height = match &gps.altitude {
            None => None,
            Some(_) => Some(required(&gps.altitude, "altitude")?),
        };

        Ok(GeodeticPoint { lat, lon, height })
    }

    /// Orientation fields; unparseable values count as absent
    pub fn orientation(&self) -> Orientation {
        let gyro = self.gyro.clone().unwrap_or_default();
        let compass = self.compass.clone().unwrap_or_default();

        Orientation {
            yaw_geo_north: lenient(&gyro.yaw_geo_north),
            yaw_magnetic_north: lenient(&gyro.yaw_magnetic_north),
            heading: lenient(&compass.heading),
            pitch: lenient(&gyro.pitch),
        }
    }
}

/// Parse an observation record; records without a usable GPS fix are rejected
pub fn parse_observation(id: u32, json: &str) -> Result<ObserverRecord, IngestError> {
    let dto: ObservationRecordDto = serde_json::from_str(json)?;

    Ok(ObserverRecord {
        id,
        position: dto.position()?,
        orientation: dto.orientation(),
    })
}

/// Parse an object record into the ground-truth position
pub fn parse_object(json: &str) -> Result<GeodeticPoint, IngestError> {
    let dto: ObjectRecordDto = serde_json::from_str(json)?;
    dto.position()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_gps() {
        let json = r#"{
            "timestamp": "2024-05-01T10:00:00Z",
            "gps": {"latitude": 25.2, "longitude": 55.3, "altitude": 12.5, "accuracy": 4},
            "compass": {"heading": 181.0},
            "gyro": {"yaw_geo_north": 179.5, "yaw_magnetic_north": 178.0, "pitch": 7.5},
            "device": "pixel"
        }"#;

        let record = parse_observation(3, json).unwrap();
        assert_eq!(record.id, 3);
        assert_eq!(record.position, GeodeticPoint::with_height(25.2, 55.3, 12.5));
        assert_eq!(record.orientation.yaw_geo_north, Some(179.5));
        assert_eq!(record.orientation.heading, Some(181.0));
        assert_eq!(record.orientation.pitch, Some(7.5));
        assert_eq!(record.orientation.resolve_yaw(), Some(179.5));
    }

    #[test]
    fn test_parse_flat_gps() {
        let json = r#"{"latitude": "25.2", "longitude": 55.3, "compass": {"heading": "90"}}"#;

        let record = parse_observation(1, json).unwrap();
        assert_eq!(record.position, GeodeticPoint::new(25.2, 55.3));
        assert_eq!(record.orientation.resolve_yaw(), Some(90.0));
        assert_eq!(record.orientation.pitch, None);
    }

    #[test]
    fn test_nulls_and_bad_orientation_values() {
        let json = r#"{
            "gps": {"latitude": 1.0, "longitude": 2.0, "altitude": null},
            "compass": null,
            "gyro": {"yaw_geo_north": null, "yaw_magnetic_north": "n/a", "pitch": "-3"}
        }"#;

        let record = parse_observation(2, json).unwrap();
        assert_eq!(record.position.height, None);
        assert_eq!(record.orientation.yaw_geo_north, None);
        assert_eq!(record.orientation.yaw_magnetic_north, None);
        assert_eq!(record.orientation.pitch, Some(-3.0));
        assert_eq!(record.orientation.resolve_yaw(), None);
    }

    #[test]
    fn test_missing_or_invalid_position() {
        let err = parse_observation(1, r#"{"gps": {"longitude": 2.0}}"#).unwrap_err();
        assert!(matches!(err, IngestError::MissingPosition { field: "latitude" }));

        let err = parse_observation(1, r#"{"gps": {"latitude": "north", "longitude": 2.0}}"#).unwrap_err();
        assert!(matches!(err, IngestError::InvalidPosition { field: "latitude", .. }));

        let err = parse_observation(1, r#"{"compass": {"heading": 10}}"#).unwrap_err();
        assert!(matches!(err, IngestError::MissingPosition { .. }));

        let err = parse_observation(1, "{not json").unwrap_err();
        assert!(matches!(err, IngestError::Json(_)));
    }

    #[test]
    fn test_parse_object() {
        let truth = parse_object(r#"{"gps": {"latitude": 24.9, "longitude": 55.1, "altitude": "80"}}"#).unwrap();
        assert_eq!(truth, GeodeticPoint::with_height(24.9, 55.1, 80.0));

        assert!(parse_object(r#"{"note": "no fix"}"#).is_err());
    }
}
