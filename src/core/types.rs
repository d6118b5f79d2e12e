//! Core data types for the triangulation engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Geodetic position on the WGS84 ellipsoid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodeticPoint {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
    /// Height above the ellipsoid in meters, if the source reported one
    pub height: Option<f64>,
}

impl GeodeticPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon, height: None }
    }

    pub fn with_height(lat: f64, lon: f64, height: f64) -> Self {
        Self { lat, lon, height: Some(height) }
    }

    /// Height used for geometry; a missing height sits on the ellipsoid
    pub fn height_or_zero(&self) -> f64 {
        self.height.unwrap_or(0.0)
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// Latitude in [-90, 90] and longitude in [-180, 180]
    pub fn in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Point in a local East-North-Up tangent plane (meters)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EnuPoint {
    pub east: f64,
    pub north: f64,
    pub up: f64,
}

impl EnuPoint {
    pub fn new(east: f64, north: f64, up: f64) -> Self {
        Self { east, north, up }
    }

    pub fn horizontal(east: f64, north: f64) -> Self {
        Self { east, north, up: 0.0 }
    }

    /// Distance in the east/north plane, ignoring the vertical component
    pub fn horizontal_distance_to(&self, other: &EnuPoint) -> f64 {
        (self.east - other.east).hypot(self.north - other.north)
    }
}

/// Raw orientation fields of one observation record, all in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Orientation {
    /// Gyro yaw referenced to true north
    pub yaw_geo_north: Option<f64>,
    /// Gyro yaw referenced to magnetic north
    pub yaw_magnetic_north: Option<f64>,
    /// Compass heading
    pub heading: Option<f64>,
    /// Vertical look angle, positive upward
    pub pitch: Option<f64>,
}

impl Orientation {
    /// Yaw by priority: geo-referenced gyro, magnetic gyro, compass heading.
    /// The first finite value wins.
    pub fn resolve_yaw(&self) -> Option<f64> {
        [self.yaw_geo_north, self.yaw_magnetic_north, self.heading]
            .into_iter()
            .flatten()
            .find(|yaw| yaw.is_finite())
    }

    pub fn finite_pitch(&self) -> Option<f64> {
        self.pitch.filter(|pitch| pitch.is_finite())
    }
}

/// One observer as read from the dataset, before yaw resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObserverRecord {
    pub id: u32,
    pub position: GeodeticPoint,
    pub orientation: Orientation,
}

/// Observer pose usable by the engine: position plus resolved yaw
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObserverMeasurement {
    pub id: u32,
    pub position: GeodeticPoint,
    /// Clockwise from true north
    pub yaw_deg: f64,
    /// Positive upward
    pub pitch_deg: Option<f64>,
}

/// Observers and optional ground truth for one case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseData {
    pub case_id: String,
    pub observers: Vec<ObserverRecord>,
    pub truth: Option<GeodeticPoint>,
}

/// How the horizontal estimate was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocalizationMethod {
    /// Per-axis median of pairwise ray intersections
    #[serde(rename = "triangulation-median")]
    TriangulationMedian,
    /// Mean of observer origins; no pair of rays intersected
    #[serde(rename = "fallback-no-intersections")]
    FallbackNoIntersections,
}

impl LocalizationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocalizationMethod::TriangulationMedian => "triangulation-median",
            LocalizationMethod::FallbackNoIntersections => "fallback-no-intersections",
        }
    }
}

impl fmt::Display for LocalizationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Estimate for a single case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizationResult {
    /// Estimated target position; the height is always populated
    pub position: GeodeticPoint,
    /// Same estimate in the case's ENU frame
    pub local: EnuPoint,
    /// Observer that anchors the ENU frame
    pub origin: GeodeticPoint,
    pub method: LocalizationMethod,
    /// Number of ray pairs that produced an intersection
    pub pairs_used: usize,
    /// Number of observers with a usable yaw
    pub observers_used: usize,
}

/// Outcome of localizing one case
#[derive(Debug, Clone, PartialEq)]
pub enum Localization {
    Estimated(LocalizationResult),
    /// Fewer observers with a usable yaw than the engine needs
    InsufficientObservers { usable: usize },
}

impl Localization {
    pub fn estimate(&self) -> Option<&LocalizationResult> {
        match self {
            Localization::Estimated(result) => Some(result),
            Localization::InsufficientObservers { .. } => None,
        }
    }

    pub fn into_estimate(self) -> Option<LocalizationResult> {
        match self {
            Localization::Estimated(result) => Some(result),
            Localization::InsufficientObservers { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaw_priority() {
        let orientation = Orientation {
            yaw_geo_north: Some(10.0),
            yaw_magnetic_north: Some(20.0),
            heading: Some(30.0),
            pitch: None,
        };
        assert_eq!(orientation.resolve_yaw(), Some(10.0));

        let orientation = Orientation {
            yaw_geo_north: None,
            yaw_magnetic_north: Some(20.0),
            heading: Some(30.0),
            pitch: None,
        };
        assert_eq!(orientation.resolve_yaw(), Some(20.0));

        let orientation = Orientation { heading: Some(30.0), ..Default::default() };
        assert_eq!(orientation.resolve_yaw(), Some(30.0));
    }

    #[test]
    fn test_yaw_skips_non_finite() {
        let orientation = Orientation {
            yaw_geo_north: Some(f64::NAN),
            yaw_magnetic_north: Some(f64::INFINITY),
            heading: Some(270.0),
            pitch: Some(f64::NAN),
        };
        assert_eq!(orientation.resolve_yaw(), Some(270.0));
        assert_eq!(orientation.finite_pitch(), None);

        assert_eq!(Orientation::default().resolve_yaw(), None);
    }

    #[test]
    fn test_geodetic_range() {
        assert!(GeodeticPoint::new(45.0, 7.0).in_range());
        assert!(!GeodeticPoint::new(91.0, 7.0).in_range());
        assert!(!GeodeticPoint::new(45.0, -181.0).in_range());
        assert!(!GeodeticPoint::new(f64::NAN, 7.0).is_finite());
        assert_eq!(GeodeticPoint::new(1.0, 2.0).height_or_zero(), 0.0);
    }

    #[test]
    fn test_method_tags() {
        assert_eq!(LocalizationMethod::TriangulationMedian.to_string(), "triangulation-median");
        assert_eq!(
            serde_json::to_string(&LocalizationMethod::FallbackNoIntersections).unwrap(),
            "\"fallback-no-intersections\""
        );
    }
}
