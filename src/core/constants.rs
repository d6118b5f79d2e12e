//! Physical constants and engine parameters

/// WGS84 semi-major axis (meters)
pub const WGS84_A: f64 = 6378137.0;

/// WGS84 flattening
pub const WGS84_F: f64 = 1.0 / 298.257223563;

/// WGS84 semi-minor axis (meters)
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);

/// WGS84 first eccentricity squared
pub const WGS84_E2: f64 = 2.0 * WGS84_F - WGS84_F * WGS84_F;

/// WGS84 second eccentricity squared
pub const WGS84_EP2: f64 = WGS84_E2 / (1.0 - WGS84_E2);

/// Ray pairs whose direction determinant falls below this are treated as parallel
pub const PARALLEL_DETERMINANT_THRESHOLD: f64 = 1e-6;

/// Fewest observers with a usable yaw that can produce an estimate
pub const MIN_OBSERVERS: usize = 2;

/// Observation record folders scanned per case (1..=N)
pub const MAX_OBSERVATION_RECORDS: u32 = 100;
