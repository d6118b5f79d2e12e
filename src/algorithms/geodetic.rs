//! Geodetic frame conversions on the WGS84 ellipsoid
//!
//! Provides:
//! - geodetic (lat/lon/height) to Earth-Centered Earth-Fixed Cartesian and back
//! - a local East-North-Up tangent plane anchored at a reference point
//!
//! The inverse ECEF conversion uses Bowring's closed form, which stays well
//! below a millimeter for terrestrial heights.

use crate::core::{EnuPoint, GeodeticPoint, WGS84_A, WGS84_B, WGS84_E2, WGS84_EP2};
use crate::validation::error::{ConversionStage, LocalizationError};
use nalgebra::{Matrix3, Vector3};

/// Converts a geodetic point to ECEF coordinates (meters)
pub fn to_ecef(point: &GeodeticPoint) -> Result<Vector3<f64>, LocalizationError> {
    let height = point.height_or_zero();
    if !point.is_finite() || !height.is_finite() {
        return Err(LocalizationError::CoordinateConversion {
            stage: ConversionStage::Geodetic,
            a: point.lat,
            b: point.lon,
            c: height,
        });
    }

    let (slat, clat) = point.lat.to_radians().sin_cos();
    let (slon, clon) = point.lon.to_radians().sin_cos();

    // Prime vertical radius of curvature
    let n = WGS84_A / (1.0 - WGS84_E2 * slat * slat).sqrt();

    Ok(Vector3::new(
        (n + height) * clat * clon,
        (n + height) * clat * slon,
        (n * (1.0 - WGS84_E2) + height) * slat,
    ))
}

/// Converts ECEF coordinates back to a geodetic point; height is always set
pub fn to_geodetic(ecef: &Vector3<f64>) -> Result<GeodeticPoint, LocalizationError> {
    if !ecef.iter().all(|c| c.is_finite()) {
        return Err(LocalizationError::CoordinateConversion {
            stage: ConversionStage::Ecef,
            a: ecef.x,
            b: ecef.y,
            c: ecef.z,
        });
    }

    let (x, y, z) = (ecef.x, ecef.y, ecef.z);
    let lon = y.atan2(x);
    let p = x.hypot(y);

    let theta = (z * WGS84_A).atan2(p * WGS84_B);
    let (sin_t, cos_t) = theta.sin_cos();

    let lat = (z + WGS84_EP2 * WGS84_B * sin_t.powi(3))
        .atan2(p - WGS84_E2 * WGS84_A * cos_t.powi(3));

    let (slat, clat) = lat.sin_cos();
    let n = WGS84_A / (1.0 - WGS84_E2 * slat * slat).sqrt();

    // p / cos(lat) degenerates at the poles
    let height = if clat.abs() > 1e-10 {
        p / clat - n
    } else {
        z.abs() - n * (1.0 - WGS84_E2)
    };

    Ok(GeodeticPoint::with_height(lat.to_degrees(), lon.to_degrees(), height))
}

/// East-North-Up tangent plane anchored at a geodetic origin
#[derive(Debug, Clone, PartialEq)]
pub struct LocalFrame {
    origin: GeodeticPoint,
    origin_ecef: Vector3<f64>,
    /// Rows are the east, north and up unit vectors expressed in ECEF
    rotation: Matrix3<f64>,
}

impl LocalFrame {
    /// Build the frame; fails only on a non-finite origin
    pub fn new(origin: GeodeticPoint) -> Result<Self, LocalizationError> {
        let origin_ecef = to_ecef(&origin)?;

        let (slat, clat) = origin.lat.to_radians().sin_cos();
        let (slon, clon) = origin.lon.to_radians().sin_cos();

        let rotation = Matrix3::new(
            -slon,         clon,         0.0,
            -slat * clon, -slat * slon,  clat,
             clat * clon,  clat * slon,  slat,
        );

        Ok(Self { origin, origin_ecef, rotation })
    }

    pub fn origin(&self) -> &GeodeticPoint {
        &self.origin
    }

    /// Local coordinates of a geodetic point relative to the origin
    pub fn enu_of(&self, target: &GeodeticPoint) -> Result<EnuPoint, LocalizationError> {
        let delta = to_ecef(target)? - self.origin_ecef;
        let enu = self.rotation * delta;
        Ok(EnuPoint::new(enu.x, enu.y, enu.z))
    }

    /// Geodetic point for local coordinates; exact inverse of [`Self::enu_of`]
    pub fn from_enu(&self, local: &EnuPoint) -> Result<GeodeticPoint, LocalizationError> {
        if !(local.east.is_finite() && local.north.is_finite() && local.up.is_finite()) {
            return Err(LocalizationError::CoordinateConversion {
                stage: ConversionStage::Enu,
                a: local.east,
                b: local.north,
                c: local.up,
            });
        }

        let enu = Vector3::new(local.east, local.north, local.up);
        let ecef = self.origin_ecef + self.rotation.transpose() * enu;
        to_geodetic(&ecef)
    }
}

/// ENU coordinates of `target` in the frame anchored at `origin`
pub fn enu_of(origin: &GeodeticPoint, target: &GeodeticPoint) -> Result<EnuPoint, LocalizationError> {
    LocalFrame::new(*origin)?.enu_of(target)
}

/// Geodetic point for `local` in the frame anchored at `origin`
pub fn from_enu(origin: &GeodeticPoint, local: &EnuPoint) -> Result<GeodeticPoint, LocalizationError> {
    LocalFrame::new(*origin)?.from_enu(local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_ecef_equator() {
        let ecef = to_ecef(&GeodeticPoint::new(0.0, 0.0)).unwrap();

        assert_abs_diff_eq!(ecef.x, WGS84_A, epsilon = 1e-6);
        assert_abs_diff_eq!(ecef.y, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(ecef.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_ecef_north_pole() {
        let ecef = to_ecef(&GeodeticPoint::new(90.0, 0.0)).unwrap();

        assert_abs_diff_eq!(ecef.x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(ecef.z, WGS84_B, epsilon = 1e-3);

        let back = to_geodetic(&ecef).unwrap();
        assert_abs_diff_eq!(back.lat, 90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(back.height.unwrap(), 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_ecef_roundtrip() {
        let points = [
            GeodeticPoint::with_height(51.5, -0.1, 100.0),
            GeodeticPoint::with_height(40.7, -74.0, 50.0),
            GeodeticPoint::with_height(-33.9, 18.4, 20.0),
            GeodeticPoint::with_height(25.2, 55.3, 4.0),
        ];

        for point in points {
            let back = to_geodetic(&to_ecef(&point).unwrap()).unwrap();
            assert_abs_diff_eq!(back.lat, point.lat, epsilon = 1e-9);
            assert_abs_diff_eq!(back.lon, point.lon, epsilon = 1e-9);
            assert_abs_diff_eq!(back.height.unwrap(), point.height.unwrap(), epsilon = 1e-3);
        }
    }

    #[test]
    fn test_enu_axes() {
        let origin = GeodeticPoint::new(25.0, 55.0);
        let frame = LocalFrame::new(origin).unwrap();

        // ~111 m north
        let north = frame.enu_of(&GeodeticPoint::new(25.001, 55.0)).unwrap();
        assert!(north.north > 100.0 && north.north < 120.0);
        assert_abs_diff_eq!(north.east, 0.0, epsilon = 1e-6);

        // ~100 m east at this latitude
        let east = frame.enu_of(&GeodeticPoint::new(25.0, 55.001)).unwrap();
        assert!(east.east > 95.0 && east.east < 110.0);
        assert!(east.north.abs() < 0.01);

        let up = frame.enu_of(&GeodeticPoint::with_height(25.0, 55.0, 30.0)).unwrap();
        assert_abs_diff_eq!(up.up, 30.0, epsilon = 1e-6);
        assert_abs_diff_eq!(up.east, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_enu_roundtrip_within_millimeter() {
        let origin = GeodeticPoint::with_height(47.3769, 8.5417, 408.0);
        let frame = LocalFrame::new(origin).unwrap();

        for (de, dn, du) in [(0.0, 0.0, 0.0), (1500.0, -800.0, 35.0), (-3000.0, 2500.0, -10.0), (12.5, 4000.0, 250.0)] {
            let target = frame.from_enu(&EnuPoint::new(de, dn, du)).unwrap();
            let target = to_geodetic(&to_ecef(&target).unwrap()).unwrap();
            let local = frame.enu_of(&target).unwrap();
            let back = frame.from_enu(&local).unwrap();

            assert_abs_diff_eq!(back.lat, target.lat, epsilon = 1e-6);
            assert_abs_diff_eq!(back.lon, target.lon, epsilon = 1e-6);
            assert_abs_diff_eq!(back.height.unwrap(), target.height.unwrap(), epsilon = 1e-3);

            assert_abs_diff_eq!(local.east, de, epsilon = 1e-3);
            assert_abs_diff_eq!(local.north, dn, epsilon = 1e-3);
            assert_abs_diff_eq!(local.up, du, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_free_functions_match_frame() {
        let origin = GeodeticPoint::new(-12.0, 130.0);
        let target = GeodeticPoint::with_height(-12.002, 130.003, 5.0);

        let local = enu_of(&origin, &target).unwrap();
        let back = from_enu(&origin, &local).unwrap();
        assert_abs_diff_eq!(back.lat, target.lat, epsilon = 1e-9);
        assert_abs_diff_eq!(back.lon, target.lon, epsilon = 1e-9);
    }

    #[test]
    fn test_non_finite_input_fails() {
        assert!(to_ecef(&GeodeticPoint::new(f64::NAN, 0.0)).is_err());
        assert!(to_ecef(&GeodeticPoint::with_height(0.0, 0.0, f64::INFINITY)).is_err());
        assert!(LocalFrame::new(GeodeticPoint::new(0.0, f64::NAN)).is_err());
        assert!(to_geodetic(&Vector3::new(f64::NAN, 0.0, 0.0)).is_err());

        let frame = LocalFrame::new(GeodeticPoint::new(0.0, 0.0)).unwrap();
        assert!(matches!(
            frame.from_enu(&EnuPoint::new(f64::NAN, 0.0, 0.0)),
            Err(LocalizationError::CoordinateConversion { stage: ConversionStage::Enu, .. })
        ));
    }
}
