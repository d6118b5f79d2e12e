//! Robust aggregation of intersection candidates
//!
//! The horizontal estimate is the per-axis median of all candidates, east and
//! north taken independently. This is an approximation of a 2-D geometric
//! median or a least-squares ray-bundle fit, kept because it resists a few
//! badly oriented observers without an iterative solver.

use crate::algorithms::intersection::Candidate;
use crate::algorithms::projection::Ray;
use crate::core::{EnuPoint, LocalizationMethod};

/// Estimate in the case's local frame before reprojection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalEstimate {
    pub point: EnuPoint,
    pub method: LocalizationMethod,
}

/// Median of the values; the mean of the two middle values for an even count
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Per-axis median estimator with a mean-of-origins fallback
#[derive(Debug, Clone, Copy, Default)]
pub struct RobustEstimator;

impl RobustEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Horizontal (east, north) estimate; `up` is left at zero.
    ///
    /// With no candidates the estimate is the mean of the ray origins. An
    /// empty ray list yields the frame origin.
    pub fn horizontal(&self, rays: &[Ray], candidates: &[Candidate]) -> (f64, f64, LocalizationMethod) {
        if candidates.is_empty() {
            let count = rays.len().max(1) as f64;
            let (east, north) = rays
                .iter()
                .fold((0.0, 0.0), |(e, n), ray| (e + ray.origin.x, n + ray.origin.y));
            return (east / count, north / count, LocalizationMethod::FallbackNoIntersections);
        }

        let easts: Vec<f64> = candidates.iter().map(|c| c.point.x).collect();
        let norths: Vec<f64> = candidates.iter().map(|c| c.point.y).collect();

        // Non-empty inputs always have a median
        let east = median(&easts).unwrap_or_default();
        let north = median(&norths).unwrap_or_default();

        (east, north, LocalizationMethod::TriangulationMedian)
    }

    /// Median of `tan(pitch_i) * d_i` over observers with a finite pitch, or 0
    pub fn altitude(&self, rays: &[Ray], pitches: &[Option<f64>], east: f64, north: f64) -> f64 {
        let heights: Vec<f64> = rays
            .iter()
            .zip(pitches)
            .filter_map(|(ray, pitch)| {
                let pitch = pitch.filter(|p| p.is_finite())?;
                let distance = (ray.origin.x - east).hypot(ray.origin.y - north);
                Some(pitch.to_radians().tan() * distance)
            })
            .collect();

        median(&heights).unwrap_or(0.0)
    }

    /// Full local estimate: horizontal position plus pitch-derived altitude
    pub fn estimate(&self, rays: &[Ray], pitches: &[Option<f64>], candidates: &[Candidate]) -> LocalEstimate {
        let (east, north, method) = self.horizontal(rays, candidates);
        let up = self.altitude(rays, pitches, east, north);

        LocalEstimate {
            point: EnuPoint::new(east, north, up),
            method,
        }
    }
}
