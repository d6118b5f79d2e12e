//! Pairwise intersection of observer bearing lines
//!
//! For rays `pi + ti*di` and `pj + tj*dj` the system
//!
//! ```text
//! [ dix  -djx ] [ti]   [pjx - pix]
//! [ diy  -djy ] [tj] = [pjy - piy]
//! ```
//!
//! is solved with Cramer's rule. Parameters may come out negative: a bearing
//! is treated as a full line, not a half-line.

use crate::algorithms::projection::Ray;
use crate::core::PARALLEL_DETERMINANT_THRESHOLD;
use nalgebra::Vector2;

/// Intersection of the rays at indices `i < j`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// (east, north) in meters
    pub point: Vector2<f64>,
    pub i: usize,
    pub j: usize,
}

/// Intersects every unordered pair of rays, skipping near-parallel pairs
#[derive(Debug, Clone, Copy)]
pub struct RayIntersector {
    parallel_threshold: f64,
}

impl Default for RayIntersector {
    fn default() -> Self {
        Self {
            parallel_threshold: PARALLEL_DETERMINANT_THRESHOLD,
        }
    }
}

impl RayIntersector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parallel_threshold(parallel_threshold: f64) -> Self {
        Self { parallel_threshold }
    }

    pub fn parallel_threshold(&self) -> f64 {
        self.parallel_threshold
    }

    /// Intersection of two rays, or `None` when `|det| < threshold`
    pub fn intersect(&self, a: &Ray, b: &Ray) -> Option<Vector2<f64>> {
        // det = dix*djy - diy*djx
        let det = a.direction.perp(&b.direction);
        if det.abs() < self.parallel_threshold {
            return None;
        }

        let rhs = b.origin - a.origin;
        let ti = rhs.perp(&b.direction) / det;

        Some(a.origin + a.direction * ti)
    }

    /// Candidates for all pairs (i, j) with i < j
    pub fn candidates(&self, rays: &[Ray]) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        for (i, a) in rays.iter().enumerate() {
            for (j, b) in rays.iter().enumerate().skip(i + 1) {
                if let Some(point) = self.intersect(a, b) {
                    candidates.push(Candidate { point, i, j });
                }
            }
        }

        candidates
    }
}
