//! Bearing-only triangulation pipeline
//!
//! 1. Project usable observers into an ENU frame anchored at the first one
//! 2. Intersect every pair of bearing lines
//! 3. Per-axis median of the intersections (mean of origins if there are none)
//! 4. Altitude from the median of pitch-implied heights
//! 5. Reproject to geodetic and, given ground truth, measure the error

use crate::algorithms::estimator::RobustEstimator;
use crate::algorithms::intersection::RayIntersector;
use crate::algorithms::projection::{ObserverProjector, ProjectedObservers};
use crate::api::types::{CaseReport, ObserverRange};
use crate::core::{
    CaseData, Localization, LocalizationResult, ObserverMeasurement, ObserverRecord,
    MIN_OBSERVERS, PARALLEL_DETERMINANT_THRESHOLD,
};
use crate::utils::config::{ConfigError, EngineConfig};
use crate::validation::accuracy::geodesic_distance_m;
use crate::validation::error::LocalizationError;
use log::{debug, info, warn};
use std::thread;

/// Bearing-only position estimator.
///
/// Stateless between calls: each case is a pure function of its observers,
/// so one instance can serve many threads.
#[derive(Debug, Clone, Copy)]
pub struct BearingTriangulator {
    projector: ObserverProjector,
    intersector: RayIntersector,
    estimator: RobustEstimator,
    min_observers: usize,
}

impl Default for BearingTriangulator {
    fn default() -> Self {
        Self {
            projector: ObserverProjector::new(),
            intersector: RayIntersector::with_parallel_threshold(PARALLEL_DETERMINANT_THRESHOLD),
            estimator: RobustEstimator::new(),
            min_observers: MIN_OBSERVERS,
        }
    }
}

impl BearingTriangulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a configuration, rejecting out-of-range parameters
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        config.validate().into_result()?;

        Ok(Self {
            intersector: RayIntersector::with_parallel_threshold(config.parallel_threshold),
            min_observers: config.min_observers,
            ..Self::default()
        })
    }

    /// Localize from raw observer records, resolving yaw per record
    pub fn localize(&self, records: &[ObserverRecord]) -> Result<Localization, LocalizationError> {
        let projected = self.projector.project_records(records)?;
        self.localize_projected(projected)
    }

    /// Localize from measurements whose yaw is already resolved
    pub fn localize_measurements(&self, measurements: &[ObserverMeasurement]) -> Result<Localization, LocalizationError> {
        let projected = self.projector.project(measurements)?;
        self.localize_projected(projected)
    }

    fn localize_projected(&self, projected: Option<ProjectedObservers>) -> Result<Localization, LocalizationError> {
        let usable = projected.as_ref().map_or(0, ProjectedObservers::len);
        let projected = match projected {
            Some(projected) if usable >= self.min_observers => projected,
            _ => {
                debug!("only {} usable observers, need {}", usable, self.min_observers);
                return Ok(Localization::InsufficientObservers { usable });
            }
        };

        let candidates = self.intersector.candidates(&projected.rays);
        let estimate = self.estimator.estimate(&projected.rays, &projected.pitches, &candidates);
        let position = projected.frame.from_enu(&estimate.point)?;

        debug!(
            "{} observers, {} candidates, {} -> ({:.3}, {:.3}, {:.3}) m",
            usable,
            candidates.len(),
            estimate.method,
            estimate.point.east,
            estimate.point.north,
            estimate.point.up
        );

        Ok(Localization::Estimated(LocalizationResult {
            position,
            local: estimate.point,
            origin: *projected.frame.origin(),
            method: estimate.method,
            pairs_used: candidates.len(),
            observers_used: usable,
        }))
    }

    /// Localize one case and measure it against its ground truth
    pub fn evaluate(&self, case: &CaseData) -> Result<CaseReport, LocalizationError> {
        let localization = self.localize(&case.observers)?;

        let truth = case.truth.filter(|truth| {
            let usable = truth.is_finite() && truth.in_range();
            if !usable {
                warn!(
                    "case={} ignoring ground truth ({}, {}): not a valid position",
                    case.case_id, truth.lat, truth.lon
                );
            }
            usable
        });

        let error_m = match (localization.estimate(), truth) {
            (Some(result), Some(truth)) => Some(geodesic_distance_m(&result.position, &truth)),
            _ => None,
        };

        let observer_ranges = match truth {
            Some(truth) => case
                .observers
                .iter()
                .filter(|record| record.position.is_finite())
                .map(|record| ObserverRange {
                    observer_id: record.id,
                    distance_m: geodesic_distance_m(&record.position, &truth),
                })
                .collect(),
            None => Vec::new(),
        };

        match (&localization, error_m) {
            (Localization::Estimated(result), Some(error)) => info!(
                "[METRIC] case={} n_obs={} method={} error_m={:.3}",
                case.case_id, case.observers.len(), result.method, error
            ),
            (Localization::Estimated(result), None) => info!(
                "[METRIC] case={} n_obs={} method={} error_m=unknown",
                case.case_id, case.observers.len(), result.method
            ),
            (Localization::InsufficientObservers { usable }, _) => info!(
                "case={} skipped: {} usable observers",
                case.case_id, usable
            ),
        }

        Ok(CaseReport {
            case_id: case.case_id.clone(),
            observer_count: case.observers.len(),
            truth,
            localization,
            error_m,
            observer_ranges,
        })
    }

    /// Evaluate cases on up to `workers` threads; results keep input order
    pub fn evaluate_parallel(&self, cases: &[CaseData], workers: usize) -> Vec<Result<CaseReport, LocalizationError>> {
        let workers = workers.max(1);
        if workers == 1 || cases.len() < 2 {
            return cases.iter().map(|case| self.evaluate(case)).collect();
        }

        let chunk_size = cases.len().div_ceil(workers);
        thread::scope(|scope| {
            let handles: Vec<_> = cases
                .chunks(chunk_size)
                .map(|chunk| scope.spawn(move || chunk.iter().map(|case| self.evaluate(case)).collect::<Vec<_>>()))
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| match handle.join() {
                    Ok(reports) => reports,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        })
    }
}

/// Evaluate a batch of cases across the available cores, in input order
pub fn localize_cases_parallel(
    triangulator: &BearingTriangulator,
    cases: &[CaseData],
) -> Vec<Result<CaseReport, LocalizationError>> {
    let workers = thread::available_parallelism().map_or(1, |n| n.get());
    triangulator.evaluate_parallel(cases, workers)
}
