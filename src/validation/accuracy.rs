use crate::api::types::CaseReport;
use crate::core::{GeodeticPoint, LocalizationMethod};
use crate::algorithms::estimator::median;
use geo::{GeodesicDistance, Point};
use serde::{Deserialize, Serialize};

/// Geodesic surface distance on the WGS84 ellipsoid, in meters.
///
/// Heights are ignored. Uses Karney's algorithm.
pub fn geodesic_distance_m(a: &GeodeticPoint, b: &GeodeticPoint) -> f64 {
    let a = Point::new(a.lon, a.lat);
    let b = Point::new(b.lon, b.lat);
    a.geodesic_distance(&b)
}

/// Accuracy statistics over a batch of cases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracySummary {
    /// Cases evaluated
    pub case_count: usize,
    /// Cases that produced an estimate
    pub located_count: usize,
    /// Located cases with a known ground truth
    pub with_truth_count: usize,
    pub triangulated_count: usize,
    pub fallback_count: usize,
    /// Mean error (meters)
    pub mean_error_m: Option<f64>,
    /// Median error (meters)
    pub median_error_m: Option<f64>,
    /// Root mean square error (meters)
    pub rmse_m: Option<f64>,
    /// 95th percentile error (meters, nearest rank)
    pub error_95_percentile_m: Option<f64>,
    pub min_error_m: Option<f64>,
    pub max_error_m: Option<f64>,
}

impl AccuracySummary {
    pub fn from_reports(reports: &[CaseReport]) -> Self {
        let located: Vec<_> = reports
            .iter()
            .filter_map(|report| report.localization.estimate())
            .collect();

        let count_method = |method: LocalizationMethod| located.iter().filter(|r| r.method == method).count();

        let mut errors: Vec<f64> = reports.iter().filter_map(|report| report.error_m).collect();
        errors.sort_by(f64::total_cmp);

        let n = errors.len();
        let (mean, rmse, p95) = if n == 0 {
            (None, None, None)
        } else {
            let mean = errors.iter().sum::<f64>() / n as f64;
            let rmse = (errors.iter().map(|e| e * e).sum::<f64>() / n as f64).sqrt();
            let rank = ((0.95 * n as f64).ceil() as usize).clamp(1, n);
            (Some(mean), Some(rmse), Some(errors[rank - 1]))
        };

        Self {
            case_count: reports.len(),
            located_count: located.len(),
            with_truth_count: n,
            triangulated_count: count_method(LocalizationMethod::TriangulationMedian),
            fallback_count: count_method(LocalizationMethod::FallbackNoIntersections),
            mean_error_m: mean,
            median_error_m: median(&errors),
            rmse_m: rmse,
            error_95_percentile_m: p95,
            min_error_m: errors.first().copied(),
            max_error_m: errors.last().copied(),
        }
    }
}
