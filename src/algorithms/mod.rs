//! Core localization algorithms

pub mod estimator;
pub mod geodetic;
pub mod intersection;
pub mod projection;
pub mod triangulation;

pub use geodetic::LocalFrame;
pub use triangulation::{localize_cases_parallel, BearingTriangulator};
