use thiserror::Error;

/// Hard failures of the triangulation engine.
///
/// Running short of observers and degenerate ray geometry are normal
/// outcomes and never show up here; see [`crate::core::Localization`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocalizationError {
    /// The frame converter received a non-finite coordinate
    #[error("cannot convert {stage} coordinate ({a}, {b}, {c}): non-finite input")]
    CoordinateConversion {
        stage: ConversionStage,
        a: f64,
        b: f64,
        c: f64,
    },
}

/// Which direction of the frame conversion failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStage {
    Geodetic,
    Ecef,
    Enu,
}

impl std::fmt::Display for ConversionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversionStage::Geodetic => write!(f, "geodetic"),
            ConversionStage::Ecef => write!(f, "ECEF"),
            ConversionStage::Enu => write!(f, "ENU"),
        }
    }
}
