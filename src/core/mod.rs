//! Core types and constants for the bearing-only triangulation engine

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
