//! # Time-of-flight estimation module
//!
//! Infers the width, lateral offset and presence of game pieces held in the
//! intake from the two time-of-flight range sensors mounted either side of
//! it. How the secondary sensor is used is fixed at initialisation: either
//! paired with the primary to triangulate a cone's width, or standing alone
//! as an independent cube detector.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod fusion;
mod params;
mod state;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use fusion::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during TofEst initialisation.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Failed to load parameters: {0}")]
    ParamLoadError(util::params::LoadError),
}

/// Possible errors that can occur during TofEst cyclic processing.
///
/// There are none: the estimator is pure arithmetic over the latest sample
/// and always produces a result, even for physically implausible readings.
/// Plausibility checks are the caller's responsibility.
#[derive(Debug, thiserror::Error)]
pub enum TofEstError {}
