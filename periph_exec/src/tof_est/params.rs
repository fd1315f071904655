//! Parameters structure for TofEst

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for time-of-flight estimation.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    /// When true the secondary sensor is paired with the primary to
    /// triangulate cone width. When false it is an independent cube
    /// detector.
    pub paired_secondary: bool,

    /// Nominal piece widths, used where triangulation is unavailable.
    /// Precise, used for alignment.
    ///
    /// Units: millimeters
    pub width_mm: PieceRefs,

    /// Presence thresholds: a piece is held if its sensor reads strictly
    /// below this. Imprecise, only tells whether a piece is inside.
    ///
    /// Units: millimeters
    pub full_mm: PieceRefs,

    /// Sensor-to-piece-centre baseline at rest, the zero-offset reference.
    ///
    /// Units: millimeters
    pub halfway_mm: PieceRefs,
}

/// A per-piece-class pair of reference distances.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct PieceRefs {
    pub cone: f64,
    pub cube: f64,
}
