//! Secondary-sensor fusion strategies
//!
//! Whether the secondary sensor refines the cone width measurement or
//! detects cubes on its own is fixed when the robot is built, so the two
//! behaviours are separate strategy implementations selected once at module
//! initialisation rather than a branch taken on every query.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::Params;
use crate::tof_client::TofSample;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// How the secondary time-of-flight sensor contributes to estimation.
pub trait SensorFusion {
    /// Estimated width of a held cone.
    ///
    /// Units: millimeters
    fn cone_width_mm(&self, sample: &TofSample, params: &Params) -> f64;

    /// Lateral offset of a held cube from the centred baseline.
    ///
    /// Units: millimeters, signed
    fn cube_offset_mm(&self, sample: &TofSample, params: &Params) -> f64;

    /// True if the secondary sensor provides an independent cube offset
    /// signal.
    fn cube_tof_active(&self) -> bool;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Both sensors triangulate the cone: as the cone occludes each sensor the
/// combined reading shrinks below twice the baseline by exactly the cone's
/// width.
pub struct PairedFusion;

/// The secondary sensor stands alone as a cube detector; cone width falls
/// back to its nominal value.
pub struct IndependentFusion;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SensorFusion for PairedFusion {
    fn cone_width_mm(&self, sample: &TofSample, params: &Params) -> f64 {
        (params.halfway_mm.cone * 2.0) - (sample.primary_mm + sample.secondary_mm)
    }

    fn cube_offset_mm(&self, _sample: &TofSample, _params: &Params) -> f64 {
        // No sensor is watching cubes in this configuration, report centred
        0.0
    }

    fn cube_tof_active(&self) -> bool {
        false
    }
}

impl SensorFusion for IndependentFusion {
    fn cone_width_mm(&self, _sample: &TofSample, params: &Params) -> f64 {
        params.width_mm.cone
    }

    fn cube_offset_mm(&self, sample: &TofSample, params: &Params) -> f64 {
        // The baseline here is the cone halfway reference, not the cube one.
        // Alignment tuning assumes this; the behaviour is pinned by a test.
        ((params.width_mm.cube / 2.0) + sample.secondary_mm) - params.halfway_mm.cone
    }

    fn cube_tof_active(&self) -> bool {
        true
    }
}
