//! # Data Store

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::{
    light_ctrl::{self, LightCtrl},
    tof_est::{self, TofEst},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    // LightCtrl
    pub light_ctrl: LightCtrl,
    pub light_ctrl_output: light_ctrl::OutputData,
    pub light_ctrl_status_rpt: light_ctrl::StatusReport,

    // TofEst
    pub tof_est: TofEst,
    pub tof_est_output: tof_est::OutputData,
    pub tof_est_status_rpt: tof_est::StatusReport,

    // Intake wiring edge detection
    /// Whether a cone was held on the previous cycle
    pub cone_was_held: bool,

    /// Whether a cube was held on the previous cycle
    pub cube_was_held: bool,

    // Monitoring counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}
