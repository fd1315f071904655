//! # Peripheral Executable Parameters
//!
//! This module provides parameters for the peripheral executive itself:
//! the lightstrip request presets used by the intake wiring and the
//! configuration handed to the time-of-flight sensor driver.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use crate::light_ctrl::{LedState, TimedLedState};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PeriphExecParams {
    /// Persistent request shown while a cone is held in the intake.
    pub cone_intake: LedState,

    /// Persistent request shown while a cube is held in the intake.
    pub cube_intake: LedState,

    /// Transient request fired when a piece is first acquired.
    pub success_signal: TimedLedState,

    /// Sample period for the time-of-flight sensors.
    ///
    /// Units: milliseconds, valid range 24 to 1000
    pub tof_sample_period_ms: u32,

    /// Region of interest on the sensor array, `[x, y, width, height]`.
    pub tof_roi: [u8; 4],
}
