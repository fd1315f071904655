//! # Time-of-flight client
//!
//! Provides the per-cycle range readings consumed by `tof_est`. Readings are
//! handed over as a single `TofSample` snapshot so the estimator never sees
//! a pair that is only partially refreshed. `SimTofClient` synthesises a
//! piece drifting in and out of the intake.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use serde::Serialize;

// Internal
use util::time::Stopwatch;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Period of the simulated piece's drift through the intake.
///
/// Units: seconds
const SIM_DRIFT_PERIOD_S: f64 = 12.0;

/// Range reported when the simulated intake is empty.
///
/// Units: millimeters
const SIM_EMPTY_RANGE_MM: f64 = 120.0;

/// Closest approach of the simulated piece to each sensor.
///
/// Units: millimeters
const SIM_CLOSEST_RANGE_MM: f64 = 4.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One snapshot of both range channels, refreshed every cycle.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TofSample {
    /// Range reported by the primary sensor.
    ///
    /// Units: millimeters
    pub primary_mm: f64,

    /// Range reported by the secondary sensor.
    ///
    /// Units: millimeters
    pub secondary_mm: f64,
}

/// A stand-in sample source which drifts a piece in and out of the intake.
pub struct SimTofClient {
    clock: Stopwatch,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Source of time-of-flight samples.
pub trait TofClient {
    /// Take a fresh snapshot of both range channels.
    fn sample(&mut self) -> TofSample;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimTofClient {
    /// Create a new simulated client.
    ///
    /// Sample period and region of interest mirror the hardware driver's
    /// configuration interface; the simulation only logs them.
    pub fn new(sample_period_ms: u32, roi: [u8; 4]) -> Self {
        debug!(
            "Simulated ToF pair: sample period {} ms, ROI {:?}",
            sample_period_ms, roi
        );

        Self {
            clock: Stopwatch::start(),
        }
    }
}

impl TofClient for SimTofClient {
    fn sample(&mut self) -> TofSample {
        // 0 at the start of the period (piece fully out), 1 at the midpoint
        // (piece fully in)
        let phase = (self.clock.elapsed_s() % SIM_DRIFT_PERIOD_S) / SIM_DRIFT_PERIOD_S;
        let depth = 1.0 - (2.0 * phase - 1.0).abs();

        let range_mm = SIM_EMPTY_RANGE_MM + depth * (SIM_CLOSEST_RANGE_MM - SIM_EMPTY_RANGE_MM);

        TofSample {
            primary_mm: range_mm,
            secondary_mm: range_mm,
        }
    }
}
