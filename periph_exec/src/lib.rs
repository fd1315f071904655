//! # Peripheral subsystems library.
//!
//! This library allows other crates in the workspace, and the executable
//! itself, to access items defined inside the peripheral executive crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Lightstrip control module - resolves prioritised status-signal requests into LED output
pub mod light_ctrl;

/// Time-of-flight estimation module - infers game piece width, offset and presence
pub mod tof_est;

/// Lightstrip driver boundary - the physical LED strip behind a narrow trait
pub mod led_driver;

/// Time-of-flight client - provides per-cycle range sample snapshots
pub mod tof_client;

/// Global data store for the executable
pub mod data_store;

/// Executable-level parameters - request presets and sensor driver configuration
pub mod params;
