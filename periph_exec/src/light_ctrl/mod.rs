//! # Lightstrip control module
//!
//! Resolves concurrent, prioritised status-signal requests into a single
//! colour rendered on the indicator strip each cycle. Requests are held in
//! three fixed layers (default, persistent override, timed transient
//! override) plus an orthogonal idle flag which hands the strip over to the
//! driver's built-in ambient animation. Priority is
//! idle > transient > persistent > default.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod layer;
mod params;
mod state;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use layer::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during LightCtrl cyclic processing.
#[derive(Debug, thiserror::Error)]
pub enum LightCtrlError {
    #[error("The default layer has no LED state set")]
    NoDefaultState,

    #[error("No LED driver has been given to the module, has init been called?")]
    NoDriver,
}

/// Possible errors that can occur during LightCtrl initialisation.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Failed to load parameters: {0}")]
    ParamLoadError(util::params::LoadError),
}
