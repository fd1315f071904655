//! Parameters structure for LightCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::LedState;
use crate::led_driver::StripConfig;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for lightstrip control.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    /// Static configuration applied to the strip driver at initialisation.
    pub strip: StripConfig,

    /// The state shown when no override is active.
    ///
    /// The default layer always holds this state, it is never empty.
    pub default_state: LedState,
}
