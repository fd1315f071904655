//! # Lightstrip driver boundary
//!
//! `light_ctrl` talks to the physical LED strip through the narrow
//! `LedDriver` trait: a solid colour render per cycle plus a one-shot
//! handover to the driver's built-in ambient animation. `SimLedDriver`
//! stands in for the hardware and logs what would be displayed.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Static configuration applied to the strip driver at initialisation.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct StripConfig {
    /// Number of addressable LEDs on the strip, including the driver's
    /// onboard LEDs.
    pub led_count: u32,

    /// Brightness scalar applied by the driver.
    ///
    /// Units: dimensionless, in [0, 1]
    pub brightness: f64,
}

/// A stand-in lightstrip driver which logs rendered colours.
#[derive(Default)]
pub struct SimLedDriver {
    last_rgb: Option<(u8, u8, u8)>,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Interface to the physical lightstrip driver.
pub trait LedDriver {
    /// Apply the static strip configuration.
    fn configure(&mut self, config: &StripConfig);

    /// Display a solid colour across the whole strip.
    fn render_solid(&mut self, red: u8, green: u8, blue: u8);

    /// Hand the strip over to the driver's built-in ambient animation.
    ///
    /// The driver owns the animation's timing from this point on, and keeps
    /// playing it until the next `render_solid` call.
    fn start_ambient_animation(&mut self);
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimLedDriver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedDriver for SimLedDriver {
    fn configure(&mut self, config: &StripConfig) {
        info!(
            "Lightstrip configured: {} LEDs, brightness {:.2}",
            config.led_count, config.brightness
        );
    }

    fn render_solid(&mut self, red: u8, green: u8, blue: u8) {
        // Only log changes, not every cycle
        if self.last_rgb != Some((red, green, blue)) {
            trace!("Lightstrip solid colour: ({}, {}, {})", red, green, blue);
            self.last_rgb = Some((red, green, blue));
        }
    }

    fn start_ambient_animation(&mut self) {
        info!("Lightstrip ambient animation started");
        self.last_rgb = None;
    }
}
