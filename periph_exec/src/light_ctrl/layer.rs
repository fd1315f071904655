//! Layer values for lightstrip control
//!
//! A layer is one prioritised source of a displayed colour. Each layer owns
//! its content and its own elapsed-time clock; the clock can only be reset
//! by replacing the content, so blink phase is stable across unrelated layer
//! activity.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Internal
use util::time::Stopwatch;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A requested colour and display effect.
///
/// Channel values cover the full `u8` range, so an out-of-range channel is
/// unrepresentable rather than rejected at run time.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LedState {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub effect: LedEffect,
}

/// A requested colour with a lifespan, for the transient layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimedLedState {
    #[serde(flatten)]
    pub state: LedState,

    /// How long the state is displayed before it expires.
    ///
    /// Units: seconds, strictly positive
    pub duration_s: f64,
}

/// One prioritised source of a displayed colour, with an independent clock.
#[derive(Debug, Clone)]
pub struct Layer<T> {
    content: Option<T>,
    clock: Stopwatch,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Display effect applied to a colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedEffect {
    /// Permanently on
    Solid,
    /// 1 s on / 1 s off square wave
    Blink,
    /// 0.25 s on / 0.25 s off square wave
    FastBlink,
}

/// Errors raised when constructing layer values.
#[derive(Debug, Error)]
pub enum LedStateError {
    #[error("Transient LED state duration must be strictly positive, got {0} s")]
    NonPositiveDuration(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LedState {
    pub fn new(red: u8, green: u8, blue: u8, effect: LedEffect) -> Self {
        Self {
            red,
            green,
            blue,
            effect,
        }
    }

    /// True if `other` requests the same colour, ignoring the effect.
    ///
    /// This is the sameness check used by set/clear toggling between
    /// competing callers.
    pub fn same_colour(&self, other: &LedState) -> bool {
        self.red == other.red && self.green == other.green && self.blue == other.blue
    }
}

impl TimedLedState {
    /// Create a new timed state.
    ///
    /// A non-positive duration is rejected here, never clamped.
    pub fn new(state: LedState, duration_s: f64) -> Result<Self, LedStateError> {
        if duration_s <= 0.0 {
            return Err(LedStateError::NonPositiveDuration(duration_s));
        }

        Ok(Self { state, duration_s })
    }
}

impl Default for LedEffect {
    fn default() -> Self {
        LedEffect::Solid
    }
}

impl<T> Layer<T> {
    /// Create an empty layer with a freshly started clock.
    pub fn empty() -> Self {
        Self {
            content: None,
            clock: Stopwatch::start(),
        }
    }

    /// Create a layer holding `content`, with the clock started now.
    pub fn with(content: T) -> Self {
        Self {
            content: Some(content),
            clock: Stopwatch::start(),
        }
    }

    /// Replace the layer's content and reset its clock.
    ///
    /// This is the only path which resets the clock.
    pub fn replace(&mut self, content: T) {
        self.content = Some(content);
        self.clock.reset();
    }

    /// Clear the layer's content. The clock is left alone, an empty layer is
    /// never rendered.
    pub fn clear(&mut self) {
        self.content = None;
    }

    pub fn content(&self) -> Option<&T> {
        self.content.as_ref()
    }

    pub fn is_set(&self) -> bool {
        self.content.is_some()
    }

    /// Seconds since the layer's content last changed.
    pub fn elapsed_s(&self) -> f64 {
        self.clock.elapsed_s()
    }

    /// Wind the layer's clock forward, as if `seconds` had passed.
    #[cfg(test)]
    pub(crate) fn wind_clock(&mut self, seconds: f64) {
        self.clock.wind(seconds);
    }
}

impl<T> Default for Layer<T> {
    fn default() -> Self {
        Self::empty()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_replace_resets_clock() {
        let mut layer = Layer::empty();
        layer.wind_clock(5.0);
        assert!(layer.elapsed_s() >= 5.0);

        layer.replace(LedState::new(1, 2, 3, LedEffect::Solid));
        assert!(layer.is_set());
        assert!(layer.elapsed_s() < 0.5);

        layer.clear();
        assert!(!layer.is_set());
    }

    #[test]
    fn test_same_colour_ignores_effect() {
        let a = LedState::new(255, 200, 0, LedEffect::Solid);
        let b = LedState::new(255, 200, 0, LedEffect::Blink);
        let c = LedState::new(255, 0, 0, LedEffect::Solid);

        assert!(a.same_colour(&b));
        assert!(!a.same_colour(&c));
    }

    #[test]
    fn test_timed_state_rejects_non_positive_duration() {
        let state = LedState::new(0, 255, 0, LedEffect::Solid);

        assert!(TimedLedState::new(state, 2.0).is_ok());
        assert!(TimedLedState::new(state, 0.0).is_err());
        assert!(TimedLedState::new(state, -1.0).is_err());
    }
}
