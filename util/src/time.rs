//! General time utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::Instant;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A monotonic, resettable elapsed-time clock.
///
/// The clock free-runs from the moment of construction or last reset. `wind`
/// advances the elapsed time without waiting, which allows timing behaviour
/// to be exercised deterministically.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    epoch: Instant,
    skew_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Stopwatch {
    /// Start a new stopwatch at zero elapsed time.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            skew_s: 0.0,
        }
    }

    /// Reset the elapsed time to zero.
    pub fn reset(&mut self) {
        self.epoch = Instant::now();
        self.skew_s = 0.0;
    }

    /// Number of seconds elapsed since the last reset.
    pub fn elapsed_s(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() + self.skew_s
    }

    /// Advance the elapsed time by `seconds` without waiting.
    pub fn wind(&mut self, seconds: f64) {
        self.skew_s += seconds;
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::start()
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_stopwatch_wind_and_reset() {
        let mut sw = Stopwatch::start();
        assert!(sw.elapsed_s() < 0.5);

        sw.wind(10.0);
        assert!(sw.elapsed_s() >= 10.0);

        sw.reset();
        assert!(sw.elapsed_s() < 0.5);
    }

    #[test]
    fn test_duration_to_seconds() {
        let d = chrono::Duration::milliseconds(1500);
        assert_eq!(duration_to_seconds(d), Some(1.5));
    }
}
