//! Implementations for the LightCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};
use serde::Serialize;

// Internal
use super::{InitError, Layer, LedEffect, LedState, LightCtrlError, Params, TimedLedState};
use crate::led_driver::LedDriver;
use util::{
    archive::{Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Lightstrip control module state
#[derive(Default)]
pub struct LightCtrl {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    /// The strip driver, handed over at init.
    driver: Option<Box<dyn LedDriver>>,

    /// Lowest priority layer, always set once initialised.
    pub(crate) default_layer: Layer<LedState>,

    /// Persistent override layer, survives until replaced or explicitly
    /// cleared.
    pub(crate) persistent_layer: Layer<LedState>,

    /// Transient override layer, self-expires once its elapsed time exceeds
    /// its duration.
    pub(crate) transient_layer: Layer<TimedLedState>,

    /// When set the strip plays the driver's ambient animation and no layer
    /// is rendered.
    idle: bool,
}

/// Input data to lightstrip control.
///
/// Requests arrive through the module's own methods rather than cyclic
/// input, so there is nothing to pass in.
#[derive(Default)]
pub struct InputData {}

/// Output command for the strip driver this cycle.
#[derive(Clone, Copy, Serialize, Debug, Default)]
pub struct OutputData {
    /// The colour rendered this cycle, or `None` while idle.
    pub rgb: Option<(u8, u8, u8)>,
}

/// Status report for LightCtrl processing.
#[derive(Clone, Copy, Serialize, Debug, Default)]
pub struct StatusReport {
    /// Which source produced the rendered output this cycle.
    pub source: RenderSource,

    /// Seconds remaining before the transient layer expires, if one is set.
    pub transient_remaining_s: Option<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The source that produced the rendered output on a cycle.
#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq)]
pub enum RenderSource {
    /// Ambient animation, owned by the driver
    Idle,
    /// The transient override layer
    Transient,
    /// The persistent override layer
    Persistent,
    /// The default layer
    Default,
}

impl Default for RenderSource {
    fn default() -> Self {
        RenderSource::Default
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for LightCtrl {
    type InitData = (&'static str, Box<dyn LedDriver>);
    type InitError = InitError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = LightCtrlError;

    /// Initialise the LightCtrl module.
    ///
    /// Expected init data is the parameter file path and the strip driver.
    fn init(
        &mut self,
        (params_path, mut driver): Self::InitData,
        session: &Session,
    ) -> Result<(), Self::InitError> {
        // Load the parameters
        self.params = params::load(params_path).map_err(InitError::ParamLoadError)?;

        // Configure the strip and take ownership of the driver
        driver.configure(&self.params.strip);
        self.driver = Some(driver);

        // The default layer is never empty from this point on
        self.default_layer = Layer::with(self.params.default_state);

        // Initialise the archiver
        self.arch_report = Archiver::from_path(session, "light_ctrl/status_report.csv").unwrap();

        Ok(())
    }

    /// Perform cyclic processing of lightstrip control.
    ///
    /// Resolves the active layer by priority (idle > transient > persistent
    /// > default), renders its effect and pushes the result to the strip
    /// driver.
    fn proc(
        &mut self,
        _input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        self.report = StatusReport::default();

        // While idle the driver owns the strip, no layer is touched.
        if self.idle {
            self.report.source = RenderSource::Idle;
            return Ok((OutputData { rgb: None }, self.report));
        }

        // Expire the transient layer before resolution, so that the layer
        // below it is rendered on the same cycle the transient runs out.
        let transient_expired = match self.transient_layer.content() {
            Some(timed) => self.transient_layer.elapsed_s() >= timed.duration_s,
            None => false,
        };
        if transient_expired {
            self.transient_layer.clear();
        }

        // Priority-ordered view of the layers, highest first. The first set
        // layer wins.
        let resolved = [
            (
                self.transient_layer.content().map(|t| t.state),
                self.transient_layer.elapsed_s(),
                RenderSource::Transient,
            ),
            (
                self.persistent_layer.content().copied(),
                self.persistent_layer.elapsed_s(),
                RenderSource::Persistent,
            ),
            (
                self.default_layer.content().copied(),
                self.default_layer.elapsed_s(),
                RenderSource::Default,
            ),
        ]
        .iter()
        .find_map(|&(state, elapsed_s, source)| state.map(|s| (s, elapsed_s, source)));

        let (state, elapsed_s, source) = match resolved {
            Some(r) => r,
            // The default layer can only be empty before init
            None => return Err(LightCtrlError::NoDefaultState),
        };

        let rgb = rendered_rgb(&state, elapsed_s);

        match self.driver {
            Some(ref mut d) => d.render_solid(rgb.0, rgb.1, rgb.2),
            None => return Err(LightCtrlError::NoDriver),
        }

        self.report.source = source;
        self.report.transient_remaining_s = self
            .transient_layer
            .content()
            .map(|t| t.duration_s - self.transient_layer.elapsed_s());

        trace!("LightCtrl output: {:?} from {:?}", rgb, source);

        Ok((OutputData { rgb: Some(rgb) }, self.report))
    }
}

impl Archived for LightCtrl {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.arch_report.serialise(self.report)
    }
}

impl LightCtrl {
    /// Set or clear the idle flag.
    ///
    /// On the rising edge the driver is commanded to start its ambient
    /// animation, exactly once. The driver owns the animation's timing from
    /// then on.
    pub fn set_idle(&mut self, active: bool) {
        let rising = active && !self.idle;
        self.idle = active;

        if rising {
            debug!("LightCtrl idle: strip handed over to ambient animation");
            if let Some(ref mut d) = self.driver {
                d.start_ambient_animation();
            }
        }
    }

    /// True if the idle flag is set.
    pub fn is_idle(&self) -> bool {
        self.idle
    }

    /// Request a persistent override state.
    ///
    /// If the layer is empty or holds a different colour the request
    /// replaces it and restarts its clock. Requesting the colour already
    /// held is a no-op, so repeated requests do not disturb the blink phase.
    pub fn set_persistent(&mut self, state: LedState) {
        let same = match self.persistent_layer.content() {
            Some(current) => current.same_colour(&state),
            None => false,
        };

        if !same {
            self.persistent_layer.replace(state);
        }
    }

    /// Clear the persistent layer, but only if it currently holds `state`'s
    /// colour.
    ///
    /// Callers clear only their own request. A non-matching clear is a
    /// routine no-op rather than an error, since competing callers are
    /// expected.
    pub fn clear_persistent_if_matches(&mut self, state: &LedState) {
        let matches = match self.persistent_layer.content() {
            Some(current) => current.same_colour(state),
            None => false,
        };

        if matches {
            self.persistent_layer.clear();
        }
    }

    /// Request a transient override state.
    ///
    /// A new request always wins: any prior transient content is replaced
    /// and the lifespan clock restarts.
    pub fn set_transient(&mut self, state: TimedLedState) {
        self.transient_layer.replace(state);
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Resolve the colour displayed for `state` at `t_s` seconds after its layer
/// last changed.
///
/// Blink is a 1 s on / 1 s off square wave, fast blink 0.25 s on / 0.25 s
/// off, both starting in the on phase.
fn rendered_rgb(state: &LedState, t_s: f64) -> (u8, u8, u8) {
    let on = (state.red, state.green, state.blue);

    match state.effect {
        LedEffect::Solid => on,
        LedEffect::Blink => {
            if t_s % 2.0 < 1.0 {
                on
            } else {
                (0, 0, 0)
            }
        }
        LedEffect::FastBlink => {
            if t_s % 0.5 < 0.25 {
                on
            } else {
                (0, 0, 0)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::led_driver::StripConfig;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Driver stand-in that records every call.
    #[derive(Default)]
    struct RecordingDriver {
        rendered: Rc<RefCell<Vec<(u8, u8, u8)>>>,
        ambient_starts: Rc<RefCell<u32>>,
    }

    impl LedDriver for RecordingDriver {
        fn configure(&mut self, _config: &StripConfig) {}

        fn render_solid(&mut self, red: u8, green: u8, blue: u8) {
            self.rendered.borrow_mut().push((red, green, blue));
        }

        fn start_ambient_animation(&mut self) {
            *self.ambient_starts.borrow_mut() += 1;
        }
    }

    /// A LightCtrl wired to a recording driver, with a red solid default.
    fn test_ctrl() -> (
        LightCtrl,
        Rc<RefCell<Vec<(u8, u8, u8)>>>,
        Rc<RefCell<u32>>,
    ) {
        let rendered = Rc::new(RefCell::new(Vec::new()));
        let ambient_starts = Rc::new(RefCell::new(0));

        let driver = RecordingDriver {
            rendered: rendered.clone(),
            ambient_starts: ambient_starts.clone(),
        };

        let mut ctrl = LightCtrl::default();
        ctrl.driver = Some(Box::new(driver));
        ctrl.default_layer = Layer::with(LedState::new(255, 0, 0, LedEffect::Solid));

        (ctrl, rendered, ambient_starts)
    }

    #[test]
    fn test_solid_always_on() {
        let state = LedState::new(10, 20, 30, LedEffect::Solid);

        assert_eq!(rendered_rgb(&state, 0.0), (10, 20, 30));
        assert_eq!(rendered_rgb(&state, 1.5), (10, 20, 30));
        assert_eq!(rendered_rgb(&state, 100.0), (10, 20, 30));
    }

    #[test]
    fn test_blink_timing() {
        let state = LedState::new(10, 20, 30, LedEffect::Blink);
        let on = (10, 20, 30);
        let off = (0, 0, 0);

        assert_eq!(rendered_rgb(&state, 0.0), on);
        assert_eq!(rendered_rgb(&state, 0.99), on);
        assert_eq!(rendered_rgb(&state, 1.0), off);
        assert_eq!(rendered_rgb(&state, 1.99), off);
        assert_eq!(rendered_rgb(&state, 2.0), on);
    }

    #[test]
    fn test_fast_blink_timing() {
        let state = LedState::new(10, 20, 30, LedEffect::FastBlink);
        let on = (10, 20, 30);
        let off = (0, 0, 0);

        assert_eq!(rendered_rgb(&state, 0.0), on);
        assert_eq!(rendered_rgb(&state, 0.24), on);
        assert_eq!(rendered_rgb(&state, 0.25), off);
        assert_eq!(rendered_rgb(&state, 0.49), off);
        assert_eq!(rendered_rgb(&state, 0.5), on);
    }

    #[test]
    fn test_set_persistent_same_colour_keeps_clock() {
        let (mut ctrl, _, _) = test_ctrl();
        let yellow = LedState::new(255, 200, 0, LedEffect::Solid);

        ctrl.set_persistent(yellow);
        ctrl.persistent_layer.wind_clock(5.0);

        // Same colour again: the clock must not reset
        ctrl.set_persistent(yellow);
        assert!(ctrl.persistent_layer.elapsed_s() >= 5.0);

        // A different colour resets the clock
        let purple = LedState::new(195, 0, 255, LedEffect::Solid);
        ctrl.set_persistent(purple);
        assert!(ctrl.persistent_layer.elapsed_s() < 0.5);
    }

    #[test]
    fn test_clear_persistent_only_when_matching() {
        let (mut ctrl, _, _) = test_ctrl();
        let yellow = LedState::new(255, 200, 0, LedEffect::Solid);
        let purple = LedState::new(195, 0, 255, LedEffect::Solid);

        ctrl.set_persistent(yellow);

        // Non-matching colour: no-op
        ctrl.clear_persistent_if_matches(&purple);
        assert!(ctrl.persistent_layer.is_set());

        // Same colour with a different effect still matches, effects are
        // excluded from the sameness check
        let yellow_blink = LedState::new(255, 200, 0, LedEffect::Blink);
        ctrl.clear_persistent_if_matches(&yellow_blink);
        assert!(!ctrl.persistent_layer.is_set());

        // Clearing an empty layer is also a no-op
        ctrl.clear_persistent_if_matches(&yellow);
        assert!(!ctrl.persistent_layer.is_set());
    }

    #[test]
    fn test_priority_resolution() {
        let (mut ctrl, rendered, _) = test_ctrl();

        // Nothing requested: the default renders
        let (out, rpt) = ctrl.proc(&InputData::default()).unwrap();
        assert_eq!(out.rgb, Some((255, 0, 0)));
        assert_eq!(rpt.source, RenderSource::Default);

        // Persistent overrides default
        ctrl.set_persistent(LedState::new(195, 0, 255, LedEffect::Solid));
        let (out, rpt) = ctrl.proc(&InputData::default()).unwrap();
        assert_eq!(out.rgb, Some((195, 0, 255)));
        assert_eq!(rpt.source, RenderSource::Persistent);

        // Transient overrides persistent
        let success =
            TimedLedState::new(LedState::new(0, 255, 0, LedEffect::Solid), 2.0).unwrap();
        ctrl.set_transient(success);
        let (out, rpt) = ctrl.proc(&InputData::default()).unwrap();
        assert_eq!(out.rgb, Some((0, 255, 0)));
        assert_eq!(rpt.source, RenderSource::Transient);

        assert_eq!(
            *rendered.borrow(),
            vec![(255, 0, 0), (195, 0, 255), (0, 255, 0)]
        );
    }

    #[test]
    fn test_transient_expiry_falls_through_same_cycle() {
        let (mut ctrl, _, _) = test_ctrl();
        let purple = LedState::new(195, 0, 255, LedEffect::Solid);
        ctrl.set_persistent(purple);

        let success =
            TimedLedState::new(LedState::new(0, 255, 0, LedEffect::Solid), 2.0).unwrap();
        ctrl.set_transient(success);

        // Run the transient past its lifespan: the persistent layer must be
        // rendered on the very cycle the transient expires, not skipped
        ctrl.transient_layer.wind_clock(2.5);
        let (out, rpt) = ctrl.proc(&InputData::default()).unwrap();
        assert_eq!(out.rgb, Some((195, 0, 255)));
        assert_eq!(rpt.source, RenderSource::Persistent);

        // Expired means cleared, never resurrected
        assert!(!ctrl.transient_layer.is_set());
        let (_, rpt) = ctrl.proc(&InputData::default()).unwrap();
        assert_eq!(rpt.source, RenderSource::Persistent);
    }

    #[test]
    fn test_idle_overrides_everything() {
        let (mut ctrl, rendered, ambient_starts) = test_ctrl();
        ctrl.set_persistent(LedState::new(195, 0, 255, LedEffect::Solid));

        // Rising edge starts the ambient animation exactly once
        ctrl.set_idle(true);
        assert!(ctrl.is_idle());
        assert_eq!(*ambient_starts.borrow(), 1);
        ctrl.set_idle(true);
        assert_eq!(*ambient_starts.borrow(), 1);

        // While idle no layer is rendered
        let (out, rpt) = ctrl.proc(&InputData::default()).unwrap();
        assert_eq!(out.rgb, None);
        assert_eq!(rpt.source, RenderSource::Idle);
        assert!(rendered.borrow().is_empty());

        // Dropping out of idle resumes layer rendering
        ctrl.set_idle(false);
        let (out, _) = ctrl.proc(&InputData::default()).unwrap();
        assert_eq!(out.rgb, Some((195, 0, 255)));

        // A second rising edge fires the animation again
        ctrl.set_idle(true);
        assert_eq!(*ambient_starts.borrow(), 2);
    }

    #[test]
    fn test_transient_replacement_restarts_lifespan() {
        let (mut ctrl, _, _) = test_ctrl();

        let first =
            TimedLedState::new(LedState::new(0, 255, 0, LedEffect::Solid), 2.0).unwrap();
        ctrl.set_transient(first);
        ctrl.transient_layer.wind_clock(1.9);

        // A new request always wins and restarts the clock
        let second =
            TimedLedState::new(LedState::new(0, 0, 255, LedEffect::Solid), 2.0).unwrap();
        ctrl.set_transient(second);

        let (out, rpt) = ctrl.proc(&InputData::default()).unwrap();
        assert_eq!(out.rgb, Some((0, 0, 255)));
        assert_eq!(rpt.source, RenderSource::Transient);
        assert!(rpt.transient_remaining_s.unwrap() > 1.5);
    }
}
