//! Implementations for the TofEst state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use serde::Serialize;

// Internal
use super::{IndependentFusion, InitError, PairedFusion, Params, SensorFusion, TofEstError};
use crate::tof_client::TofSample;
use util::{
    archive::{Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Time-of-flight estimation module state
pub struct TofEst {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,
    arch_output: Archiver,

    /// Fusion strategy for the secondary sensor, fixed at init.
    fusion: Box<dyn SensorFusion>,

    /// The sample most recently handed to `proc`. All queries are pure over
    /// this snapshot.
    sample: TofSample,

    output: OutputData,
}

/// Output data: every derived signal for this cycle.
#[derive(Clone, Copy, Serialize, Debug, Default)]
pub struct OutputData {
    /// Estimated cone width.
    ///
    /// Units: millimeters
    pub cone_width_mm: f64,

    /// Cone offset from the centred baseline.
    ///
    /// Units: millimeters, signed, zero when centred
    pub cone_offset_mm: f64,

    /// Cube offset from the centred baseline.
    ///
    /// Units: millimeters, signed, zero when centred or unavailable
    pub cube_offset_mm: f64,

    /// True if a cone is inside the intake
    pub cone_held: bool,

    /// True if a cube is inside the intake
    pub cube_held: bool,
}

/// Status report for TofEst processing.
#[derive(Clone, Copy, Serialize, Debug, Default)]
pub struct StatusReport {
    /// Raised when the primary reading is negative or not finite. The
    /// reading is still used as-is.
    pub primary_implausible: bool,

    /// Raised when the secondary reading is negative or not finite. The
    /// reading is still used as-is.
    pub secondary_implausible: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for TofEst {
    fn default() -> Self {
        Self {
            params: Params::default(),
            report: StatusReport::default(),
            arch_output: Archiver::default(),
            fusion: Box::new(PairedFusion),
            sample: TofSample::default(),
            output: OutputData::default(),
        }
    }
}

impl State for TofEst {
    type InitData = &'static str;
    type InitError = InitError;

    type InputData = TofSample;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = TofEstError;

    /// Initialise the TofEst module.
    ///
    /// Expected init data is the path to the parameter file.
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        // Load the parameters
        self.params = params::load(init_data).map_err(InitError::ParamLoadError)?;

        // Select the fusion strategy, fixed from here on
        self.fusion = if self.params.paired_secondary {
            Box::new(PairedFusion)
        } else {
            Box::new(IndependentFusion)
        };

        // Initialise the archiver
        self.arch_output = Archiver::from_path(session, "tof_est/output.csv").unwrap();

        Ok(())
    }

    /// Perform cyclic processing of time-of-flight estimation.
    ///
    /// Takes this cycle's sample snapshot and recomputes every derived
    /// signal from scratch, nothing is cached between cycles.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        self.report = StatusReport::default();
        self.sample = *input_data;

        self.report.primary_implausible = !is_plausible(self.sample.primary_mm);
        self.report.secondary_implausible = !is_plausible(self.sample.secondary_mm);

        if self.report.primary_implausible || self.report.secondary_implausible {
            // Readings are used as-is, downstream alignment logic owns
            // plausibility handling
            warn!(
                "Implausible ToF reading(s): primary {} mm, secondary {} mm",
                self.sample.primary_mm, self.sample.secondary_mm
            );
        }

        self.output = OutputData {
            cone_width_mm: self.cone_width_mm(),
            cone_offset_mm: self.cone_offset_mm(),
            cube_offset_mm: self.cube_offset_mm(),
            cone_held: self.is_cone_held(),
            cube_held: self.is_cube_held(),
        };

        Ok((self.output, self.report))
    }
}

impl Archived for TofEst {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.arch_output.serialise(self.output)
    }
}

impl TofEst {
    /// Estimated width of a held cone.
    ///
    /// Units: millimeters
    pub fn cone_width_mm(&self) -> f64 {
        self.fusion.cone_width_mm(&self.sample, &self.params)
    }

    /// Lateral offset of a held cone's centre from the centred baseline.
    /// Zero means perfectly centred.
    ///
    /// Units: millimeters, signed
    pub fn cone_offset_mm(&self) -> f64 {
        ((self.cone_width_mm() / 2.0) + self.sample.primary_mm) - self.params.halfway_mm.cone
    }

    /// Lateral offset of a held cube, or `0.0` when no independent cube
    /// signal exists (see `is_cube_tof_active`).
    ///
    /// Units: millimeters, signed
    pub fn cube_offset_mm(&self) -> f64 {
        self.fusion.cube_offset_mm(&self.sample, &self.params)
    }

    /// True if a cone is inside the intake, i.e. the primary reading is
    /// strictly below the cone threshold.
    pub fn is_cone_held(&self) -> bool {
        self.sample.primary_mm < self.params.full_mm.cone
    }

    /// True if a cube is inside the intake, i.e. the secondary reading is
    /// strictly below the cube threshold. Evaluated independently of the
    /// fusion mode.
    pub fn is_cube_held(&self) -> bool {
        self.sample.secondary_mm < self.params.full_mm.cube
    }

    /// True if `cube_offset_mm` carries real information, i.e. the secondary
    /// sensor is an independent cube detector.
    pub fn is_cube_tof_active(&self) -> bool {
        self.fusion.cube_tof_active()
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// A reading is plausible if it is finite and non-negative.
fn is_plausible(range_mm: f64) -> bool {
    range_mm.is_finite() && range_mm >= 0.0
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::tof_est::PieceRefs;

    fn test_params() -> Params {
        Params {
            paired_secondary: true,
            width_mm: PieceRefs {
                cone: 5.0,
                cube: 10.0,
            },
            full_mm: PieceRefs {
                cone: 5.0,
                cube: 30.0,
            },
            halfway_mm: PieceRefs {
                cone: 15.0,
                cube: 15.0,
            },
        }
    }

    fn paired_est(sample: TofSample) -> TofEst {
        let mut est = TofEst::default();
        est.params = test_params();
        est.sample = sample;
        est
    }

    fn independent_est(sample: TofSample) -> TofEst {
        let mut est = paired_est(sample);
        est.params.paired_secondary = false;
        est.fusion = Box::new(IndependentFusion);
        est
    }

    #[test]
    fn test_paired_cone_width() {
        // 2h - (p + s)
        let est = paired_est(TofSample {
            primary_mm: 6.0,
            secondary_mm: 6.0,
        });
        assert_eq!(est.cone_width_mm(), 18.0);

        // Centred zero-width piece: both sensors read the baseline
        let est = paired_est(TofSample {
            primary_mm: 15.0,
            secondary_mm: 15.0,
        });
        assert_eq!(est.cone_width_mm(), 0.0);
        assert_eq!(est.cone_offset_mm(), 0.0);
    }

    #[test]
    fn test_independent_cone_width_is_nominal() {
        let est = independent_est(TofSample {
            primary_mm: 6.0,
            secondary_mm: 6.0,
        });
        assert_eq!(est.cone_width_mm(), 5.0);
    }

    #[test]
    fn test_cone_offset() {
        // w = 2*15 - 12 = 18, offset = (9 + 6) - 15 = 0
        let est = paired_est(TofSample {
            primary_mm: 6.0,
            secondary_mm: 6.0,
        });
        assert_eq!(est.cone_offset_mm(), 0.0);

        // Piece shifted away from the primary sensor
        let est = paired_est(TofSample {
            primary_mm: 8.0,
            secondary_mm: 4.0,
        });
        // w = 18, offset = (9 + 8) - 15 = 2
        assert_eq!(est.cone_offset_mm(), 2.0);
    }

    #[test]
    fn test_held_thresholds_are_strict() {
        let est = paired_est(TofSample {
            primary_mm: 4.99,
            secondary_mm: 29.99,
        });
        assert!(est.is_cone_held());
        assert!(est.is_cube_held());

        // A reading exactly at the threshold means not held
        let est = paired_est(TofSample {
            primary_mm: 5.0,
            secondary_mm: 30.0,
        });
        assert!(!est.is_cone_held());
        assert!(!est.is_cube_held());
    }

    #[test]
    fn test_width_validity_does_not_imply_presence() {
        // Both sensors read 6 mm: width and offset are valid but the 5 mm
        // cone threshold is not crossed
        let est = paired_est(TofSample {
            primary_mm: 6.0,
            secondary_mm: 6.0,
        });
        assert_eq!(est.cone_width_mm(), 18.0);
        assert_eq!(est.cone_offset_mm(), 0.0);
        assert!(!est.is_cone_held());
    }

    #[test]
    fn test_cube_offset_paired_is_zero() {
        let est = paired_est(TofSample {
            primary_mm: 6.0,
            secondary_mm: 2.0,
        });
        assert_eq!(est.cube_offset_mm(), 0.0);
        assert!(!est.is_cube_tof_active());
    }

    #[test]
    fn test_cube_offset_uses_cone_halfway() {
        let mut est = independent_est(TofSample {
            primary_mm: 6.0,
            secondary_mm: 8.0,
        });
        // The cube halfway reference must not influence the result
        est.params.halfway_mm.cube = 99.0;

        // (10/2 + 8) - 15 = -2, baselined on the cone halfway reference
        assert_eq!(est.cube_offset_mm(), -2.0);
        assert!(est.is_cube_tof_active());
    }

    #[test]
    fn test_proc_flags_implausible_readings() {
        let mut est = paired_est(TofSample::default());

        let (out, report) = est
            .proc(&TofSample {
                primary_mm: -3.0,
                secondary_mm: 6.0,
            })
            .unwrap();

        assert!(report.primary_implausible);
        assert!(!report.secondary_implausible);
        // The reading is still used literally
        assert_eq!(out.cone_width_mm, 2.0 * 15.0 - (-3.0 + 6.0));
    }
}
