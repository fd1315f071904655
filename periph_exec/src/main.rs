//! Main peripheral-subsystems executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Time-of-flight sample acquisition
//!         - Time-of-flight estimation processing
//!         - Intake request wiring (stand-in for the operator bindings)
//!         - Lightstrip control processing
//!         - Archiving and telemetry
//!
//! # Modules
//!
//! All modules (e.g. `light_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State`
//!        trait.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{info, trace, warn};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use periph_lib::{
    data_store::DataStore,
    led_driver::SimLedDriver,
    light_ctrl::{self, TimedLedState},
    params::PeriphExecParams,
    tof_client::{SimTofClient, TofClient},
};
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle. The robot scheduler runs at 50 Hz.
const CYCLE_PERIOD_S: f64 = 0.02;

/// Number of cycles per second
const CYCLE_FREQUENCY_HZ: f64 = 1.0 / CYCLE_PERIOD_S;

/// Number of consecutive cycle overruns before the warning is escalated to
/// an error log.
const MAX_CONSEC_CYCLE_OVERRUNS: u64 = 5;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("periph_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution
    info!("Peripheral Subsystems Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: PeriphExecParams =
        util::params::load("periph_exec.toml").wrap_err("Could not load exec params")?;

    // Revalidate the transient preset so a bad duration in the file cannot
    // slip through
    let success_signal = TimedLedState::new(
        exec_params.success_signal.state,
        exec_params.success_signal.duration_s,
    )
    .wrap_err("Invalid success_signal parameter")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE MODULES ----

    let mut ds = DataStore::default();

    ds.light_ctrl
        .init(("light_ctrl.toml", Box::new(SimLedDriver::new())), &session)
        .wrap_err("Failed to initialise LightCtrl")?;
    info!("LightCtrl initialised");

    ds.tof_est
        .init("tof_est.toml", &session)
        .wrap_err("Failed to initialise TofEst")?;
    info!("TofEst initialised");

    let mut tof_client: Box<dyn TofClient> = Box::new(SimTofClient::new(
        exec_params.tof_sample_period_ms,
        exec_params.tof_roi,
    ));

    info!("Begin cyclic processing at {} Hz", CYCLE_FREQUENCY_HZ);

    // ---- MAIN LOOP ----

    loop {
        let cycle_start_instant = Instant::now();

        ds.num_cycles += 1;
        ds.is_1_hz_cycle = ds.num_cycles % (CYCLE_FREQUENCY_HZ as u128) == 1;

        // ---- SENSING ----

        let sample = tof_client.sample();

        let (tof_output, tof_rpt) = ds
            .tof_est
            .proc(&sample)
            .wrap_err("TofEst processing failed")?;
        ds.tof_est_output = tof_output;
        ds.tof_est_status_rpt = tof_rpt;

        // ---- INTAKE REQUEST WIRING ----
        //
        // Stand-in for the operator/intake bindings: a held piece raises a
        // persistent request in its colour, and acquiring one fires the
        // success signal.

        if tof_output.cone_held && !ds.cone_was_held {
            ds.light_ctrl.set_transient(success_signal);
        }
        if tof_output.cone_held {
            ds.light_ctrl.set_persistent(exec_params.cone_intake);
        } else {
            ds.light_ctrl
                .clear_persistent_if_matches(&exec_params.cone_intake);
        }
        ds.cone_was_held = tof_output.cone_held;

        if ds.tof_est.is_cube_tof_active() {
            if tof_output.cube_held && !ds.cube_was_held {
                ds.light_ctrl.set_transient(success_signal);
            }
            if tof_output.cube_held {
                ds.light_ctrl.set_persistent(exec_params.cube_intake);
            } else {
                ds.light_ctrl
                    .clear_persistent_if_matches(&exec_params.cube_intake);
            }
            ds.cube_was_held = tof_output.cube_held;
        }

        // ---- LIGHTSTRIP ----

        let (light_output, light_rpt) = ds
            .light_ctrl
            .proc(&light_ctrl::InputData::default())
            .wrap_err("LightCtrl processing failed")?;
        ds.light_ctrl_output = light_output;
        ds.light_ctrl_status_rpt = light_rpt;

        // ---- ARCHIVING & TELEMETRY ----

        if let Err(e) = ds.light_ctrl.write() {
            warn!("Could not archive LightCtrl state: {}", e);
        }
        if let Err(e) = ds.tof_est.write() {
            warn!("Could not archive TofEst state: {}", e);
        }

        if ds.is_1_hz_cycle {
            trace!("ToF: {:?}, lightstrip: {:?}", tof_output, light_rpt);

            if let Err(e) = session.save("tm/tof_est.json", &tof_output) {
                warn!("Could not save ToF telemetry: {}", e);
            }
            if let Err(e) = session.save("tm/light_ctrl.json", &light_rpt) {
                warn!("Could not save lightstrip telemetry: {}", e);
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        if cycle_dur.as_secs_f64() < CYCLE_PERIOD_S {
            ds.num_consec_cycle_overruns = 0;
            thread::sleep(Duration::from_secs_f64(CYCLE_PERIOD_S) - cycle_dur);
        } else {
            ds.num_consec_cycle_overruns += 1;
            warn!(
                "Cycle overran by {:.06} s ({} consecutive)",
                cycle_dur.as_secs_f64() - CYCLE_PERIOD_S,
                ds.num_consec_cycle_overruns
            );

            if ds.num_consec_cycle_overruns > MAX_CONSEC_CYCLE_OVERRUNS {
                log::error!("Persistent cycle overruns, the target cycle rate cannot be met");
            }
        }
    }
}
