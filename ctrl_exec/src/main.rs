//! Main control executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session and logger
//!     - Initialise the control loop module
//!     - Load the telemetry script
//!     - Main loop, once per telemetry sample:
//!         - Event processing (control loop step)
//!         - Command output
//!
//! The executable drives the control loop from a recorded telemetry trace.
//! The live simulator transport is an external collaborator - it exchanges
//! exactly the messages defined in `sim_if` and nothing else, so the control
//! behaviour here is the same as it would be against the live connection.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use ctrl_lib::{
    ctrl_loop::CtrlLoop,
    event_processor,
    telem_script::TelemScript
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{Report, eyre::{WrapErr, eyre}};
use log::{debug, info, warn};
use std::env;

// Internal
use sim_if::SimEvent;
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "ctrl_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Helm Control Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD TELEMETRY SCRIPT ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    // A single argument is expected, the path of the telemetry trace to play
    let script = match args.len() {
        2 => TelemScript::new(&args[1])
            .wrap_err("Failed to load the telemetry script")?,
        _ => return Err(eyre!(
            "Expected exactly one argument (the telemetry script path), \
             found {}", args.len() - 1))
    };

    info!(
        "Loaded telemetry script \"{}\" containing {} samples\n",
        &args[1],
        script.num_samples()
    );

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut ctrl_loop = CtrlLoop::default();
    ctrl_loop.init("ctrl_loop.toml", &session)
        .wrap_err("Failed to initialise CtrlLoop")?;
    info!("CtrlLoop init complete");

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    for sample in script.samples() {

        // ---- EVENT PROCESSING ----

        let cmds = event_processor::process(
            &mut ctrl_loop,
            &SimEvent::Telemetry(*sample)
        );

        // ---- COMMAND OUTPUT ----

        // With a live transport these would be sent over the wire; during
        // playback they are logged instead.
        for cmd in cmds.iter() {
            match cmd.to_json() {
                Ok(json) => debug!("{}", json),
                Err(e) => warn!("Could not serialise command: {}", e)
            }
        }

        let report = ctrl_loop.report();

        if report.tuning_active {
            info!(
                "Tuning iteration {}: best error = {}",
                report.iteration,
                report.best_error
            );
        }
    }

    // ---- SHUTDOWN ----

    let report = ctrl_loop.report();
    info!("End of telemetry script");
    info!("    Final gains: {:?}", report.gains);
    info!("    Best error: {}", report.best_error);
    info!("    Tuning iterations completed: {}", report.iteration);

    info!("End of execution");

    Ok(())
}
