//! Implementations for the CtrlLoop state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace};
use serde::Serialize;

// Internal
use super::{CtrlLoopError, Params, SteerController, TwiddlePhase, TwiddleTuner, NUM_GAINS};
use sim_if::{SimCmd, TelemetrySample};
use util::{module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Control loop module state.
///
/// Owns the steering controller and the gain tuner exclusively. All state is
/// mutated only by `proc`, once per telemetry sample, on a single thread.
#[derive(Default)]
pub struct CtrlLoop {
    params: Params,

    /// The PID steering controller
    controller: SteerController,

    /// The twiddle tuning session
    tuner: TwiddleTuner,

    report: StatusReport
}

/// The status report containing monitoring quantities for the last processed
/// sample.
#[derive(Clone, Copy, Serialize, Debug)]
pub struct StatusReport {
    /// True if the tuner was active for this sample
    pub tuning_active: bool,

    /// The tuning phase executed for this sample
    pub phase: TwiddlePhase,

    /// Number of completed tuning cycles
    pub iteration: u32,

    /// The gain cursor after this sample
    pub param_index: usize,

    /// The gain vector after this sample
    pub gains: [f64; NUM_GAINS],

    /// Sum of the perturbation magnitudes
    pub sum_deltas: f64,

    /// Best trial error seen so far
    pub best_error: f64,

    /// Trial error after this sample, if comparable
    pub current_error: Option<f64>,

    /// The steering demand issued
    pub steer: f64,

    /// The throttle demand issued
    pub throttle: f64
}

impl Default for StatusReport {
    fn default() -> Self {
        Self {
            tuning_active: false,
            phase: TwiddlePhase::Baseline,
            iteration: 0,
            param_index: 0,
            gains: [0.0; NUM_GAINS],
            sum_deltas: 0.0,
            best_error: f64::INFINITY,
            current_error: None,
            steer: 0.0,
            throttle: 0.0
        }
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for CtrlLoop {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = TelemetrySample;
    type OutputData = Vec<SimCmd>;
    type StatusReport = StatusReport;
    type ProcError = CtrlLoopError;

    /// Initialise the CtrlLoop module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, _session: &Session)
        -> Result<(), Self::InitError>
    {
        // Load the parameters
        let params = params::load(init_data)?;

        *self = Self::from_params(params);

        Ok(())
    }

    /// Perform cyclic processing of the control loop.
    ///
    /// Exactly one command list is produced per sample: any reset commands
    /// required by the tuner, followed by the steer command.
    fn proc(&mut self, sample: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // Malformed telemetry must not corrupt the accumulated state
        if !sample.cte.is_finite()
            || !sample.speed.is_finite()
            || !sample.steering_angle.is_finite()
        {
            return Err(CtrlLoopError::NonFiniteSample(*sample));
        }

        let mut cmds: Vec<SimCmd> = vec![];

        let tuning_active = self.tuner.active(&self.params);

        let out = if tuning_active {
            let out = self.tuner.step(
                sample, &mut self.controller, &self.params, &mut cmds);

            // If this cycle ended the search, lock the accepted gains into
            // the controller for the rest of the drive
            if !self.tuner.active(&self.params) {
                let gains = self.tuner.gains();
                self.controller.init(gains[0], gains[1], gains[2]);

                info!(
                    "Gain tuning finished after {} iterations: \
                     gains = {:?}, best error = {}",
                    self.tuner.iteration(),
                    gains,
                    self.tuner.best_error()
                );
            }

            out
        }
        else {
            self.controller.run(sample.cte, sample.speed, &self.params)
        };

        cmds.push(SimCmd::Steer {
            steering_angle: out.steer,
            throttle: out.throttle
        });

        self.report = StatusReport {
            tuning_active,
            phase: self.tuner.phase(),
            iteration: self.tuner.iteration(),
            param_index: self.tuner.param_index(),
            gains: self.tuner.gains(),
            sum_deltas: self.tuner.sum_deltas(),
            best_error: self.tuner.best_error(),
            current_error: out.current_error,
            steer: out.steer,
            throttle: out.throttle
        };

        trace!("CtrlLoop output:\n    steer: {}\n    throttle: {}",
            out.steer,
            out.throttle);

        Ok((cmds, self.report))
    }
}

impl CtrlLoop {

    /// Build the module directly from a parameter set.
    ///
    /// Useful for embedding the loop without a parameter file on disk.
    pub fn from_params(params: Params) -> Self {
        Self {
            controller: SteerController::new(params.k_p, params.k_i, params.k_d),
            tuner: TwiddleTuner::new(&params),
            report: StatusReport::default(),
            params
        }
    }

    /// Get the status report for the last processed sample.
    pub fn report(&self) -> &StatusReport {
        &self.report
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
