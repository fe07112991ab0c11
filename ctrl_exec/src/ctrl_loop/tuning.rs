//! # Twiddle gain tuner
//!
//! The tuner performs a local coordinate search over the controller's three
//! gains while the vehicle drives. One gain is perturbed per telemetry event:
//! the perturbation is first tried upwards, then downwards, and each
//! perturbed trial is scored against the best error seen so far. An accepted
//! perturbation is rewarded by growing the step size by 1.1; if neither
//! direction improves, the gain is restored and the step size shrunk by 0.9.
//!
//! Every perturbed trial is preceded by a simulator reset so that trials are
//! compared from identical starting conditions - without the reset the error
//! comparison is meaningless and the search can diverge.
//!
//! The search terminates once the iteration limit is reached or the sum of
//! the step sizes falls below the convergence threshold, after which the
//! controller runs with the last accepted gains.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use serde::Serialize;

// Internal
use super::{Params, RunOutput, SteerController, NUM_GAINS};
use sim_if::{SimCmd, TelemetrySample};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The twiddle tuning session state.
///
/// Mutated only between telemetry events, never concurrently.
#[derive(Debug, Serialize, Clone)]
pub struct TwiddleTuner {
    /// The current gain vector, `[k_p, k_i, k_d]`
    gains: [f64; NUM_GAINS],

    /// The perturbation magnitude for each gain, all non-negative
    deltas: [f64; NUM_GAINS],

    /// Which gain is being perturbed this cycle
    param_index: usize,

    /// Number of completed tuning cycles
    iteration: u32,

    /// The best trial error seen so far
    best_error: f64,

    /// Cached sum of `deltas`, recomputed at the end of each cycle
    sum_deltas: f64,

    /// The last phase executed, for status reporting
    phase: TwiddlePhase
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The phases of one tuning cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TwiddlePhase {
    /// First ever trial, scored with the unperturbed gains. No reset is
    /// issued for the baseline.
    Baseline,

    /// The perturbation was added to the current gain.
    TryIncrease,

    /// The increase failed, the perturbation was subtracted instead.
    TryDecrease,

    /// Neither direction improved; the gain was restored and the
    /// perturbation shrunk.
    Neutral
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for TwiddleTuner {
    fn default() -> Self {
        Self {
            gains: [0.0; NUM_GAINS],
            deltas: [0.0; NUM_GAINS],
            param_index: 0,
            iteration: 0,
            best_error: f64::INFINITY,
            sum_deltas: 0.0,
            phase: TwiddlePhase::Baseline
        }
    }
}

impl TwiddleTuner {

    /// Create a new tuner from the parameters.
    pub fn new(params: &Params) -> Self {
        let deltas = [params.delta_k_p, params.delta_k_i, params.delta_k_d];

        Self {
            gains: [params.k_p, params.k_i, params.k_d],
            deltas,
            sum_deltas: deltas.iter().sum(),
            ..Default::default()
        }
    }

    /// True while the search is still running.
    ///
    /// Once this returns false it never returns true again: the iteration
    /// counter only grows, and the deltas are only modified by `step`, which
    /// the control loop no longer calls.
    pub fn active(&self, params: &Params) -> bool {
        params.tuning_enabled
            && self.iteration < params.max_iterations
            && self.sum_deltas > params.epsilon
    }

    /// Run one tuning cycle for the given telemetry sample.
    ///
    /// Reset commands for any perturbed trials are appended to `cmds` in the
    /// order they must reach the simulator, before the caller's steer
    /// command. Returns the output of the last controller trial of the cycle.
    pub fn step(
        &mut self,
        sample: &TelemetrySample,
        controller: &mut SteerController,
        params: &Params,
        cmds: &mut Vec<SimCmd>
    ) -> RunOutput {

        // The very first event establishes the baseline error with the
        // unperturbed gains. No perturbation and no reset.
        if self.iteration == 0 {
            self.phase = TwiddlePhase::Baseline;

            let out = controller.run(sample.cte, sample.speed, params);

            if let Some(e) = out.current_error {
                self.best_error = e;
            }

            self.advance();
            return out;
        }

        let i = self.param_index;

        // Try the perturbation upwards first
        self.phase = TwiddlePhase::TryIncrease;
        self.gains[i] += self.deltas[i];
        controller.init(self.gains[0], self.gains[1], self.gains[2]);
        cmds.push(SimCmd::Reset);

        let mut out = controller.run(sample.cte, sample.speed, params);

        match out.current_error {
            Some(e) if e < self.best_error => {
                // Improvement: accept and grow the step size
                self.best_error = e;
                self.deltas[i] *= 1.1;
            },
            _ => {
                // Try the perturbation downwards, relative to the
                // pre-increase baseline
                self.phase = TwiddlePhase::TryDecrease;
                self.gains[i] -= 2.0 * self.deltas[i];
                controller.init(self.gains[0], self.gains[1], self.gains[2]);
                cmds.push(SimCmd::Reset);

                out = controller.run(sample.cte, sample.speed, params);

                match out.current_error {
                    Some(e) if e < self.best_error => {
                        self.best_error = e;
                        self.deltas[i] *= 1.1;
                    },
                    _ => {
                        // No improvement along this axis: restore the gain
                        // and shrink the step size
                        self.phase = TwiddlePhase::Neutral;
                        self.gains[i] += self.deltas[i];
                        self.deltas[i] *= 0.9;
                    }
                }
            }
        }

        self.advance();
        out
    }

    /// Move the cursor to the next gain and close out the cycle.
    fn advance(&mut self) {
        self.param_index = (self.param_index + 1) % NUM_GAINS;
        self.sum_deltas = self.deltas.iter().sum();
        self.iteration += 1;

        debug!(
            "Tuning iteration {}: gains = {:?}, deltas = {:?}, best error = {}",
            self.iteration, self.gains, self.deltas, self.best_error
        );
    }

    /// Get the current gain vector.
    pub fn gains(&self) -> [f64; NUM_GAINS] {
        self.gains
    }

    /// Get the number of completed tuning cycles.
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Get the index of the gain to be perturbed next.
    pub fn param_index(&self) -> usize {
        self.param_index
    }

    /// Get the best trial error seen so far.
    pub fn best_error(&self) -> f64 {
        self.best_error
    }

    /// Get the cached sum of perturbation magnitudes.
    pub fn sum_deltas(&self) -> f64 {
        self.sum_deltas
    }

    /// Get the last phase executed.
    pub fn phase(&self) -> TwiddlePhase {
        self.phase
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::ctrl_loop::ThrottlePolicy;

    fn test_params() -> Params {
        Params {
            k_p: 0.1,
            k_i: 0.001,
            k_d: 10.0,
            delta_k_p: 0.1,
            delta_k_i: 0.001,
            delta_k_d: 10.0,
            tuning_enabled: true,
            max_iterations: 100,
            epsilon: 0.0001,
            throttle_policy: ThrottlePolicy::Constant,
            const_throttle: 0.3,
            const_throttle_speed_limit: 25.0,
            quad_throttle_coeffs: vec![-0.45, 0.0, 0.45],
            normalise_error_by_distance: true
        }
    }

    fn sample(cte: f64, speed: f64) -> TelemetrySample {
        TelemetrySample {
            cte,
            speed,
            steering_angle: 0.0
        }
    }

    #[test]
    fn test_baseline_cycle() {
        let params = test_params();
        let mut tuner = TwiddleTuner::new(&params);
        let mut ctrl = SteerController::new(params.k_p, params.k_i, params.k_d);
        let mut cmds = Vec::new();

        let out = tuner.step(&sample(0.5, 10.0), &mut ctrl, &params, &mut cmds);

        // The baseline runs with the unperturbed gains and issues no reset
        assert_eq!(tuner.phase(), TwiddlePhase::Baseline);
        assert!(cmds.is_empty());
        assert_eq!(tuner.gains(), [0.1, 0.001, 10.0]);

        // The baseline error is finite and positive, the cycle advanced
        assert!(tuner.best_error().is_finite());
        assert!(tuner.best_error() > 0.0);
        assert_eq!(tuner.iteration(), 1);
        assert_eq!(tuner.param_index(), 1);

        // A steer demand was still produced for the sample
        assert!(out.steer >= -1.0 && out.steer <= 1.0);
    }

    #[test]
    fn test_improving_increase_accepted() {
        let params = test_params();
        let mut tuner = TwiddleTuner::new(&params);
        let mut ctrl = SteerController::new(params.k_p, params.k_i, params.k_d);
        let mut cmds = Vec::new();

        // Baseline on a large error so that the next trial improves on it
        tuner.step(&sample(5.0, 10.0), &mut ctrl, &params, &mut cmds);
        let best_before = tuner.best_error();
        let i = tuner.param_index();
        assert!(cmds.is_empty());

        // A near-zero error trial beats the baseline
        tuner.step(&sample(0.001, 10.0), &mut ctrl, &params, &mut cmds);

        // Only the increase trial ran, so exactly one reset was issued and
        // the perturbation grew by 1.1
        assert_eq!(tuner.phase(), TwiddlePhase::TryIncrease);
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0], SimCmd::Reset);
        assert!((tuner.deltas[i] - 0.001 * 1.1).abs() < 1e-12);
        assert!(tuner.best_error() < best_before);
    }

    #[test]
    fn test_failing_increase_then_improving_decrease() {
        let params = test_params();
        let mut tuner = TwiddleTuner::new(&params);
        let mut ctrl = SteerController::new(params.k_p, params.k_i, params.k_d);
        let mut cmds = Vec::new();

        // Baseline accumulates 10 units of distance
        tuner.step(&sample(0.5, 10.0), &mut ctrl, &params, &mut cmds);
        let i = tuner.param_index();
        let delta_before = tuner.deltas[i];

        // Both trials of the next cycle run on cte = 2 and re-initialise the
        // controller, so they score 4/20 and 4/30 respectively (the decrease
        // trial sees more accumulated distance). A best error between the
        // two makes the increase fail and the decrease improve.
        tuner.best_error = 0.15;
        tuner.step(&sample(2.0, 10.0), &mut ctrl, &params, &mut cmds);

        // The decrease trial was accepted: two resets were issued and the
        // perturbation still grew by 1.1
        assert_eq!(tuner.phase(), TwiddlePhase::TryDecrease);
        assert_eq!(cmds.len(), 2);
        assert!((tuner.best_error() - 4.0 / 30.0).abs() < 1e-12);
        assert!((tuner.deltas[i] - delta_before * 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_both_trials_failing_restores_gain() {
        let params = test_params();
        let mut tuner = TwiddleTuner::new(&params);
        let mut ctrl = SteerController::new(params.k_p, params.k_i, params.k_d);
        let mut cmds = Vec::new();

        // Baseline
        tuner.step(&sample(0.5, 10.0), &mut ctrl, &params, &mut cmds);
        let i = tuner.param_index();
        let gain_before = tuner.gains()[i];
        let delta_before = tuner.deltas[i];

        // Make the best error unbeatable so both trials fail
        tuner.best_error = 0.0;
        tuner.step(&sample(0.5, 10.0), &mut ctrl, &params, &mut cmds);

        // Both directions were tried (two resets), the gain is restored
        // exactly and the perturbation shrunk by 0.9
        assert_eq!(tuner.phase(), TwiddlePhase::Neutral);
        assert_eq!(cmds.len(), 2);
        assert_eq!(tuner.gains()[i], gain_before);
        assert!((tuner.deltas[i] - delta_before * 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_cursor_wraps_modulo_three() {
        let params = test_params();
        let mut tuner = TwiddleTuner::new(&params);
        let mut ctrl = SteerController::new(params.k_p, params.k_i, params.k_d);
        let mut cmds = Vec::new();

        for n in 0..7 {
            assert_eq!(tuner.param_index(), n % NUM_GAINS);
            tuner.step(&sample(0.5, 10.0), &mut ctrl, &params, &mut cmds);

            // The delta sum cache always matches the vector
            let expected: f64 = tuner.deltas.iter().sum();
            assert_eq!(tuner.sum_deltas(), expected);
        }

        assert_eq!(tuner.iteration(), 7);
    }

    #[test]
    fn test_termination_on_max_iterations() {
        let mut params = test_params();
        params.max_iterations = 3;

        let mut tuner = TwiddleTuner::new(&params);
        let mut ctrl = SteerController::new(params.k_p, params.k_i, params.k_d);
        let mut cmds = Vec::new();

        for _ in 0..3 {
            assert!(tuner.active(&params));
            tuner.step(&sample(0.5, 10.0), &mut ctrl, &params, &mut cmds);
        }

        // Permanently frozen
        assert!(!tuner.active(&params));
    }

    #[test]
    fn test_termination_on_converged_deltas() {
        let mut params = test_params();
        params.delta_k_p = 0.00001;
        params.delta_k_i = 0.00001;
        params.delta_k_d = 0.00001;

        let tuner = TwiddleTuner::new(&params);

        // The delta sum starts below epsilon so the search never runs
        assert!(!tuner.active(&params));
    }

    #[test]
    fn test_disabled_by_config() {
        let mut params = test_params();
        params.tuning_enabled = false;

        let tuner = TwiddleTuner::new(&params);
        assert!(!tuner.active(&params));
    }
}
