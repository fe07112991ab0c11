//! # Steering controller
//!
//! This module provides the PID controller used by the control loop,
//! including its error bookkeeping and the trial error metric used by the
//! gain tuner.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::{Params, ThrottlePolicy};
use util::maths::poly_val;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller acting on the cross-track error.
///
/// The controller is sample-based rather than time-aware: the simulator
/// delivers telemetry at a fixed cadence, so the integral and derivative
/// terms accumulate and difference per sample.
#[derive(Debug, Serialize, Clone, Default)]
pub struct SteerController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Derivative gain
    k_d: f64,

    /// Proportional error, the last cross-track error seen
    p_error: f64,

    /// Derivative error, the difference between the last two cross-track
    /// errors
    d_error: f64,

    /// Integral error, the running sum of all cross-track errors seen
    i_error: f64,

    /// Running sum of squared proportional errors. Non-decreasing once
    /// samples are observed.
    sum_sq_error: f64,

    /// Total distance travelled, the running sum of speed samples.
    ///
    /// Deliberately not cleared by `init` - it spans the whole tuning run so
    /// that trial errors are normalised on a common scale.
    total_distance: f64
}

/// The output of one controller step.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RunOutput {
    /// Steering demand, always within [-1, 1]
    pub steer: f64,

    /// Throttle demand, non-negative
    pub throttle: f64,

    /// The cumulative trial error after this sample, or `None` if it is not
    /// yet comparable (distance normalisation enabled but no distance
    /// accumulated yet).
    pub current_error: Option<f64>
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SteerController {

    /// Create a new controller with the given gains.
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self {
            k_p, k_i, k_d,
            ..Default::default()
        }
    }

    /// Reinitialise the controller with new gains.
    ///
    /// All error terms are zeroed so that the next trial is scored from a
    /// fresh state. Always succeeds.
    pub fn init(&mut self, k_p: f64, k_i: f64, k_d: f64) {
        self.k_p = k_p;
        self.k_i = k_i;
        self.k_d = k_d;

        self.p_error = 0.0;
        self.d_error = 0.0;
        self.i_error = 0.0;
        self.sum_sq_error = 0.0;
    }

    /// Update the error terms for a new cross-track error sample.
    ///
    /// The derivative must be computed from the previous proportional error
    /// before it is overwritten. This update is unconditional for every
    /// sample, including repeated and all-zero errors.
    pub fn update_error(&mut self, cte: f64) {
        self.d_error = cte - self.p_error;
        self.p_error = cte;
        self.i_error += cte;
    }

    /// Accumulate the squared proportional error and return the new total.
    ///
    /// This is a cumulative objective across the whole trial, not an
    /// instantaneous metric - earlier squared errors remain in the sum.
    pub fn total_error(&mut self) -> f64 {
        self.sum_sq_error += self.p_error * self.p_error;
        self.sum_sq_error
    }

    /// Run one controller step for the given sample.
    ///
    /// Updates the error terms, computes the saturated steering demand and
    /// the throttle demand for the configured policy, and scores the trial so
    /// far.
    pub fn run(&mut self, cte: f64, speed: f64, params: &Params) -> RunOutput {
        self.update_error(cte);

        // Steering demand opposes the error terms, saturated to [-1, 1]
        let steer = (-(self.k_p * self.p_error
            + self.k_i * self.i_error
            + self.k_d * self.d_error))
            .clamp(-1.0, 1.0);

        // Throttle demand is never negative
        let throttle = match params.throttle_policy {
            ThrottlePolicy::Constant => {
                if speed < params.const_throttle_speed_limit {
                    params.const_throttle
                }
                else {
                    0.0
                }
            },
            ThrottlePolicy::Quadratic => {
                poly_val(&steer, &params.quad_throttle_coeffs).max(0.0)
            }
        };

        // Count the distance travelled
        self.total_distance += speed;

        // Score the trial. Before any distance has been accumulated the
        // normalised error is undefined, so it is reported as not yet
        // comparable rather than dividing by zero.
        let total = self.total_error();
        let current_error = if params.normalise_error_by_distance {
            if self.total_distance > 0.0 {
                Some(total / self.total_distance)
            }
            else {
                None
            }
        }
        else {
            Some(total)
        };

        RunOutput {
            steer,
            throttle,
            current_error
        }
    }

    /// Get the current gains as `(k_p, k_i, k_d)`.
    pub fn gains(&self) -> (f64, f64, f64) {
        (self.k_p, self.k_i, self.k_d)
    }

    /// Get the current error terms as `(p_error, i_error, d_error)`.
    pub fn errors(&self) -> (f64, f64, f64) {
        (self.p_error, self.i_error, self.d_error)
    }

    /// Get the accumulated sum of squared proportional errors.
    pub fn sum_sq_error(&self) -> f64 {
        self.sum_sq_error
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
