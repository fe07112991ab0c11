//! # Control loop module
//!
//! The control loop converts one telemetry sample into the commands to send
//! back to the simulator. It is built from two cooperating parts:
//!
//! - [`SteerController`]: a PID controller acting on the cross-track error,
//!   producing a steering demand saturated to [-1, 1] and a speed-dependent
//!   throttle demand. The controller also accumulates the sum-of-squares
//!   error metric which the tuner uses to score a trial.
//! - [`TwiddleTuner`]: a coordinate-search tuner which perturbs one gain per
//!   telemetry event while tuning is active. Each perturbed trial is preceded
//!   by a simulator reset so that trial errors are compared from identical
//!   starting conditions. Improvements are accepted and the perturbation
//!   grown by 1.1; a failed axis has its perturbation shrunk by 0.9.
//!
//! Processing is strictly sequential: exactly one command list is produced
//! per sample, and samples must be handled in arrival order because both the
//! error metric and the tuning cycle are order-dependent accumulators.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod controller;
mod params;
mod state;
mod tuning;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use controller::*;
pub use params::*;
pub use state::*;
pub use tuning::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of tunable controller gains (proportional, integral,
/// derivative).
pub const NUM_GAINS: usize = 3;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during control loop operation.
#[derive(Debug, thiserror::Error)]
pub enum CtrlLoopError {
    /// A telemetry sample carried a non-finite value. The sample is rejected
    /// without mutating any controller or tuner state.
    #[error("Recieved a telemetry sample with a non-finite value: {0:?}")]
    NonFiniteSample(sim_if::TelemetrySample),
}
