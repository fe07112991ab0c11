//! Control loop parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the control loop
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Params {

    /// Initial proportional gain
    pub k_p: f64,

    /// Initial integral gain
    pub k_i: f64,

    /// Initial derivative gain
    pub k_d: f64,

    /// Initial perturbation magnitude for the proportional gain
    pub delta_k_p: f64,

    /// Initial perturbation magnitude for the integral gain
    pub delta_k_i: f64,

    /// Initial perturbation magnitude for the derivative gain
    pub delta_k_d: f64,

    /// If false the tuner is bypassed entirely and the controller runs with
    /// the initial gains.
    pub tuning_enabled: bool,

    /// Number of tuning iterations after which the gains are frozen.
    pub max_iterations: u32,

    /// Perturbation sum threshold. Once the sum of the perturbation
    /// magnitudes falls to or below this value the search has converged and
    /// the gains are frozen.
    pub epsilon: f64,

    /// Which throttle policy to use.
    pub throttle_policy: ThrottlePolicy,

    /// Throttle demand issued below the speed limit under the constant
    /// policy.
    pub const_throttle: f64,

    /// Speed above which the constant policy issues zero throttle.
    pub const_throttle_speed_limit: f64,

    /// Coefficients of the steer-to-throttle polynomial used by the
    /// quadratic policy.
    ///
    /// The order of these coefficients is highest power first, i.e if there
    /// are 3 coefficients it's a 2nd order polynomial with c[0]*x^2 + c[1]*x
    /// + c[2].
    pub quad_throttle_coeffs: Vec<f64>,

    /// If true trial errors are normalised by the total distance travelled
    /// (the running sum of speed samples), so that longer trials are not
    /// penalised simply for accumulating more squared error.
    pub normalise_error_by_distance: bool
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The throttle policies available to the controller.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThrottlePolicy {
    /// Constant throttle below a speed limit, zero above it.
    Constant,

    /// Throttle mapped from the steering demand through a polynomial, so
    /// that hard turns are taken slowly.
    Quadratic
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ThrottlePolicy {
    fn default() -> Self {
        ThrottlePolicy::Constant
    }
}
