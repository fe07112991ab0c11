//! # Simulator command module
//!
//! Commands sent back to the simulator. Exactly one `Steer` command is
//! produced per telemetry event during active driving; `Reset` commands are
//! issued by the gain tuner before each perturbed trial; `Manual` is the
//! response to an event with no usable payload.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A command that can be issued to the simulator.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum SimCmd {
    /// Drive command carrying the steering and throttle demands.
    Steer {
        /// The steering demand, always within [-1, 1].
        steering_angle: f64,

        /// The throttle demand, non-negative.
        throttle: f64
    },

    /// Restore the vehicle to its canonical initial state.
    ///
    /// Issued before each perturbed tuning trial so that trial error metrics
    /// are compared from identical starting conditions.
    Reset,

    /// Hand control back to manual driving.
    Manual
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl SimCmd {
    /// Serialise the command to its JSON wire form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_steer_to_json() {
        let cmd = SimCmd::Steer {
            steering_angle: -0.25,
            throttle: 0.3
        };

        let json = cmd.to_json().unwrap();

        assert_eq!(
            json,
            r#"{"event":"steer","steering_angle":-0.25,"throttle":0.3}"#
        );
    }

    #[test]
    fn test_reset_and_manual_to_json() {
        assert_eq!(SimCmd::Reset.to_json().unwrap(), r#"{"event":"reset"}"#);
        assert_eq!(SimCmd::Manual.to_json().unwrap(), r#"{"event":"manual"}"#);
    }
}
