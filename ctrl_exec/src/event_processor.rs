//! # Simulator event processor module
//!
//! The event processor handles decoded simulator events from any source and
//! turns them into outgoing commands. It is the single entry point between
//! the transport (whatever that may be) and the control loop: one decoded
//! event in, zero or more commands out.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;

// Internal
use crate::ctrl_loop::CtrlLoop;
use sim_if::{SimCmd, SimEvent};
use util::module::State;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Process one simulator event.
///
/// Telemetry events trigger exactly one control loop step. Events with no
/// usable payload are answered with a manual-driving command. A rejected
/// sample is logged and produces no commands - per-message conditions are
/// never fatal to the process.
pub fn process(ctrl_loop: &mut CtrlLoop, event: &SimEvent) -> Vec<SimCmd> {

    match event {
        SimEvent::Telemetry(sample) => match ctrl_loop.proc(sample) {
            Ok((cmds, _report)) => cmds,
            Err(e) => {
                warn!("Telemetry sample rejected: {}", e);
                vec![]
            }
        },
        SimEvent::NoPayload => vec![SimCmd::Manual]
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::ctrl_loop::{Params, ThrottlePolicy};
    use sim_if::TelemetrySample;

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

    #[test]
    fn test_telemetry_produces_steer() {
        let mut ctrl_loop = CtrlLoop::from_params(test_params());

        let cmds = process(&mut ctrl_loop, &SimEvent::Telemetry(
            TelemetrySample {
                cte: 0.5,
                speed: 10.0,
                steering_angle: 0.0
            }
        ));

        assert!(matches!(cmds[cmds.len() - 1], SimCmd::Steer { .. }));
    }

    #[test]
    fn test_no_payload_produces_manual() {
        let mut ctrl_loop = CtrlLoop::from_params(test_params());

        let cmds = process(&mut ctrl_loop, &SimEvent::NoPayload);

        assert_eq!(cmds, vec![SimCmd::Manual]);
    }

    #[test]
    fn test_rejected_sample_produces_nothing() {
        let mut ctrl_loop = CtrlLoop::from_params(test_params());

        let cmds = process(&mut ctrl_loop, &SimEvent::Telemetry(
            TelemetrySample {
                cte: f64::NAN,
                speed: 10.0,
                steering_angle: 0.0
            }
        ));

        assert!(cmds.is_empty());
    }
}
