//! # Simulator interface crate.
//!
//! Provides the message contracts between the control executable and the
//! external driving simulator. The simulator's own wire framing and
//! connection lifecycle are not part of this crate, only the decoded
//! messages which cross the boundary.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Inbound telemetry messages from the simulator
pub mod telem;

/// Outbound command messages to the simulator
pub mod cmd;

// ------------------------------------------------------------------------------------------------
// RE-EXPORTS
// ------------------------------------------------------------------------------------------------

pub use cmd::SimCmd;
pub use telem::{SimEvent, TelemParseError, TelemetrySample};
