//! # Control library.
//!
//! This library allows other crates in the workspace (and the tests) to
//! access items defined inside the control executable crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Control loop module - converts telemetry samples into simulator commands,
/// tuning the controller gains online while tuning is active
pub mod ctrl_loop;

/// Event processor - handles decoded simulator events from any source
pub mod event_processor;

/// Telemetry script - plays back a recorded telemetry trace from CSV
pub mod telem_script;
