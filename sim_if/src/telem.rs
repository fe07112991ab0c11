//! # Telemetry module
//!
//! This module provides the inbound telemetry contract. The simulator reports
//! its state once per event as a JSON object carrying the cross-track error,
//! the current speed and the current steering angle. Some simulator builds
//! send the numeric fields as JSON strings rather than numbers, so both forms
//! are accepted here.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use serde_json::{self, Value};
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single telemetry sample from the simulator.
///
/// Samples are immutable once decoded, and must be processed in arrival
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Cross-track error: signed lateral distance between the vehicle and the
    /// target path.
    pub cte: f64,

    /// Vehicle speed.
    pub speed: f64,

    /// Current steering angle reported by the simulator.
    pub steering_angle: f64
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An event recieved from the simulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    /// A telemetry report which shall trigger one control loop step.
    Telemetry(TelemetrySample),

    /// The message carried no usable payload. The controller responds to
    /// these with a manual-driving command.
    NoPayload
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TelemParseError {
    #[error("Event contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Event has an invalid type ({0})")]
    InvalidType(String),

    #[error("Expected field \"{0}\" to be a number")]
    NonNumericField(&'static str)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimEvent {

    /// Parse a new simulator event from a JSON packet.
    ///
    /// An empty packet, or one which decodes to JSON `null`, is a valid event
    /// with no payload. A packet with a recognised event type but malformed
    /// fields is an error, and no sample is produced for it.
    pub fn from_json(json_str: &str) -> Result<Self, TelemParseError> {
        // Empty packets are sent by the simulator while under manual control
        if json_str.trim().is_empty() {
            return Ok(SimEvent::NoPayload)
        }

        // Parse the JSON string into a value
        let val: Value = match serde_json::from_str(json_str) {
            Ok(v) => v,
            Err(e) => return Err(TelemParseError::InvalidJson(e))
        };

        if val.is_null() {
            return Ok(SimEvent::NoPayload)
        }

        // Get the type of the event
        match val["event"].as_str() {
            Some("telemetry") => (),
            Some(s) => return Err(TelemParseError::InvalidType(s.into())),
            None => return Ok(SimEvent::NoPayload)
        };

        // Extract the numeric fields
        let sample = TelemetrySample {
            cte: field_as_f64(&val, "cte")?,
            speed: field_as_f64(&val, "speed")?,
            steering_angle: field_as_f64(&val, "steering_angle")?
        };

        Ok(SimEvent::Telemetry(sample))
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Extract a named field as an `f64`, accepting both JSON numbers and
/// stringified numbers.
fn field_as_f64(val: &Value, field: &'static str) -> Result<f64, TelemParseError> {
    match &val[field] {
        Value::Number(n) => match n.as_f64() {
            Some(f) => Ok(f),
            None => Err(TelemParseError::NonNumericField(field))
        },
        Value::String(s) => match s.parse::<f64>() {
            Ok(f) => Ok(f),
            Err(_) => Err(TelemParseError::NonNumericField(field))
        },
        _ => Err(TelemParseError::NonNumericField(field))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_telemetry() {
        let event = SimEvent::from_json(
            r#"{"event": "telemetry", "cte": 0.5, "speed": 10.0, "steering_angle": 0.0}"#
        ).unwrap();

        assert_eq!(event, SimEvent::Telemetry(TelemetrySample {
            cte: 0.5,
            speed: 10.0,
            steering_angle: 0.0
        }));
    }

    #[test]
    fn test_parse_stringified_numbers() {
        // Some simulator builds send numbers as strings
        let event = SimEvent::from_json(
            r#"{"event": "telemetry", "cte": "0.7598", "speed": "4.4", "steering_angle": "-0.2"}"#
        ).unwrap();

        match event {
            SimEvent::Telemetry(s) => {
                assert!((s.cte - 0.7598).abs() < 1e-12);
                assert!((s.speed - 4.4).abs() < 1e-12);
                assert!((s.steering_angle + 0.2).abs() < 1e-12);
            },
            _ => panic!("Expected a telemetry event")
        }
    }

    #[test]
    fn test_parse_no_payload() {
        assert_eq!(SimEvent::from_json("").unwrap(), SimEvent::NoPayload);
        assert_eq!(SimEvent::from_json("null").unwrap(), SimEvent::NoPayload);
        assert_eq!(
            SimEvent::from_json(r#"{"something": "else"}"#).unwrap(),
            SimEvent::NoPayload
        );
    }

    #[test]
    fn test_parse_errors() {
        // Missing field
        assert!(SimEvent::from_json(
            r#"{"event": "telemetry", "cte": 0.5, "speed": 10.0}"#
        ).is_err());

        // Non-numeric field
        assert!(SimEvent::from_json(
            r#"{"event": "telemetry", "cte": "oops", "speed": 10.0, "steering_angle": 0.0}"#
        ).is_err());

        // Unknown event type
        assert!(SimEvent::from_json(r#"{"event": "unknown"}"#).is_err());

        // Broken JSON
        assert!(SimEvent::from_json("{not json").is_err());
    }
}
