//! # Telemetry script module
//!
//! This module provides playback of recorded telemetry traces, allowing the
//! control executable to be driven from a CSV file instead of a live
//! simulator connection. Traces are CSV files with a `cte,speed,
//! steering_angle` header row, one sample per line, in arrival order.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal
use sim_if::TelemetrySample;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A loaded telemetry script.
///
/// After initialising with the path of the trace to play use `.samples()` to
/// iterate the samples in order.
pub struct TelemScript {
    _script_path: PathBuf,
    samples: Vec<TelemetrySample>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(csv::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error("Script contains an invalid sample: {0}")]
    InvalidSample(csv::Error)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TelemScript {

    /// Create a new script from the given trace path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {

        // Get the path in a buffer
        let path = PathBuf::from(script_path.as_ref());

        // Check that the script file exists.
        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(
                path.to_string_lossy().to_string()));
        }

        let reader = match csv::Reader::from_path(&path) {
            Ok(r) => r,
            Err(e) => return Err(ScriptError::ScriptLoadError(e))
        };

        let samples = Self::read_samples(reader)?;

        Ok(TelemScript {
            _script_path: path,
            samples
        })
    }

    /// Create a new script from any reader, for traces not stored on disk.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ScriptError> {
        let samples = Self::read_samples(csv::Reader::from_reader(reader))?;

        Ok(TelemScript {
            _script_path: PathBuf::new(),
            samples
        })
    }

    /// Get the samples of the script in arrival order.
    pub fn samples(&self) -> impl Iterator<Item = &TelemetrySample> {
        self.samples.iter()
    }

    /// Get the number of samples in the script
    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    fn read_samples<R: Read>(
        mut reader: csv::Reader<R>
    ) -> Result<Vec<TelemetrySample>, ScriptError> {

        let mut samples: Vec<TelemetrySample> = vec![];

        for record in reader.deserialize() {
            match record {
                Ok(s) => samples.push(s),
                Err(e) => return Err(ScriptError::InvalidSample(e))
            }
        }

        if samples.is_empty() {
            return Err(ScriptError::ScriptEmpty)
        }

        Ok(samples)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_load_trace() {
        let trace = "\
cte,speed,steering_angle
0.7598,0.0,0.0
0.7202,0.4,-0.05
0.6523,1.1,-0.11
";

        let script = TelemScript::from_reader(trace.as_bytes()).unwrap();

        assert_eq!(script.num_samples(), 3);

        let first = script.samples().next().unwrap();
        assert!((first.cte - 0.7598).abs() < 1e-12);
        assert_eq!(first.speed, 0.0);
    }

    #[test]
    fn test_empty_trace() {
        let trace = "cte,speed,steering_angle\n";

        assert!(matches!(
            TelemScript::from_reader(trace.as_bytes()),
            Err(ScriptError::ScriptEmpty)
        ));
    }

    #[test]
    fn test_invalid_sample() {
        let trace = "\
cte,speed,steering_angle
0.7598,not_a_number,0.0
";

        assert!(matches!(
            TelemScript::from_reader(trace.as_bytes()),
            Err(ScriptError::InvalidSample(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            TelemScript::new("/definitely/not/here.csv"),
            Err(ScriptError::ScriptNotFound(_))
        ));
    }
}
