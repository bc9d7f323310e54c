//! Where finished measurements go.
//!
//! The surrounding process stores each run's measurement twice: appended to
//! the archive for downstream analysis, and overwritten into the state file
//! so the next run can load it as its baseline. Both destinations implement
//! [`MeasurementSink`].

use thiserror::Error;

use crate::measurement::Measurement;

/// Error writing a measurement to a sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed encoding measurement: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A destination for one run's finished measurement.
pub trait MeasurementSink {
    fn store(&mut self, measurement: &Measurement) -> Result<(), SinkError>;
}
