//! Latest-measurement state file.
//!
//! A single JSON document holding the last stored measurement. Overwritten
//! at the end of every run and read at the start of the next run to build
//! the baseline. An absent file is the normal first-run case; an unreadable
//! or malformed file is an error the caller must deal with before running.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;

use crate::baseline::Baseline;
use crate::measurement::Measurement;
use crate::sink::{MeasurementSink, SinkError};

/// Error loading the state file.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed reading state file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed parsing state file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// File-backed store for the single latest measurement.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the last stored measurement; `None` when the file does not exist.
    pub fn load(&self) -> Result<Option<Measurement>, StateError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&self.path).map_err(|source| StateError::Read {
            path: self.path.clone(),
            source,
        })?;
        let measurement = serde_json::from_str(&data).map_err(|source| StateError::Parse {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(measurement))
    }

    /// Baseline for the next run: the previous values, or empty on first run.
    pub fn load_baseline(&self) -> Result<Baseline, StateError> {
        match self.load()? {
            Some(measurement) => {
                info!(
                    "loaded baseline of {} readings from {}",
                    measurement.len(),
                    self.path.display()
                );
                Ok(Baseline::from_measurement(&measurement))
            }
            None => {
                info!(
                    "no state file at {}, starting with an empty baseline",
                    self.path.display()
                );
                Ok(Baseline::empty())
            }
        }
    }
}

impl MeasurementSink for StateFile {
    fn store(&mut self, measurement: &Measurement) -> Result<(), SinkError> {
        let json = serde_json::to_string_pretty(measurement)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
