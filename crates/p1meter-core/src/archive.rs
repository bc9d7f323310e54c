//! Append-only measurement archive.
//!
//! One JSON document per line, one line per run. This is the analytical
//! sink: rows are never rewritten, and downstream tooling reads the file as
//! a table keyed by `inserted_at`.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::measurement::Measurement;
use crate::sink::{MeasurementSink, SinkError};

/// Appends measurements to a newline-delimited JSON file.
#[derive(Debug, Clone)]
pub struct JsonlArchive {
    path: PathBuf,
}

impl JsonlArchive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MeasurementSink for JsonlArchive {
    fn store(&mut self, measurement: &Measurement) -> Result<(), SinkError> {
        let row = serde_json::to_string(measurement)?;
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{row}")?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::MeterReading;

    fn measurement_with(name: &str, value: f64) -> Measurement {
        let mut m = Measurement::started_now();
        m.readings.push(MeterReading {
            name: name.to_string(),
            value,
            unit: "Wh".to_string(),
        });
        m
    }

    #[test]
    fn test_appends_one_row_per_store() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("measurements.jsonl");
        let mut archive = JsonlArchive::new(&path);

        archive.store(&measurement_with("total", 1.0)).unwrap();
        archive.store(&measurement_with("total", 2.0)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let rows: Vec<&str> = content.lines().collect();
        assert_eq!(rows.len(), 2);

        let first: Measurement = serde_json::from_str(rows[0]).unwrap();
        let second: Measurement = serde_json::from_str(rows[1]).unwrap();
        assert_eq!(first.readings[0].value, 1.0);
        assert_eq!(second.readings[0].value, 2.0);
    }

    #[test]
    fn test_store_fails_on_unwritable_path() {
        let mut archive = JsonlArchive::new("/nonexistent/dir/measurements.jsonl");
        assert!(matches!(
            archive.store(&measurement_with("total", 1.0)).unwrap_err(),
            SinkError::Io(_)
        ));
    }
}
