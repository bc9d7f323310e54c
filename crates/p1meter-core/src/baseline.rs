//! Last accepted value per reading name, carried across runs.

use std::collections::HashMap;

use crate::measurement::Measurement;

/// Mapping from reading name to the last persisted scaled value.
///
/// Loaded once per run and read-only while collecting. An absent entry means
/// "no history" and must never be treated as an anomaly.
#[derive(Debug, Clone, Default)]
pub struct Baseline {
    values: HashMap<String, f64>,
}

impl Baseline {
    /// Baseline with no history, the first-run case.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a baseline from a previous run's measurement.
    pub fn from_measurement(measurement: &Measurement) -> Self {
        let values = measurement
            .readings
            .iter()
            .map(|r| (r.name.clone(), r.value))
            .collect();
        Self { values }
    }

    /// Last known value for `name`, if any.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Insert or replace a single entry.
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
