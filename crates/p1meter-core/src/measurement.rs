//! Measurement snapshot types persisted at the end of a run.
//!
//! One [`Measurement`] is produced per run: the ordered list of accepted
//! readings plus a timestamp captured when the run started. The same JSON
//! shape is appended to the archive and overwritten into the state file,
//! where the next run reads it back as its baseline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single accepted reading: one named physical quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterReading {
    /// Unique identifier for the quantity (e.g. `"electricity.consumed.total"`).
    pub name: String,
    /// Scaled numeric value.
    #[serde(rename = "reading")]
    pub value: f64,
    /// Unit string (e.g. `"Wh"`). Selects the unit-specific anomaly policy.
    pub unit: String,
}

/// The bounded measurement snapshot produced by one run.
///
/// Grows while the run is collecting and is immutable once the run ends.
/// Holds at most one reading per distinct name, in acceptance order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    pub readings: Vec<MeterReading>,
    pub inserted_at: DateTime<Utc>,
}

impl Measurement {
    /// Create an empty measurement stamped with the current time.
    pub fn started_now() -> Self {
        Self {
            readings: Vec::new(),
            inserted_at: Utc::now(),
        }
    }

    /// Number of recorded readings.
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Look up a recorded reading by name.
    pub fn get(&self, name: &str) -> Option<&MeterReading> {
        self.readings.iter().find(|r| r.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(name: &str, value: f64) -> MeterReading {
        MeterReading {
            name: name.to_string(),
            value,
            unit: "Wh".to_string(),
        }
    }

    #[test]
    fn test_started_now_is_empty() {
        let m = Measurement::started_now();
        assert!(m.is_empty());
        assert_eq!(m.len(), 0);
    }

    #[test]
    fn test_get_by_name() {
        let mut m = Measurement::started_now();
        m.readings.push(reading("electricity.consumed.total", 12.5));
        m.readings.push(reading("gas.consumed.total", 3.0));

        assert_eq!(m.get("gas.consumed.total").unwrap().value, 3.0);
        assert!(m.get("water.consumed.total").is_none());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let mut m = Measurement::started_now();
        m.readings.push(reading("electricity.consumed.total", 4242.0));

        let json = serde_json::to_string_pretty(&m).unwrap();
        let parsed: Measurement = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.readings, m.readings);
        assert_eq!(parsed.inserted_at, m.inserted_at);
    }

    #[test]
    fn test_value_serializes_as_reading() {
        let json = serde_json::to_string(&reading("total", 7.0)).unwrap();
        assert!(json.contains("\"reading\":7.0"));
        assert!(!json.contains("\"value\""));
    }
}
