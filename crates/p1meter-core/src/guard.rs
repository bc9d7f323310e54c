//! Plausibility guard for cumulative energy counters.
//!
//! The meter occasionally emits a single corrupted telegram with a wildly
//! inflated cumulative counter. Capping the increase since the last persisted
//! value stops that corruption from propagating downstream, while first-time
//! readings (no baseline entry) always pass.

use crate::baseline::Baseline;
use crate::measurement::MeterReading;

/// Unit whose readings are subject to the jump check. Cumulative energy
/// counters are the only quantity in this protocol that corrupts upward.
pub const GUARDED_UNIT: &str = "Wh";

/// Default maximum plausible single-run increase: 10 kWh, expressed in Wh.
pub const DEFAULT_MAX_INCREASE: f64 = 10_000.0;

/// Outcome of a plausibility check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// The reading is plausible, or exempt from the check.
    Accepted,
    /// The increase over the baseline exceeds the cap.
    Rejected { delta: f64 },
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Rejects implausible jumps in cumulative counters.
#[derive(Debug, Clone)]
pub struct AnomalyGuard {
    max_increase: f64,
}

impl Default for AnomalyGuard {
    fn default() -> Self {
        Self {
            max_increase: DEFAULT_MAX_INCREASE,
        }
    }
}

impl AnomalyGuard {
    /// Guard with a custom increase cap, in the guarded unit.
    pub fn with_max_increase(max_increase: f64) -> Self {
        Self { max_increase }
    }

    /// The configured increase cap.
    pub fn max_increase(&self) -> f64 {
        self.max_increase
    }

    /// Check one extracted reading against the baseline.
    ///
    /// Applies only to [`GUARDED_UNIT`] readings whose name has a baseline
    /// entry. A delta strictly greater than the cap is rejected; a delta
    /// equal to the cap passes. Decreases always pass: only upward
    /// corruption is filtered.
    pub fn check(&self, reading: &MeterReading, baseline: &Baseline) -> Verdict {
        if reading.unit != GUARDED_UNIT {
            return Verdict::Accepted;
        }
        let Some(previous) = baseline.get(&reading.name) else {
            return Verdict::Accepted;
        };
        let delta = reading.value - previous;
        if delta > self.max_increase {
            Verdict::Rejected { delta }
        } else {
            Verdict::Accepted
        }
    }
}
