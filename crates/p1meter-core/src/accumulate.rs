//! The run state machine: lines in, one bounded measurement out.
//!
//! An [`Accumulator`] owns everything mutable in a run: the measurement under
//! construction, the set of names already recorded, and the counters for the
//! end-of-run report. Per line it delegates to the catalog, the extractor,
//! and the anomaly guard; every per-line failure is absorbed and logged.
//! Only the run outcome surfaces:
//!
//! - `Satisfied`: every catalog reading was collected,
//! - `Partial`: the source ended, failed, or hit the line ceiling first.
//!
//! Either way the accumulated measurement is the artifact handed onward;
//! callers decide whether a partial run is acceptable.

use std::collections::HashSet;

use log::{debug, info, warn};

use crate::baseline::Baseline;
use crate::catalog::ReadingCatalog;
use crate::extract::{self, ExtractError};
use crate::guard::{AnomalyGuard, Verdict};
use crate::measurement::Measurement;
use crate::source::TelegramSource;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every catalog reading was collected.
    Satisfied,
    /// The line source ended, failed, or hit the ceiling first.
    Partial,
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Satisfied => write!(f, "satisfied"),
            Self::Partial => write!(f, "partial"),
        }
    }
}

/// What happened to one line offered to the accumulator.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// The line matched a definition and its reading was recorded.
    Recorded { name: String },
    /// No definition matched. Lines belonging to other telegram objects are
    /// expected and ignored.
    NoMatch,
    /// The matching line could not be extracted.
    ExtractFailed { name: String, error: ExtractError },
    /// The guard rejected the extracted value as an implausible jump.
    RejectedJump { name: String, delta: f64 },
    /// A reading with this name was already recorded; the first value wins.
    Duplicate { name: String },
}

/// Per-run counters reported alongside the measurement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Lines pulled from the source.
    pub lines_read: u64,
    pub no_match: u64,
    pub extract_failures: u64,
    pub rejected_jumps: u64,
    pub duplicates: u64,
    pub recorded: u64,
}

/// Bounds on how long a run may keep pulling lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunLimits {
    /// Stop after this many lines even if readings are missing. Guarantees
    /// termination against a device that never emits all configured
    /// readings.
    pub max_lines: Option<u64>,
}

impl RunLimits {
    pub fn with_max_lines(max_lines: u64) -> Self {
        Self {
            max_lines: Some(max_lines),
        }
    }
}

/// Terminal artifact of a run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub measurement: Measurement,
    pub stats: RunStats,
    /// Present when the source failed rather than ending cleanly.
    pub source_error: Option<String>,
}

/// Drives one run from empty measurement to completion.
pub struct Accumulator {
    catalog: ReadingCatalog,
    baseline: Baseline,
    guard: AnomalyGuard,
    measurement: Measurement,
    recorded_names: HashSet<String>,
    stats: RunStats,
}

impl Accumulator {
    /// Start a run: empty measurement, timestamp captured now.
    pub fn new(catalog: ReadingCatalog, baseline: Baseline) -> Self {
        Self::with_guard(catalog, baseline, AnomalyGuard::default())
    }

    /// Start a run with a non-default anomaly guard.
    pub fn with_guard(catalog: ReadingCatalog, baseline: Baseline, guard: AnomalyGuard) -> Self {
        Self {
            catalog,
            baseline,
            guard,
            measurement: Measurement::started_now(),
            recorded_names: HashSet::new(),
            stats: RunStats::default(),
        }
    }

    /// True once every catalog name has been recorded.
    pub fn is_complete(&self) -> bool {
        self.recorded_names.len() >= self.catalog.len()
    }

    /// Readings recorded so far.
    pub fn recorded(&self) -> usize {
        self.recorded_names.len()
    }

    /// Offer one line to the state machine.
    pub fn offer(&mut self, line: &str) -> LineOutcome {
        self.stats.lines_read += 1;
        debug!("{line}");

        let Some(definition) = self.catalog.match_definition(line) else {
            self.stats.no_match += 1;
            return LineOutcome::NoMatch;
        };

        let reading = match extract::extract(line, definition) {
            Ok(reading) => reading,
            Err(error) => {
                warn!("failed extracting value for reading '{}': {error}", definition.name);
                self.stats.extract_failures += 1;
                return LineOutcome::ExtractFailed {
                    name: definition.name.clone(),
                    error,
                };
            }
        };
        info!("{}: {}{}", reading.name, reading.value, reading.unit);

        if let Verdict::Rejected { delta } = self.guard.check(&reading, &self.baseline) {
            warn!(
                "increase for reading '{}' is {delta}, more than the allowed {}, skipping the reading",
                reading.name,
                self.guard.max_increase()
            );
            self.stats.rejected_jumps += 1;
            return LineOutcome::RejectedJump {
                name: reading.name,
                delta,
            };
        }

        if self.recorded_names.contains(&reading.name) {
            warn!("a reading for '{}' has already been recorded", reading.name);
            self.stats.duplicates += 1;
            return LineOutcome::Duplicate { name: reading.name };
        }

        self.recorded_names.insert(reading.name.clone());
        self.stats.recorded += 1;
        let name = reading.name.clone();
        self.measurement.readings.push(reading);
        LineOutcome::Recorded { name }
    }

    /// Drive the run: pull lines until every reading is collected, the
    /// source ends or fails, or the line ceiling is hit.
    ///
    /// Consumes the accumulator; a run's measurement is immutable once the
    /// run completes.
    pub fn run<S: TelegramSource>(mut self, source: &mut S, limits: RunLimits) -> RunReport {
        let mut source_error = None;

        while !self.is_complete() {
            if let Some(max) = limits.max_lines
                && self.stats.lines_read >= max
            {
                info!(
                    "line ceiling of {max} reached with {} of {} readings",
                    self.recorded(),
                    self.catalog.len()
                );
                break;
            }

            match source.next_line() {
                Ok(Some(line)) => {
                    self.offer(&line);
                }
                Ok(None) => {
                    info!(
                        "line source ended with {} of {} readings",
                        self.recorded(),
                        self.catalog.len()
                    );
                    break;
                }
                Err(error) => {
                    warn!("line source failed: {error}");
                    source_error = Some(error.to_string());
                    break;
                }
            }
        }

        let outcome = if self.is_complete() {
            info!("collected {} readings, stop reading for more", self.measurement.len());
            RunOutcome::Satisfied
        } else {
            RunOutcome::Partial
        };

        RunReport {
            outcome,
            measurement: self.measurement,
            stats: self.stats,
            source_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ReadingDefinition;
    use crate::source::SourceError;

    // -----------------------------------------------------------------------
    // Scripted line source
    // -----------------------------------------------------------------------

    /// Yields a fixed sequence of lines, then end-of-stream or an error.
    struct ScriptedSource {
        lines: Vec<String>,
        next: usize,
        fail_at_end: bool,
    }

    impl ScriptedSource {
        fn new(lines: &[&str]) -> Self {
            Self {
                lines: lines.iter().map(|l| l.to_string()).collect(),
                next: 0,
                fail_at_end: false,
            }
        }

        fn failing(lines: &[&str]) -> Self {
            let mut source = Self::new(lines);
            source.fail_at_end = true;
            source
        }
    }

    impl TelegramSource for ScriptedSource {
        fn next_line(&mut self) -> Result<Option<String>, SourceError> {
            if self.next < self.lines.len() {
                let line = self.lines[self.next].clone();
                self.next += 1;
                return Ok(Some(line));
            }
            if self.fail_at_end {
                return Err(SourceError::Unavailable("device unplugged".to_string()));
            }
            Ok(None)
        }
    }

    // -----------------------------------------------------------------------
    // Fixtures
    // -----------------------------------------------------------------------

    fn definition(prefix: &str, name: &str, unit: &str) -> ReadingDefinition {
        ReadingDefinition {
            prefix: prefix.to_string(),
            name: name.to_string(),
            unit: unit.to_string(),
            value_multiplier: 1000.0,
            value_start_index: 10,
            value_length: 9,
        }
    }

    fn two_reading_catalog() -> ReadingCatalog {
        ReadingCatalog::new(vec![
            definition("1-0:1.8.1", "electricity.consumed.tariff1", "Wh"),
            definition("1-0:1.8.2", "electricity.consumed.tariff2", "Wh"),
        ])
        .unwrap()
    }

    // -----------------------------------------------------------------------
    // Run-loop behavior
    // -----------------------------------------------------------------------

    #[test]
    fn satisfied_after_one_line_per_definition() {
        let mut source = ScriptedSource::new(&[
            "/ISK5\\2M550T-1012",
            "1-0:1.8.2(00456.789*kWh)",
            "noise(1)",
            "1-0:1.8.1(00123.456*kWh)",
            "!1A2B",
        ]);

        let report =
            Accumulator::new(two_reading_catalog(), Baseline::empty()).run(&mut source, RunLimits::default());

        assert_eq!(report.outcome, RunOutcome::Satisfied);
        assert_eq!(report.measurement.len(), 2);
        assert_eq!(report.stats.recorded, 2);
        assert!(report.source_error.is_none());

        // Acceptance order, not catalog order.
        assert_eq!(report.measurement.readings[0].name, "electricity.consumed.tariff2");
        assert_eq!(report.measurement.readings[1].name, "electricity.consumed.tariff1");
        assert!((report.measurement.readings[0].value - 456_789.0).abs() < 1e-6);
    }

    #[test]
    fn stops_reading_once_satisfied() {
        let mut source = ScriptedSource::new(&[
            "1-0:1.8.1(00001.000*kWh)",
            "1-0:1.8.2(00002.000*kWh)",
            "1-0:1.8.1(09999.999*kWh)",
        ]);

        let report =
            Accumulator::new(two_reading_catalog(), Baseline::empty()).run(&mut source, RunLimits::default());

        assert_eq!(report.outcome, RunOutcome::Satisfied);
        // The third line was never pulled.
        assert_eq!(report.stats.lines_read, 2);
    }

    #[test]
    fn first_seen_wins_on_duplicate_reading() {
        let mut source = ScriptedSource::new(&[
            "1-0:1.8.1(00001.000*kWh)",
            "1-0:1.8.1(00099.000*kWh)",
            "1-0:1.8.2(00002.000*kWh)",
        ]);

        let report =
            Accumulator::new(two_reading_catalog(), Baseline::empty()).run(&mut source, RunLimits::default());

        assert_eq!(report.outcome, RunOutcome::Satisfied);
        assert_eq!(report.stats.duplicates, 1);
        let tariff1 = report.measurement.get("electricity.consumed.tariff1").unwrap();
        assert!((tariff1.value - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn partial_when_source_exhausted() {
        let mut source = ScriptedSource::new(&["1-0:1.8.1(00001.000*kWh)"]);

        let report =
            Accumulator::new(two_reading_catalog(), Baseline::empty()).run(&mut source, RunLimits::default());

        assert_eq!(report.outcome, RunOutcome::Partial);
        assert_eq!(report.measurement.len(), 1);
        assert!(report.source_error.is_none());
    }

    #[test]
    fn partial_when_source_fails() {
        let mut source = ScriptedSource::failing(&["1-0:1.8.1(00001.000*kWh)"]);

        let report =
            Accumulator::new(two_reading_catalog(), Baseline::empty()).run(&mut source, RunLimits::default());

        assert_eq!(report.outcome, RunOutcome::Partial);
        assert_eq!(report.measurement.len(), 1);
        assert_eq!(report.source_error.as_deref(), Some("line source unavailable: device unplugged"));
    }

    #[test]
    fn partial_when_line_ceiling_hit() {
        let noise: Vec<String> = (0..100).map(|i| format!("0-0:96.7.21({i:05})")).collect();
        let noise_refs: Vec<&str> = noise.iter().map(|s| s.as_str()).collect();
        let mut source = ScriptedSource::new(&noise_refs);

        let report =
            Accumulator::new(two_reading_catalog(), Baseline::empty()).run(&mut source, RunLimits::with_max_lines(10));

        assert_eq!(report.outcome, RunOutcome::Partial);
        assert_eq!(report.stats.lines_read, 10);
        assert!(report.measurement.is_empty());
    }

    #[test]
    fn empty_catalog_is_satisfied_immediately() {
        let catalog = ReadingCatalog::new(Vec::new()).unwrap();
        let mut source = ScriptedSource::new(&["1-0:1.8.1(00001.000*kWh)"]);

        let report = Accumulator::new(catalog, Baseline::empty()).run(&mut source, RunLimits::default());

        assert_eq!(report.outcome, RunOutcome::Satisfied);
        assert_eq!(report.stats.lines_read, 0);
    }

    // -----------------------------------------------------------------------
    // Per-line transitions
    // -----------------------------------------------------------------------

    #[test]
    fn line_without_match_is_ignored() {
        let mut acc = Accumulator::new(two_reading_catalog(), Baseline::empty());
        assert_eq!(acc.offer("0-1:24.2.1(220101120000W)(00123.456)"), LineOutcome::NoMatch);
        assert_eq!(acc.recorded(), 0);
        assert!(!acc.is_complete());
    }

    #[test]
    fn too_short_line_is_absorbed() {
        let mut acc = Accumulator::new(two_reading_catalog(), Baseline::empty());
        let outcome = acc.offer("1-0:1.8.1(1)");
        assert!(matches!(
            outcome,
            LineOutcome::ExtractFailed {
                error: ExtractError::TooShort { .. },
                ..
            }
        ));
        assert_eq!(acc.recorded(), 0);
    }

    #[test]
    fn garbled_value_is_absorbed() {
        let mut acc = Accumulator::new(two_reading_catalog(), Baseline::empty());
        let outcome = acc.offer("1-0:1.8.1(xx123.456*kWh)");
        assert!(matches!(
            outcome,
            LineOutcome::ExtractFailed {
                error: ExtractError::NotNumeric { .. },
                ..
            }
        ));
    }

    #[test]
    fn implausible_jump_is_rejected_then_retry_can_pass() {
        let mut baseline = Baseline::empty();
        baseline.set("electricity.consumed.tariff1", 1_000_000.0);
        let mut acc = Accumulator::new(two_reading_catalog(), baseline);

        // 9000 kWh * 1000 = 9e6 Wh, a jump of 8e6 over the baseline.
        let outcome = acc.offer("1-0:1.8.1(09000.000*kWh)");
        assert!(matches!(outcome, LineOutcome::RejectedJump { .. }));
        assert_eq!(acc.recorded(), 0);

        // A later sane line for the same reading still records.
        let outcome = acc.offer("1-0:1.8.1(01000.500*kWh)");
        assert!(matches!(outcome, LineOutcome::Recorded { .. }));
        assert_eq!(acc.recorded(), 1);
    }

    #[test]
    fn stats_count_every_disposition() {
        let mut baseline = Baseline::empty();
        baseline.set("electricity.consumed.tariff1", 0.0);
        let mut acc = Accumulator::new(two_reading_catalog(), baseline);

        acc.offer("noise");
        acc.offer("1-0:1.8.1(1)");
        acc.offer("1-0:1.8.1(99999.999*kWh)");
        acc.offer("1-0:1.8.2(00001.000*kWh)");
        acc.offer("1-0:1.8.2(00002.000*kWh)");

        let stats = acc.stats;
        assert_eq!(stats.lines_read, 5);
        assert_eq!(stats.no_match, 1);
        assert_eq!(stats.extract_failures, 1);
        assert_eq!(stats.rejected_jumps, 1);
        assert_eq!(stats.recorded, 1);
        assert_eq!(stats.duplicates, 1);
    }
}
