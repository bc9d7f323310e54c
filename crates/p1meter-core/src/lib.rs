//! # p1meter-core
//!
//! Turn an unbounded stream of smart-meter telegram lines into one bounded,
//! validated measurement snapshot per run.
//!
//! ## Quick Start
//!
//! ```no_run
//! use p1meter_core::{Accumulator, Baseline, LineReader, ReadingCatalog, RunLimits};
//!
//! let catalog = ReadingCatalog::from_yaml_file("/configs/config.yaml")?;
//! let baseline = Baseline::empty();
//!
//! let file = std::fs::File::open("telegrams.log")?;
//! let mut source = LineReader::new(std::io::BufReader::new(file));
//!
//! let report = Accumulator::new(catalog, baseline).run(&mut source, RunLimits::default());
//! println!("{}: {} readings", report.outcome, report.measurement.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! Lines → catalog match → fixed-width extraction → anomaly guard →
//! dedup/record → Measurement → sinks (archive + state file)
//!
//! Every per-line failure (unmatched line, short line, garbled value,
//! implausible jump, duplicate reading) is absorbed and logged. A run ends
//! `Satisfied` when every configured reading was collected, or `Partial`
//! when the line source ended first; the snapshot it produced is handed to
//! the sinks either way, and the state file feeds the next run's baseline.

pub mod accumulate;
pub mod archive;
pub mod baseline;
pub mod catalog;
pub mod extract;
pub mod guard;
pub mod measurement;
pub mod sink;
pub mod source;
pub mod state;

pub use accumulate::{Accumulator, LineOutcome, RunLimits, RunOutcome, RunReport, RunStats};
pub use archive::JsonlArchive;
pub use baseline::Baseline;
pub use catalog::{CatalogError, ReadingCatalog, ReadingDefinition};
pub use extract::{ExtractError, extract};
pub use guard::{AnomalyGuard, DEFAULT_MAX_INCREASE, GUARDED_UNIT, Verdict};
pub use measurement::{Measurement, MeterReading};
pub use sink::{MeasurementSink, SinkError};
pub use source::{LineReader, SourceError, TelegramSource};
pub use state::{StateError, StateFile};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
