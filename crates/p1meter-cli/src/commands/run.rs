//! `p1meter run` — one collection run against the live P1 port.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::info;
use p1meter_core::{Accumulator, RunLimits, RunOutcome, SourceError, StateFile, TelegramSource};

use super::{load_catalog, print_report, store_measurement};
use crate::serial;

pub struct RunCommandConfig<'a> {
    pub device: &'a str,
    pub baud: u32,
    pub read_timeout: Duration,
    pub config_path: &'a str,
    pub state_path: &'a str,
    pub archive_path: &'a str,
    pub max_lines: Option<u64>,
    pub strict: bool,
}

/// Turns a Ctrl+C into a clean end of stream, so an interrupted run still
/// produces a partial report instead of a killed process.
struct InterruptibleSource<S> {
    inner: S,
    stop: Arc<AtomicBool>,
}

impl<S: TelegramSource> TelegramSource for InterruptibleSource<S> {
    fn next_line(&mut self) -> Result<Option<String>, SourceError> {
        if self.stop.load(Ordering::SeqCst) {
            return Ok(None);
        }
        self.inner.next_line()
    }
}

/// Run the collect command.
pub fn run(config: RunCommandConfig<'_>) {
    let catalog = load_catalog(config.config_path);

    let state = StateFile::new(config.state_path);
    let baseline = match state.load_baseline() {
        Ok(baseline) => baseline,
        Err(e) => {
            eprintln!("Error loading state file: {e}");
            std::process::exit(1);
        }
    };

    info!(
        "reading from serial device at {} for {} configured readings",
        config.device,
        catalog.len()
    );
    let port = match serial::open(config.device, config.baud, config.read_timeout) {
        Ok(port) => port,
        Err(e) => {
            eprintln!("Error opening serial device {}: {e:#}", config.device);
            std::process::exit(1);
        }
    };

    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    let mut source = InterruptibleSource { inner: port, stop };
    let report = Accumulator::new(catalog, baseline).run(
        &mut source,
        RunLimits {
            max_lines: config.max_lines,
        },
    );

    print_report(&report);

    if config.strict && report.outcome == RunOutcome::Partial {
        eprintln!("Partial run in strict mode, not storing the measurement.");
        std::process::exit(1);
    }

    if let Err(e) = store_measurement(&report.measurement, config.archive_path, config.state_path) {
        eprintln!("Error storing measurement: {e:#}");
        std::process::exit(1);
    }
}
