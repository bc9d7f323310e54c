//! `p1meter replay` — run the pipeline over a captured telegram log.
//!
//! Useful for checking a catalog against a real telegram dump before
//! pointing the exporter at the device. Dry by default; `--commit` writes
//! the sinks exactly like a live run.

use std::fs::File;
use std::io::BufReader;

use p1meter_core::{Accumulator, LineReader, RunLimits, StateFile};

use super::{load_catalog, print_report, store_measurement};

/// Run the replay command.
pub fn run(
    file: &str,
    config_path: &str,
    state_path: &str,
    archive_path: &str,
    max_lines: Option<u64>,
    commit: bool,
) {
    let catalog = load_catalog(config_path);

    let state = StateFile::new(state_path);
    let baseline = match state.load_baseline() {
        Ok(baseline) => baseline,
        Err(e) => {
            eprintln!("Error loading state file: {e}");
            std::process::exit(1);
        }
    };

    let telegram_log = match File::open(file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening telegram log {file}: {e}");
            std::process::exit(1);
        }
    };
    let mut source = LineReader::new(BufReader::new(telegram_log));

    let report = Accumulator::new(catalog, baseline).run(&mut source, RunLimits { max_lines });

    print_report(&report);

    if commit {
        if let Err(e) = store_measurement(&report.measurement, archive_path, state_path) {
            eprintln!("Error storing measurement: {e:#}");
            std::process::exit(1);
        }
        println!("Measurement committed to {archive_path} and {state_path}");
    } else {
        println!("Dry run, nothing stored. Pass --commit to write the sinks.");
    }
}
