pub mod catalog;
pub mod replay;
pub mod run;

use anyhow::Context;
use log::info;
use p1meter_core::{JsonlArchive, Measurement, MeasurementSink, ReadingCatalog, RunReport, StateFile};

/// Load and validate the reading catalog, exiting on failure.
pub fn load_catalog(path: &str) -> ReadingCatalog {
    match ReadingCatalog::from_yaml_file(path) {
        Ok(catalog) => {
            info!("loaded {} reading definitions from {path}", catalog.len());
            catalog
        }
        Err(e) => {
            eprintln!("Error loading catalog from {path}: {e}");
            std::process::exit(1);
        }
    }
}

/// Store one finished measurement to both sinks: append to the archive,
/// overwrite the state file.
pub fn store_measurement(
    measurement: &Measurement,
    archive_path: &str,
    state_path: &str,
) -> anyhow::Result<()> {
    let mut archive = JsonlArchive::new(archive_path);
    archive
        .store(measurement)
        .with_context(|| format!("failed appending measurement to {archive_path}"))?;

    let mut state = StateFile::new(state_path);
    state
        .store(measurement)
        .with_context(|| format!("failed writing state file {state_path}"))?;

    info!("stored {} readings to {archive_path} and {state_path}", measurement.len());
    Ok(())
}

/// Print the end-of-run summary.
pub fn print_report(report: &RunReport) {
    println!();
    println!("Run {}", report.outcome);
    println!("  Readings:  {}", report.measurement.len());
    for r in &report.measurement.readings {
        println!("    {:<34} {}{}", r.name, r.value, r.unit);
    }
    let s = &report.stats;
    println!("  Lines:     {} read, {} unmatched", s.lines_read, s.no_match);
    println!(
        "  Discarded: {} extract failures, {} rejected jumps, {} duplicates",
        s.extract_failures, s.rejected_jumps, s.duplicates
    );
    if let Some(err) = &report.source_error {
        println!("  Source error: {err}");
    }
}
