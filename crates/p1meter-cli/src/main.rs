//! CLI for p1meter — export DSMR P1 smart-meter readings.

mod commands;
mod serial;

use std::time::Duration;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "p1meter")]
#[command(about = "p1meter — export DSMR P1 smart-meter readings")]
#[command(version = p1meter_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect one measurement run from the P1 serial port
    Run {
        /// Path to the USB device connecting the P1 smart meter
        #[arg(long, env = "P1_DEVICE_PATH", default_value = "/dev/ttyUSB0")]
        device: String,

        /// Serial baud rate (DSMR v4/v5 telegrams are pushed at 115200 8N1)
        #[arg(long, env = "P1_BAUD_RATE", default_value_t = 115_200)]
        baud: u32,

        /// Serial read timeout in seconds; a stalled device ends the run as partial
        #[arg(long, default_value_t = 30)]
        read_timeout: u64,

        /// Path to the reading catalog YAML
        #[arg(long, env = "CONFIG_PATH", default_value = "/configs/config.yaml")]
        config: String,

        /// Path to the state file holding the previous run's measurement
        #[arg(long, env = "STATE_FILE_PATH", default_value = "/configs/last-measurement.json")]
        state_file: String,

        /// Path to the append-only measurement archive
        #[arg(long, env = "ARCHIVE_PATH", default_value = "/data/measurements.jsonl")]
        archive: String,

        /// Stop after this many lines even if readings are missing
        #[arg(long)]
        max_lines: Option<u64>,

        /// Exit nonzero on a partial run without writing to the sinks
        #[arg(long)]
        strict: bool,
    },

    /// Replay a captured telegram log through the same pipeline
    Replay {
        /// File of raw telegram lines
        file: String,

        /// Path to the reading catalog YAML
        #[arg(long, env = "CONFIG_PATH", default_value = "/configs/config.yaml")]
        config: String,

        /// Path to the state file holding the previous run's measurement
        #[arg(long, env = "STATE_FILE_PATH", default_value = "/configs/last-measurement.json")]
        state_file: String,

        /// Path to the append-only measurement archive
        #[arg(long, env = "ARCHIVE_PATH", default_value = "/data/measurements.jsonl")]
        archive: String,

        /// Stop after this many lines even if readings are missing
        #[arg(long)]
        max_lines: Option<u64>,

        /// Also write the replayed measurement to the archive and state file
        #[arg(long)]
        commit: bool,
    },

    /// Validate and print the reading catalog
    Catalog {
        /// Path to the reading catalog YAML
        #[arg(long, env = "CONFIG_PATH", default_value = "/configs/config.yaml")]
        config: String,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            device,
            baud,
            read_timeout,
            config,
            state_file,
            archive,
            max_lines,
            strict,
        } => commands::run::run(commands::run::RunCommandConfig {
            device: &device,
            baud,
            read_timeout: Duration::from_secs(read_timeout),
            config_path: &config,
            state_path: &state_file,
            archive_path: &archive,
            max_lines,
            strict,
        }),
        Commands::Replay {
            file,
            config,
            state_file,
            archive,
            max_lines,
            commit,
        } => commands::replay::run(&file, &config, &state_file, &archive, max_lines, commit),
        Commands::Catalog { config } => commands::catalog::run(&config),
    }
}
