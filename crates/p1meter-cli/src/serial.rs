//! P1 serial port line source.
//!
//! DSMR v4/v5 meters push telegrams continuously at 115200 8N1; no command
//! needs to be sent. The port is read through a buffered line reader, and a
//! read timeout surfaces as a source error that ends the run as partial.

use std::io::BufReader;
use std::time::Duration;

use anyhow::Context;
use p1meter_core::LineReader;
use serialport::SerialPort;

pub type SerialLineSource = LineReader<BufReader<Box<dyn SerialPort>>>;

/// Open the P1 device and wrap it in a line source.
pub fn open(path: &str, baud: u32, read_timeout: Duration) -> anyhow::Result<SerialLineSource> {
    let port = serialport::new(path, baud)
        .data_bits(serialport::DataBits::Eight)
        .parity(serialport::Parity::None)
        .stop_bits(serialport::StopBits::One)
        .timeout(read_timeout)
        .open()
        .with_context(|| format!("failed opening serial port at {path}"))?;

    Ok(LineReader::new(BufReader::new(port)))
}
