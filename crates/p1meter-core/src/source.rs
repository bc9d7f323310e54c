//! Line sources: where telegrams come from.
//!
//! The accumulator pulls lines through the [`TelegramSource`] trait. The
//! production implementation wraps the P1 serial port, replay wraps a
//! captured log file, and tests script a fixed sequence. `next_line` either
//! yields a line, signals end of stream with `Ok(None)`, or fails; nothing
//! else.

use std::io::BufRead;

use thiserror::Error;

/// Error from the underlying line transport.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("read from line source failed: {0}")]
    Read(#[from] std::io::Error),
    #[error("line source unavailable: {0}")]
    Unavailable(String),
}

/// A sequential source of telegram lines.
pub trait TelegramSource {
    /// Pull the next line. `Ok(None)` means the stream is exhausted.
    fn next_line(&mut self) -> Result<Option<String>, SourceError>;
}

/// Adapts any buffered reader into a telegram source.
///
/// Trailing CR/LF is trimmed; everything before it is preserved byte-for-byte
/// so configured value offsets stay valid. Bytes that are not valid UTF-8
/// (line noise on a serial port) are replaced rather than treated as a read
/// failure.
pub struct LineReader<R> {
    reader: R,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> TelegramSource for LineReader<R> {
    fn next_line(&mut self) -> Result<Option<String>, SourceError> {
        let mut buf = Vec::new();
        let n = self.reader.read_until(b'\n', &mut buf)?;
        if n == 0 {
            return Ok(None);
        }
        while matches!(buf.last(), Some(&(b'\n' | b'\r'))) {
            buf.pop();
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }
}
