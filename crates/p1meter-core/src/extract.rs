//! Fixed-width field extraction from a matching telegram line.
//!
//! The only transformation between a raw line and a recorded value, and it is
//! pure: slice the configured byte range, parse it as a float, apply the
//! multiplier. Both failure kinds are non-fatal to a run; the accumulator
//! logs the line away and keeps collecting.

use thiserror::Error;

use crate::catalog::ReadingDefinition;
use crate::measurement::MeterReading;

/// Why a matching line could not produce a reading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The line does not hold enough bytes for the value at the configured offset.
    #[error("line with length {length} is too short to extract a value at {needed}")]
    TooShort { length: usize, needed: usize },
    /// The value substring did not parse as a number.
    #[error("value substring '{raw}' is not numeric")]
    NotNumeric { raw: String },
}

/// Extract and scale the value for `definition` from `line`.
///
/// Offsets are byte offsets. A range that would split a multi-byte character
/// is reported as [`ExtractError::NotNumeric`]; a numeric field can only be
/// ASCII.
pub fn extract(line: &str, definition: &ReadingDefinition) -> Result<MeterReading, ExtractError> {
    let needed = definition.value_start_index + definition.value_length;
    if line.len() < needed {
        return Err(ExtractError::TooShort {
            length: line.len(),
            needed,
        });
    }

    let bytes = &line.as_bytes()[definition.value_start_index..needed];
    let raw = std::str::from_utf8(bytes).map_err(|_| ExtractError::NotNumeric {
        raw: String::from_utf8_lossy(bytes).into_owned(),
    })?;

    let value: f64 = raw.parse().map_err(|_| ExtractError::NotNumeric {
        raw: raw.to_string(),
    })?;

    Ok(MeterReading {
        name: definition.name.clone(),
        unit: definition.unit.clone(),
        value: value * definition.value_multiplier,
    })
}
