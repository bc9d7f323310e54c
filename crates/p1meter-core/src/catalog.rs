//! Reading catalog: which telegram lines to extract and how.
//!
//! The catalog is an immutable, ordered list of [`ReadingDefinition`]s loaded
//! once per run from a YAML document:
//!
//! ```yaml
//! supportedReadings:
//! - prefix: "1-0:1.8.1"
//!   name: electricity.consumed.tariff1
//!   unit: Wh
//!   valueMultiplier: 1000
//!   valueStartIndex: 10
//!   valueLength: 10
//! ```
//!
//! Line matching is a linear first-prefix-match scan; catalogs hold a few
//! dozen definitions at most.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How to locate and scale one reading inside a matching telegram line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingDefinition {
    /// Literal prefix a line must start with to match this definition.
    pub prefix: String,
    /// Unique identifier for the physical quantity.
    pub name: String,
    /// Unit string, used only to select the unit-specific anomaly policy.
    pub unit: String,
    /// Multiplier applied to the raw parsed value.
    pub value_multiplier: f64,
    /// Byte offset of the value substring within a matching line.
    pub value_start_index: usize,
    /// Byte length of the value substring.
    pub value_length: usize,
}

/// Construction-time catalog failure. Rejected before any run starts; a
/// malformed catalog never surfaces mid-run.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed reading catalog file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed parsing catalog YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("reading #{index} has an empty prefix")]
    EmptyPrefix { index: usize },
    #[error("reading #{index} has an empty name")]
    EmptyName { index: usize },
    #[error("reading '{name}' has a zero value length")]
    ZeroValueLength { name: String },
    #[error("reading name '{name}' appears more than once")]
    DuplicateName { name: String },
}

/// On-disk catalog document.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(rename = "supportedReadings")]
    supported_readings: Vec<ReadingDefinition>,
}

/// Validated, immutable set of reading definitions for one run.
#[derive(Debug, Clone)]
pub struct ReadingCatalog {
    definitions: Vec<ReadingDefinition>,
}

impl ReadingCatalog {
    /// Build a catalog from definitions, validating them first.
    ///
    /// Duplicate names are rejected: the run completes when the number of
    /// distinct recorded names equals the catalog size, so a duplicated name
    /// would make the catalog unsatisfiable. Duplicate prefixes are allowed;
    /// the first matching definition wins.
    pub fn new(definitions: Vec<ReadingDefinition>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for (index, def) in definitions.iter().enumerate() {
            if def.prefix.is_empty() {
                return Err(CatalogError::EmptyPrefix { index });
            }
            if def.name.is_empty() {
                return Err(CatalogError::EmptyName { index });
            }
            if def.value_length == 0 {
                return Err(CatalogError::ZeroValueLength {
                    name: def.name.clone(),
                });
            }
            if !seen.insert(def.name.as_str()) {
                return Err(CatalogError::DuplicateName {
                    name: def.name.clone(),
                });
            }
        }
        Ok(Self { definitions })
    }

    /// Parse and validate a catalog from a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(yaml)?;
        Self::new(file.supported_readings)
    }

    /// Read, parse, and validate a catalog file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&data)
    }

    /// First definition whose prefix literally prefixes `line`, if any.
    pub fn match_definition(&self, line: &str) -> Option<&ReadingDefinition> {
        self.definitions.iter().find(|d| line.starts_with(&d.prefix))
    }

    /// Number of configured readings.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// The definitions in catalog order.
    pub fn definitions(&self) -> &[ReadingDefinition] {
        &self.definitions
    }
}
