//! Accepted document encodings

use crate::errors::{ReconcileError, Result};
use std::fmt;
use std::str::FromStr;

/// Document encoding accepted by the flattener and produced by the exporter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// JSON, pretty-printed with two-space indentation on output
    Json,
    /// YAML
    Yaml,
    /// JSON, compact on output
    JsonRaw,
}

impl Format {
    /// Every accepted format; the first entry is the default
    pub const ALL: [Format; 3] = [Format::Json, Format::Yaml, Format::JsonRaw];

    /// Canonical tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::JsonRaw => "jsonraw",
        }
    }

    /// Look up a format by tag
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFormat` for any tag outside [`Format::ALL`].
    pub fn parse(tag: &str) -> Result<Format> {
        Format::ALL
            .into_iter()
            .find(|f| f.as_str() == tag)
            .ok_or_else(|| ReconcileError::UnsupportedFormat {
                format: tag.to_string(),
            })
    }
}

impl Default for Format {
    fn default() -> Self {
        Format::ALL[0]
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self> {
        Format::parse(s)
    }
}
