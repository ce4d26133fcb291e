//! Result image encoding selected by configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Encoding used for stored result images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Baseline JPEG, stored with a `.jpg` suffix.
    #[default]
    Jpeg,
    /// PNG, stored with a `.png` suffix.
    Png,
}

impl OutputFormat {
    /// Returns the canonical configuration value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }

    /// Returns the file suffix including the leading dot.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Jpeg => ".jpg",
            Self::Png => ".png",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for OutputFormat {
    type Error = ParseOutputFormatError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            _ => Err(ParseOutputFormatError(value.to_owned())),
        }
    }
}

/// Error returned while parsing an output format.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown output format: {0}, expected jpeg or png")]
pub struct ParseOutputFormatError(pub String);
