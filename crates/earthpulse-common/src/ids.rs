//! Provider and metric identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Satellite instrument family a series is extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Modis,
    Viirs,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::Modis, Provider::Viirs];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Modis => "modis",
            Provider::Viirs => "viirs",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "modis" => Ok(Provider::Modis),
            "viirs" => Ok(Provider::Viirs),
            _ => Err(IdParseError::UnknownProvider(s.to_string())),
        }
    }
}

/// Measurement reported per month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Normalized difference vegetation index.
    Ndvi,
    /// Daytime land surface temperature.
    Lst,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::Ndvi, Metric::Lst];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Ndvi => "ndvi",
            Metric::Lst => "lst",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = IdParseError;

    /// Metric ids are matched exactly; callers send them lowercase.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ndvi" => Ok(Metric::Ndvi),
            "lst" => Ok(Metric::Lst),
            _ => Err(IdParseError::UnknownMetric(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),
}
