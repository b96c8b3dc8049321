//! Search parameters and transport modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TransportFailure;

/// The transport mode requested by the caller. Selects exactly one
/// provider adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Rail,
    Air,
    Coach,
}

impl TransportMode {
    /// Lowercase wire name, as used in canonical results.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rail => "rail",
            Self::Air => "air",
            Self::Coach => "coach",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = TransportFailure;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rail" => Ok(Self::Rail),
            "air" => Ok(Self::Air),
            "coach" => Ok(Self::Coach),
            other => Err(TransportFailure::validation(format!(
                "unsupported transport mode: {other}"
            ))),
        }
    }
}

/// Parameters for one transport search. Created per call; immutable.
///
/// `date` is passed through to the provider in whatever format that
/// provider expects; this core does not interpret it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    pub departure: String,
    pub arrival: String,
    pub date: String,
    pub passengers: u32,
    pub mode: TransportMode,
}

impl SearchParams {
    pub fn new(
        departure: impl Into<String>,
        arrival: impl Into<String>,
        date: impl Into<String>,
        passengers: u32,
        mode: TransportMode,
    ) -> Self {
        Self {
            departure: departure.into(),
            arrival: arrival.into(),
            date: date.into(),
            passengers,
            mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    #[test]
    fn mode_roundtrip() {
        for (s, mode) in [
            ("rail", TransportMode::Rail),
            ("air", TransportMode::Air),
            ("coach", TransportMode::Coach),
        ] {
            assert_eq!(s.parse::<TransportMode>().unwrap(), mode);
            assert_eq!(mode.to_string(), s);
        }
    }

    #[test]
    fn mode_unknown_is_validation_failure() {
        let err = "teleport".parse::<TransportMode>().unwrap_err();
        assert_eq!(err.kind(), FailureKind::Validation);
        assert!(err.to_string().contains("teleport"));
        assert_eq!(err.to_string(), "unsupported transport mode: teleport");
    }

    #[test]
    fn mode_is_case_sensitive() {
        assert!("Rail".parse::<TransportMode>().is_err());
    }
}
