//! # Finding Severity
//!
//! `error` findings block acceptance of a document; `warning` findings are
//! advisory and never do.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Severity attached to a validation rule and to every finding it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational; never blocks acceptance.
    Warning,
    /// Blocks acceptance.
    #[default]
    Error,
}

impl Severity {
    /// The wire name of this severity.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    /// Whether findings at this severity block acceptance.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// Serde helper: errors are the default and are not written out.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a severity name is neither `error` nor `warning`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown severity: {0:?}")]
pub struct UnknownSeverity(pub String);

impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(UnknownSeverity(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_error() {
        assert_eq!(Severity::default(), Severity::Error);
        assert!(Severity::default().is_blocking());
        assert!(!Severity::Warning.is_blocking());
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("warning".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!(Severity::Error.to_string(), "error");
        let err = "info".parse::<Severity>().unwrap_err();
        assert_eq!(err, UnknownSeverity("info".into()));
        assert_eq!(err.to_string(), "unknown severity: \"info\"");
    }

    #[test]
    fn test_ordering_puts_errors_last() {
        assert!(Severity::Warning < Severity::Error);
    }
}
