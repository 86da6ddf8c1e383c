//! Simulation-specific error types.
//!
//! Only start-up can fail: reading and validating [`crate::Settings`]. Inside a
//! tick every abnormal condition (stale handle, degenerate contact, empty
//! wallet, bullet cap) is a normal outcome reported through `bool`/`Option`.

use std::fmt;
use std::path::PathBuf;

/// Top-level error enum for the simulation core.
#[derive(Debug)]
pub enum SimError {
    /// A settings file could not be read.
    Io {
        /// File that was being read.
        path: PathBuf,
        source: std::io::Error,
    },

    /// Settings JSON was malformed or had the wrong shape.
    Config { source: serde_json::Error },

    /// A setup value is outside the range the simulation can work with.
    UnsafeConstant {
        /// Name of the setting (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::Io { path, source } => {
                write!(f, "failed to read '{}': {}", path.display(), source)
            }
            SimError::Config { source } => write!(f, "invalid settings: {}", source),
            SimError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "setting '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Io { source, .. } => Some(source),
            SimError::Config { source } => Some(source),
            SimError::UnsafeConstant { .. } => None,
        }
    }
}

impl From<serde_json::Error> for SimError {
    fn from(source: serde_json::Error) -> Self {
        SimError::Config { source }
    }
}

/// Convenience alias: a `Result` using `SimError` as the error type.
pub type SimResult<T> = Result<T, SimError>;

/// Returns an error unless `value` is strictly positive.
pub fn require_positive(name: &'static str, value: f32) -> SimResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SimError::UnsafeConstant {
            name,
            value,
            safe_range: "(0.0, ∞)",
        })
    }
}
