//! # Error Types
//!
//! Structured error types for bolt_core. Every failure carries enough context
//! for a caller to report it or act on it programmatically: configuration
//! errors name the offending field, and ICR non-convergence carries the state
//! of the last trial.
//!
//! ## Example
//!
//! ```rust
//! use bolt_core::errors::{CalcError, CalcResult};
//!
//! fn validate_capacity(capacity: f64) -> CalcResult<()> {
//!     if capacity <= 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "bolt_capacity",
//!             capacity.to_string(),
//!             "Bolt capacity must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_capacity(-1.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for bolt_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for bolt group analysis.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (out of range, non-finite, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Shear and torsion are all zero, so there is nothing to distribute
    #[error("No load applied: Vx, Vy and torsion are all zero")]
    NoLoadApplied,

    /// The ICR search exhausted its iteration budget
    #[error(
        "{method} did not converge after {iterations} iterations \
         (residual {residual:.3e}, last IC at ({ic_x:.4}, {ic_y:.4}))"
    )]
    ConvergenceFailed {
        method: String,
        iterations: usize,
        residual: f64,
        ic_x: f64,
        ic_y: f64,
    },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry with relaxed settings)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CalcError::ConvergenceFailed { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::NoLoadApplied => "NO_LOAD_APPLIED",
            CalcError::ConvergenceFailed { .. } => "CONVERGENCE_FAILED",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

/// Reject NaN and infinite inputs before they poison a solve.
pub(crate) fn require_finite(field: &str, value: f64) -> CalcResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CalcError::invalid_input(field, value.to_string(), "Value must be finite"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::invalid_input("nx", "0", "At least one bolt column is required");
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
        assert!(json.contains("\"type\":\"InvalidInput\""));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::NoLoadApplied.error_code(), "NO_LOAD_APPLIED");
        assert_eq!(
            CalcError::file_error("open", "input.json", "not found").error_code(),
            "FILE_ERROR"
        );
    }

    #[test]
    fn test_convergence_failure_is_recoverable() {
        let error = CalcError::ConvergenceFailed {
            method: "Instant Center of Rotation Method".to_string(),
            iterations: 200,
            residual: 1.5e-3,
            ic_x: -1.25,
            ic_y: 0.5,
        };
        assert!(error.is_recoverable());
        assert!(!CalcError::NoLoadApplied.is_recoverable());

        let message = error.to_string();
        assert!(message.contains("200 iterations"));
        assert!(message.contains("(-1.2500, 0.5000)"));
    }

    #[test]
    fn test_require_finite() {
        assert!(require_finite("vx", 1.0).is_ok());
        assert!(require_finite("vx", f64::NAN).is_err());
        assert!(require_finite("vx", f64::INFINITY).is_err());
    }
}
