//! # Error Types
//!
//! Structured error types for pricing_core. Every failure carries enough
//! context for a caller (CLI, web form, another service) to explain it to a
//! buyer or fix a rate profile without parsing message strings.
//!
//! The engine itself never logs or swallows these errors; they propagate
//! to the caller unmodified.
//!
//! ## Example
//!
//! ```rust
//! use pricing_core::errors::{EstimateError, EstimateResult};
//!
//! fn validate_area(area_sqft: u32) -> EstimateResult<()> {
//!     if area_sqft == 0 {
//!         return Err(EstimateError::InvalidInput {
//!             field: "area_sqft".to_string(),
//!             value: area_sqft.to_string(),
//!             reason: "Area must be positive".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for pricing_core operations
pub type EstimateResult<T> = Result<T, EstimateError>;

/// Structured error type for estimate operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum EstimateError {
    /// A buyer-supplied value is out of range
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Unknown enum key, missing rate-table entry, or unusable profile
    #[error("Configuration error for '{key}': {reason}")]
    Configuration { key: String, reason: String },

    /// Arithmetic guard tripped (zero divisor, overflow)
    #[error("Computation failed: {operation} - {reason}")]
    Computation { operation: String, reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON/TOML serialization or deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl EstimateError {
    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        EstimateError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a Configuration error
    pub fn configuration(key: impl Into<String>, reason: impl Into<String>) -> Self {
        EstimateError::Configuration {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a Computation error
    pub fn computation(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        EstimateError::Computation {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Computation error for an amount that no longer fits in [`Money`](crate::units::Money)
    pub fn overflow(operation: impl Into<String>) -> Self {
        EstimateError::computation(operation, "amount exceeds the representable range")
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        EstimateError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        EstimateError::SerializationError {
            reason: reason.into(),
        }
    }

    /// Configuration and computation failures are fatal to the estimate call.
    /// Only file errors are worth retrying.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EstimateError::FileError { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            EstimateError::InvalidInput { .. } => "INVALID_INPUT",
            EstimateError::Configuration { .. } => "CONFIGURATION_ERROR",
            EstimateError::Computation { .. } => "COMPUTATION_ERROR",
            EstimateError::FileError { .. } => "FILE_ERROR",
            EstimateError::SerializationError { .. } => "SERIALIZATION_ERROR",
            EstimateError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = EstimateError::configuration(
            "premium_packages.ultimate_bespoke",
            "No entry in rate table",
        );
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"Configuration\""));
        let roundtrip: EstimateError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(EstimateError::configuration("k", "r").error_code(), "CONFIGURATION_ERROR");
        assert_eq!(
            EstimateError::computation("footprint", "zero modules").error_code(),
            "COMPUTATION_ERROR"
        );
        assert_eq!(EstimateError::overflow("site_preparation").error_code(), "COMPUTATION_ERROR");
        assert_eq!(
            EstimateError::invalid_input("floors", "3", "bad").error_code(),
            "INVALID_INPUT"
        );
    }

    #[test]
    fn test_only_file_errors_are_recoverable() {
        assert!(EstimateError::file_error("open", "/tmp/x", "busy").is_recoverable());
        assert!(!EstimateError::configuration("k", "r").is_recoverable());
        assert!(!EstimateError::computation("op", "r").is_recoverable());
    }

    #[test]
    fn test_display_message() {
        let error = EstimateError::invalid_input("area_sqft", "200", "Below minimum of 350 sqft");
        assert_eq!(
            error.to_string(),
            "Invalid input for 'area_sqft': 200 - Below minimum of 350 sqft"
        );
    }
}
