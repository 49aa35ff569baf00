//! # Error Types
//!
//! Structured error types for spring_core. Numeric kernels never fail (they clamp
//! and fall back), so these errors only surface at the edges: configuration that
//! cannot be analysed, preset lookups, and design-file persistence.
//!
//! ## Example
//!
//! ```rust
//! use spring_core::errors::{SpringError, SpringResult};
//!
//! fn require_turns(total_turns: f64) -> SpringResult<()> {
//!     if total_turns < 2.0 {
//!         return Err(SpringError::invalid_input(
//!             "laws.total_turns",
//!             total_turns.to_string(),
//!             "At least two turns are required",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for spring_core operations
pub type SpringResult<T> = Result<T, SpringError>;

/// Structured error type for spring design operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum SpringError {
    /// A configuration value is invalid (non-positive diameter, index <= 1, ...)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Material preset not found
    #[error("Material not found: {material_name}")]
    MaterialNotFound { material_name: String },

    /// Analysis could not produce a result
    #[error("Calculation failed: {calculation_type} - {reason}")]
    CalculationFailed {
        calculation_type: String,
        reason: String,
    },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// Design file is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl SpringError {
    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        SpringError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        SpringError::MissingField {
            field: field.into(),
        }
    }

    /// Create a MaterialNotFound error
    pub fn material_not_found(material_name: impl Into<String>) -> Self {
        SpringError::MaterialNotFound {
            material_name: material_name.into(),
        }
    }

    /// Create a CalculationFailed error
    pub fn calculation_failed(
        calculation_type: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        SpringError::CalculationFailed {
            calculation_type: calculation_type.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        SpringError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(
        path: impl Into<String>,
        locked_by: impl Into<String>,
        locked_at: impl Into<String>,
    ) -> Self {
        SpringError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Wrap a serde_json failure
    pub fn serialization(err: impl std::fmt::Display) -> Self {
        SpringError::SerializationError {
            reason: err.to_string(),
        }
    }

    /// True when retrying later can succeed: the design is only locked by another editor.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SpringError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            SpringError::InvalidInput { .. } => "INVALID_INPUT",
            SpringError::MissingField { .. } => "MISSING_FIELD",
            SpringError::MaterialNotFound { .. } => "MATERIAL_NOT_FOUND",
            SpringError::CalculationFailed { .. } => "CALCULATION_FAILED",
            SpringError::FileError { .. } => "FILE_ERROR",
            SpringError::FileLocked { .. } => "FILE_LOCKED",
            SpringError::SerializationError { .. } => "SERIALIZATION_ERROR",
            SpringError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = SpringError::invalid_input("laws.wire_diameter.mid", "-4", "Must be positive");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: SpringError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(SpringError::missing_field("laws").error_code(), "MISSING_FIELD");
        assert_eq!(
            SpringError::material_not_found("unobtainium").error_code(),
            "MATERIAL_NOT_FOUND"
        );
        assert!(SpringError::file_locked("a.spd", "me", "now").is_recoverable());
        assert!(!SpringError::serialization("bad").is_recoverable());
    }
}
