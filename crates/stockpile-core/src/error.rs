//! # Error Types
//!
//! Domain-specific error types for stockpile-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockpile-core errors (this file)                                     │
//! │  ├── CoreError        - Snapshot encode/decode, wrapped validation     │
//! │  └── ValidationError  - Rule violations in a snapshot                  │
//! │                                                                         │
//! │  stockpile-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  stockpile-sync errors (separate crate)                                │
//! │  └── SyncError        - Remote, local store, config, owner failures    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → SyncError → status `error`        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core data model errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The snapshot or metadata blob could not be encoded or decoded.
    ///
    /// ## When This Occurs
    /// - Local storage holds a blob written by an incompatible build
    /// - A calendar date field holds something that isn't `YYYY-MM-DD`
    #[error("Malformed snapshot: {0}")]
    Serialization(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Snapshot validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. a non-finite coordinate).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Two records in one collection share an id.
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "item.name".to_string(),
        };
        assert_eq!(err.to_string(), "item.name is required");

        let err = ValidationError::Duplicate {
            field: "item.id".to_string(),
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "item.id 'abc' already exists");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_json_error_converts() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let core_err: CoreError = json_err.into();
        assert!(core_err.to_string().starts_with("Malformed snapshot"));
    }
}
