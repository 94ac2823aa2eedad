//! Error types for dashaxis.
//!
//! Axis resolution itself never fails: dangling or malformed references are
//! dropped from the result. Errors only come from the collaborators around it
//! (stores, configuration loading) and from validating references and
//! dashboard bookkeeping at ingestion time.

use thiserror::Error;

use crate::storage::StorageError;

/// Validation errors that occur during input validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Measurement reference cannot be empty")]
    EmptyReference,

    #[error("Measurement reference '{reference}' has an empty field at position {position}")]
    EmptyField {
        reference: String,
        position: usize,
    },

    #[error("Measurement reference '{reference}' has {count} fields, expected at most 3")]
    TooManyFields {
        reference: String,
        count: usize,
    },

    #[error("Required field '{field}' is missing")]
    MissingField {
        field: String,
    },

    #[error("Dashboard name '{name}' is already in use")]
    DuplicateDashboardName {
        name: String,
    },

    #[error("Cannot delete the only remaining dashboard")]
    LastDashboard,

    #[error("Invalid dictionary entry '{key}': {reason}")]
    InvalidDictionaryEntry {
        key: String,
        reason: String,
    },
}

/// Errors raised while loading configuration or the measurement dictionary.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read '{path}': {message}")]
    Io {
        path: String,
        message: String,
    },

    #[error("Failed to parse configuration: {message}")]
    Parse {
        message: String,
    },
}

/// Top-level error type for dashaxis.
#[derive(Debug, Error)]
pub enum AxisError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AxisError {
    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a storage error.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if retrying the call may succeed.
    ///
    /// Only backend failures are transient; a missing record or a bad
    /// reference will fail the same way again.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Storage(e) => matches!(e, StorageError::BackendError(_)),
            Self::Validation(_) | Self::Config(_) => false,
        }
    }
}

/// Result type alias for dashaxis operations.
pub type AxisResult<T> = Result<T, AxisError>;
