//! Error types for Vigil operations

use crate::{EntityType, RecordId};
use thiserror::Error;

/// Storage layer errors.
///
/// A missing record is not an error: stores report it as `Ok(None)` or
/// `Ok(false)` so callers can branch on it without unwinding.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Insert failed for {entity_type:?}: {reason}")]
    InsertFailed { entity_type: EntityType, reason: String },

    #[error("Update failed for {entity_type:?} with id {id}: {reason}")]
    UpdateFailed {
        entity_type: EntityType,
        id: RecordId,
        reason: String,
    },

    #[error("Transaction failed: {reason}")]
    TransactionFailed { reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("Storage backend error: {reason}")]
    Backend { reason: String },
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Value out of range for {field}: {reason}")]
    OutOfRange { field: String, reason: String },
}

impl ValidationError {
    pub fn missing(field: impl Into<String>) -> Self {
        ValidationError::RequiredFieldMissing {
            field: field.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn out_of_range(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::RequiredFieldMissing { field }
            | ValidationError::InvalidValue { field, .. }
            | ValidationError::OutOfRange { field, .. } => field,
        }
    }
}

/// Master error type for all Vigil errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VigilError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Result type alias for Vigil operations.
pub type VigilResult<T> = Result<T, VigilError>;

// =============================================================================
// TESTS
// =============================================================================
