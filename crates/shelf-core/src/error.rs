//! # Error Types
//!
//! Domain-specific error types for shelf-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shelf-core errors (this file)                                         │
//! │  ├── CoreError        - Ledger operation failures                      │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  shelf-db errors (separate crate)                                      │
//! │  └── DbError / StoreError - Persistence failures                       │
//! │                                                                         │
//! │  shelf-counter errors (in app)                                         │
//! │  └── AppError         - What the operator sees (code + message)        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → AppError → Terminal  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every validation failure aborts the operation before any state changes.

use thiserror::Error;

use crate::barcode::Symbology;

// =============================================================================
// Core Error
// =============================================================================

/// Ledger operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Position does not address an entry of the ledger.
    ///
    /// ## When This Occurs
    /// - Editing or removing with a stale position after another removal
    /// - Any position `>= len`
    #[error("Entry {index} is out of range (ledger has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Export encoding failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns true if the error was caused by operator input.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CoreError::Validation(_) | CoreError::IndexOutOfRange { .. }
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These are reported synchronously; the operation is aborted with no state
/// change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Quantity is negative, empty or not a whole number.
    #[error("quantity must be a non-negative whole number, got '{value}'")]
    InvalidQuantity { value: String },

    /// Strict mode: the code contains non-digit characters.
    #[error("Strict mode: barcode must be numeric.")]
    NotNumeric,

    /// Strict mode: the code is not 8, 12 or 13 digits long.
    #[error("Strict mode: length must be 8, 12, or 13 digits (got {len}).")]
    UnsupportedLength { len: usize },

    /// Strict mode: the trailing check digit does not match.
    #[error("Strict mode: checksum failed for EAN/UPC ({symbology}).")]
    ChecksumFailed { symbology: Symbology },
}

impl ValidationError {
    /// Creates a Required error for the given field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates an InvalidQuantity error echoing the rejected input.
    pub fn invalid_quantity(value: impl ToString) -> Self {
        ValidationError::InvalidQuantity {
            value: value.to_string(),
        }
    }
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
    fn test_error_messages() {
        let err = CoreError::IndexOutOfRange { index: 4, len: 2 };
        assert_eq!(
            err.to_string(),
            "Entry 4 is out of range (ledger has 2 entries)"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(
            ValidationError::required("barcode").to_string(),
            "barcode is required"
        );
        assert_eq!(
            ValidationError::NotNumeric.to_string(),
            "Strict mode: barcode must be numeric."
        );
        assert_eq!(
            ValidationError::ChecksumFailed {
                symbology: Symbology::Ean13
            }
            .to_string(),
            "Strict mode: checksum failed for EAN/UPC (EAN-13)."
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::invalid_quantity(-1).into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert!(core_err.is_input_error());
        assert!(!CoreError::Export("io".into()).is_input_error());
    }
}
