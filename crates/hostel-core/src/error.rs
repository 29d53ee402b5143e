//! # Error Types
//!
//! Domain-specific error types for hostel-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  hostel-core errors (this file)                                        │
//! │  ├── LedgerError      - Checkout/release rule violations               │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  hostel-db errors (separate crate)                                     │
//! │  ├── StoreError       - Persistence failures                           │
//! │  └── ServiceError     - LedgerError | StoreError                       │
//! │                                                                         │
//! │  HTTP layer (outside this workspace)                                   │
//! │  └── maps `code()` onto status codes                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant is recoverable: a failed operation leaves the ledger
//! exactly as it was.

use thiserror::Error;

// =============================================================================
// Ledger Error
// =============================================================================

/// Checkout ledger errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// No unit with this id exists in the pool.
    #[error("Unit not found: {unit_id}")]
    NotFound { unit_id: u32 },

    /// The unit already has a holder.
    ///
    /// ## When This Occurs
    /// - Two coordinators hit "borrow" on the same iron at once; the
    ///   second one loses the race
    /// - The client shows stale availability
    #[error("Unit {unit_id} is already checked out by {holder}")]
    AlreadyCheckedOut { unit_id: u32, holder: String },

    /// Release was requested for a unit that is already available.
    #[error("Unit {unit_id} is not checked out")]
    NotCheckedOut { unit_id: u32 },

    /// Caller input was rejected before touching any state.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// A persisted record could not be turned into a valid unit.
    #[error("Corrupt record for unit {unit_id}: {reason}")]
    CorruptRecord { unit_id: u32, reason: String },
}

impl LedgerError {
    /// Machine-readable code for the HTTP layer.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::NotFound { .. } => "NOT_FOUND",
            LedgerError::AlreadyCheckedOut { .. } => "ALREADY_CHECKED_OUT",
            LedgerError::NotCheckedOut { .. } => "NOT_CHECKED_OUT",
            LedgerError::InvalidInput(_) => "INVALID_INPUT",
            LedgerError::CorruptRecord { .. } => "CORRUPT_RECORD",
        }
    }

    pub(crate) fn corrupt(unit_id: u32, reason: impl Into<String>) -> Self {
        LedgerError::CorruptRecord {
            unit_id,
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before any unit is locked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
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

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., NaN duration).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with LedgerError.
pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LedgerError::AlreadyCheckedOut {
            unit_id: 2,
            holder: "Alice".to_string(),
        };
        assert_eq!(err.to_string(), "Unit 2 is already checked out by Alice");

        let err = LedgerError::NotCheckedOut { unit_id: 3 };
        assert_eq!(err.to_string(), "Unit 3 is not checked out");
    }

    #[test]
    fn test_validation_converts_to_ledger_error() {
        let validation_err = ValidationError::Required {
            field: "holder".to_string(),
        };
        let err: LedgerError = validation_err.into();
        assert!(matches!(err, LedgerError::InvalidInput(_)));
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::NotFound { unit_id: 99 }.code(), "NOT_FOUND");
        assert_eq!(
            LedgerError::NotCheckedOut { unit_id: 1 }.code(),
            "NOT_CHECKED_OUT"
        );
        assert_eq!(LedgerError::corrupt(1, "x").code(), "CORRUPT_RECORD");
    }
}
