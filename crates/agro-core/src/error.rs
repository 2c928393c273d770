//! # Error Types
//!
//! Domain-specific error types for agro-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  agro-core errors (this file)                                          │
//! │  ├── CoreError        - Ledger rule violations found by pure logic     │
//! │  └── ValidationError  - Request validation failures                    │
//! │                                                                         │
//! │  agro-db errors (separate crate)                                       │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── LedgerError      - What callers see (kind + status class)         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ─┐                                  │
//! │                          DbError ───┴──► LedgerError → Caller          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::quantity::Quantity;

// =============================================================================
// Core Error
// =============================================================================

/// Ledger rule violations detected without touching storage.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The lots of a product at a branch cannot cover a deduction.
    ///
    /// ## When This Occurs
    /// ```text
    /// Sale line: UREA-25 × 20 kg
    ///      │
    ///      ▼
    /// Available lots: A=10, B=5  (Σ 15)
    ///      │
    ///      ▼
    /// InsufficientStock { available: 15, required: 20 }
    ///      │
    ///      ▼
    /// Whole sale rolls back
    /// ```
    #[error(
        "Insufficient stock for product {product_id} at branch {branch_id}: available {available}, required {required}"
    )]
    InsufficientStock {
        product_id: String,
        branch_id: String,
        available: Quantity,
        required: Quantity,
    },

    /// A FIFO walk left more than the tolerated residual unallocated.
    ///
    /// This is a server fault: the availability check passed but the lots
    /// did not cover the request.
    #[error("FIFO allocation for product {product_id} left residual {residual} (tolerance {tolerance})")]
    ResidualExceeded {
        product_id: String,
        residual: Quantity,
        tolerance: Quantity,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Request validation errors, raised before any transaction opens.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Quantity above the ledger-wide ceiling.
    #[error("{field} must be at most {max}")]
    TooLarge { field: String, max: Quantity },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Value must not be zero.
    #[error("{field} must not be zero")]
    MustNotBeZero { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A transfer whose source and destination are the same branch.
    #[error("source and destination branch are both {branch_id}")]
    SameBranch { branch_id: String },
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
        let err = CoreError::InsufficientStock {
            product_id: "UREA-25".to_string(),
            branch_id: "SUC-CENTRO".to_string(),
            available: Quantity::from_units(15),
            required: Quantity::from_units(20),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product UREA-25 at branch SUC-CENTRO: available 15, required 20"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "branchId".to_string(),
        };
        assert_eq!(err.to_string(), "branchId is required");

        let err = ValidationError::SameBranch {
            branch_id: "SUC-NORTE".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "source and destination branch are both SUC-NORTE"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
