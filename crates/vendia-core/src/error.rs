//! # Error Types
//!
//! Domain-specific error types for vendia-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vendia-core errors (this file)                                        │
//! │  ├── CoreError        - Business-rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  vendia-db errors (separate crate)                                     │
//! │  ├── DbError          - Store operation failures                       │
//! │  └── OrderError       - Service boundary, unifies the above            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → OrderError → Caller               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (order code, product, amounts)
//! 3. Errors are enum variants, never String
//! 4. Business-rule errors fire BEFORE anything is mutated, so a failed
//!    transition always leaves the store untouched

use thiserror::Error;

use crate::types::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Business-rule violations raised by the order lifecycle.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Completion attempted on an order that is not Pending.
    #[error("order {code} is {status:?}, only pending orders can be completed")]
    InvalidStateTransition { code: String, status: OrderStatus },

    /// Annulment attempted on an already-annulled order.
    #[error("order {code} is already annulled")]
    AlreadyAnnulled { code: String },

    /// Update or delete attempted on a non-Pending order.
    #[error("order {code} is {status:?}, only pending orders can be modified")]
    NotEditable { code: String, status: OrderStatus },

    /// A line quantity exceeds the product's on-hand stock.
    ///
    /// Carries everything the caller needs to display the shortfall.
    /// When raised during completion, no stock change from the same order
    /// survives (the whole transition rolls back).
    #[error("insufficient stock for product '{product}': available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Input validation failure (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any transaction opens; a request that fails validation
/// never reaches the store.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format or an inapplicable combination of fields.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
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
            product: "Widget".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for product 'Widget': available 3, requested 5"
        );

        let err = CoreError::InvalidStateTransition {
            code: "VEN000007".to_string(),
            status: OrderStatus::Completed,
        };
        assert!(err.to_string().contains("VEN000007"));
        assert!(err.to_string().contains("Completed"));
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "customer_id".to_string(),
        };
        assert_eq!(err.to_string(), "customer_id is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "doc_number".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
