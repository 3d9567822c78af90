//! # Validation Module
//!
//! Input validation for order creation and update.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (HTTP layer, out of scope)                            │
//! │  ├── Shape checks, deserialization                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE, before any transaction opens                    │
//! │  ├── Positive quantities, rates within 0..=100%                        │
//! │  ├── Non-empty line set, due-date applicability                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK / foreign key constraints                        │
//! │                                                                         │
//! │  A request that fails here never reaches the store.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::{Money, Percent};
use crate::types::SaleKind;
use crate::{MAX_LINE_QUANTITY, MAX_ORDER_LINES, MAX_UNIT_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a line quantity: strictly positive, bounded to catch typo-scale
/// inputs before they hit stock arithmetic.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    if quantity > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }
    Ok(())
}

/// Validates a unit price snapshot. Zero is allowed (giveaways), negative
/// prices are not. The upper bound keeps quantity-times-price arithmetic
/// inside i64 for any line that passes [`validate_quantity`].
pub fn validate_unit_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustBePositive {
            field: "unit_price".to_string(),
        });
    }
    if price.cents() > MAX_UNIT_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "unit_price".to_string(),
            min: 0,
            max: MAX_UNIT_PRICE_CENTS,
        });
    }
    Ok(())
}

/// Validates a percentage rate field (discount or tax): 0% to 100%.
pub fn validate_rate(field: &str, rate: Percent) -> ValidationResult<()> {
    if rate.bps() > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 10_000,
        });
    }
    Ok(())
}

/// Validates the fiscal document number: required, bounded length.
pub fn validate_doc_number(doc_number: &str) -> ValidationResult<()> {
    let doc_number = doc_number.trim();

    if doc_number.is_empty() {
        return Err(ValidationError::Required {
            field: "doc_number".to_string(),
        });
    }
    if doc_number.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "doc_number".to_string(),
            max: 50,
        });
    }
    Ok(())
}

/// A due date only makes sense on a credit sale.
pub fn validate_due_date(
    sale_kind: SaleKind,
    due_date: Option<chrono::NaiveDate>,
) -> ValidationResult<()> {
    if sale_kind == SaleKind::Cash && due_date.is_some() {
        return Err(ValidationError::InvalidFormat {
            field: "due_date".to_string(),
            reason: "only credit sales carry a due date".to_string(),
        });
    }
    Ok(())
}

/// An order must carry at least one line and stay within the line cap.
pub fn validate_line_count(count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::Required {
            field: "lines".to_string(),
        });
    }
    if count > MAX_ORDER_LINES {
        return Err(ValidationError::OutOfRange {
            field: "lines".to_string(),
            min: 1,
            max: MAX_ORDER_LINES as i64,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_LINE_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(MAX_LINE_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_unit_price() {
        assert!(validate_unit_price(Money::zero()).is_ok());
        assert!(validate_unit_price(Money::from_cents(999)).is_ok());
        assert!(validate_unit_price(Money::from_cents(MAX_UNIT_PRICE_CENTS)).is_ok());
        assert!(validate_unit_price(Money::from_cents(-1)).is_err());
        assert!(validate_unit_price(Money::from_cents(MAX_UNIT_PRICE_CENTS + 1)).is_err());
    }

    #[test]
    fn test_bounds_keep_line_math_in_i64() {
        // the largest line a valid draft can carry must not overflow,
        // even summed across a full order
        let max_line = (MAX_LINE_QUANTITY as i128) * (MAX_UNIT_PRICE_CENTS as i128);
        assert!(max_line * (MAX_ORDER_LINES as i128) < i64::MAX as i128);
    }

    #[test]
    fn test_rate_bounds() {
        assert!(validate_rate("tax_rate", Percent::zero()).is_ok());
        assert!(validate_rate("tax_rate", Percent::from_bps(10_000)).is_ok());
        assert!(validate_rate("tax_rate", Percent::from_bps(10_001)).is_err());
    }

    #[test]
    fn test_doc_number() {
        assert!(validate_doc_number("001-0001").is_ok());
        assert!(validate_doc_number("").is_err());
        assert!(validate_doc_number("   ").is_err());
        assert!(validate_doc_number(&"9".repeat(51)).is_err());
    }

    #[test]
    fn test_due_date_applicability() {
        let due = chrono::NaiveDate::from_ymd_opt(2026, 5, 1);

        assert!(validate_due_date(SaleKind::Credit, due).is_ok());
        assert!(validate_due_date(SaleKind::Credit, None).is_ok());
        assert!(validate_due_date(SaleKind::Cash, None).is_ok());
        assert!(validate_due_date(SaleKind::Cash, due).is_err());
    }

    #[test]
    fn test_line_count() {
        assert!(validate_line_count(1).is_ok());
        assert!(validate_line_count(0).is_err());
        assert!(validate_line_count(MAX_ORDER_LINES + 1).is_err());
    }
}
