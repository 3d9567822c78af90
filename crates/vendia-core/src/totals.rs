//! # Order Totals
//!
//! Derivation of an order's monetary totals from its line items.
//!
//! ## Derivation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Total Derivation                                   │
//! │                                                                         │
//! │  per line:  quantity × unit_price ──► less line discount ──► subtotal  │
//! │                                                                         │
//! │  header:    Σ line subtotals                                            │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │             discount = subtotal × discount_rate        (rounded)        │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │             tax = (subtotal − discount) × tax_rate     (rounded)        │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │             total = (subtotal − discount) + tax                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every derived value is rounded to cents at its own step, so the header
//! invariant `total == (subtotal − discount) + tax` holds exactly over the
//! stored integer figures.
//!
//! The engine never trusts caller-supplied totals: these functions are
//! re-run whenever the line set changes, and their output is what gets
//! persisted.

use crate::money::{Money, Percent};

// =============================================================================
// Line Subtotal
// =============================================================================

/// Computes a line's subtotal: `quantity × unit_price`, less the line
/// discount (rounded to cents).
///
/// ## Example
/// ```rust
/// use vendia_core::money::{Money, Percent};
/// use vendia_core::totals::line_subtotal;
///
/// // 3 × 10.00 with 10% line discount = 27.00
/// let sub = line_subtotal(3, Money::from_cents(1000), Percent::from_bps(1000));
/// assert_eq!(sub.cents(), 2700);
/// ```
pub fn line_subtotal(quantity: i64, unit_price: Money, discount_rate: Percent) -> Money {
    let gross = unit_price.multiply_quantity(quantity);
    gross - gross.apply_rate(discount_rate)
}

// =============================================================================
// Order Totals
// =============================================================================

/// The four derived header figures of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
}

impl OrderTotals {
    /// Derives header totals from the line subtotals and the header rates.
    ///
    /// ## Example
    /// ```rust
    /// use vendia_core::money::{Money, Percent};
    /// use vendia_core::totals::OrderTotals;
    ///
    /// // lines sum to 100.00; 10% header discount, 18% tax on the rest
    /// let totals = OrderTotals::derive(
    ///     [Money::from_cents(6000), Money::from_cents(4000)],
    ///     Percent::from_bps(1000),
    ///     Percent::from_bps(1800),
    /// );
    /// assert_eq!(totals.subtotal.cents(), 10000);
    /// assert_eq!(totals.discount.cents(), 1000);
    /// assert_eq!(totals.tax.cents(), 1620); // 18% of 90.00
    /// assert_eq!(totals.total.cents(), 10620);
    /// ```
    pub fn derive<I>(line_subtotals: I, discount_rate: Percent, tax_rate: Percent) -> Self
    where
        I: IntoIterator<Item = Money>,
    {
        let subtotal = line_subtotals
            .into_iter()
            .fold(Money::zero(), |acc, line| acc + line);

        let discount = subtotal.apply_rate(discount_rate);
        let taxable = subtotal - discount;
        let tax = taxable.apply_rate(tax_rate);
        let total = taxable + tax;

        OrderTotals {
            subtotal,
            discount,
            tax,
            total,
        }
    }

    /// Totals of an order with no lines. Everything zero.
    pub fn empty() -> Self {
        OrderTotals {
            subtotal: Money::zero(),
            discount: Money::zero(),
            tax: Money::zero(),
            total: Money::zero(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_subtotal_no_discount() {
        let sub = line_subtotal(2, Money::from_cents(10000), Percent::zero());
        assert_eq!(sub.cents(), 20000);
    }

    #[test]
    fn test_line_subtotal_with_discount() {
        // 4 × 2.99 = 11.96; 15% discount = 1.794 -> 1.79; subtotal 10.17
        let sub = line_subtotal(4, Money::from_cents(299), Percent::from_bps(1500));
        assert_eq!(sub.cents(), 1017);
    }

    #[test]
    fn test_derive_plain() {
        let totals = OrderTotals::derive(
            [Money::from_cents(20000)],
            Percent::zero(),
            Percent::zero(),
        );
        assert_eq!(totals.subtotal.cents(), 20000);
        assert_eq!(totals.discount.cents(), 0);
        assert_eq!(totals.tax.cents(), 0);
        assert_eq!(totals.total.cents(), 20000);
    }

    #[test]
    fn test_derive_discount_then_tax() {
        // subtotal 123.45; 10% discount = 12.35 (rounded); taxable 111.10;
        // 18% tax = 20.00 (19.998 rounds); total 131.10
        let totals = OrderTotals::derive(
            [Money::from_cents(12345)],
            Percent::from_bps(1000),
            Percent::from_bps(1800),
        );
        assert_eq!(totals.discount.cents(), 1235);
        assert_eq!(totals.tax.cents(), 2000);
        assert_eq!(totals.total.cents(), 13110);
    }

    #[test]
    fn test_header_invariant_holds() {
        // total == (subtotal - discount) + tax over the stored integers,
        // for a spread of awkward inputs
        let cases = [
            (vec![33, 67, 199], 333u32, 825u32),
            (vec![10001], 9999, 10000),
            (vec![1, 1, 1], 5000, 5000),
            (vec![99999999], 1, 1),
        ];

        for (cents, disc_bps, tax_bps) in cases {
            let totals = OrderTotals::derive(
                cents.iter().map(|&c| Money::from_cents(c)),
                Percent::from_bps(disc_bps),
                Percent::from_bps(tax_bps),
            );
            assert_eq!(
                totals.total,
                (totals.subtotal - totals.discount) + totals.tax,
                "invariant broken for {cents:?} disc={disc_bps} tax={tax_bps}"
            );
        }
    }

    #[test]
    fn test_empty_totals() {
        let totals = OrderTotals::empty();
        assert!(totals.subtotal.is_zero());
        assert!(totals.total.is_zero());

        let derived = OrderTotals::derive(
            std::iter::empty(),
            Percent::from_bps(1000),
            Percent::from_bps(1800),
        );
        assert_eq!(derived, totals);
    }
}
