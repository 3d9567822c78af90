//! # Stock and Credit Ledgers
//!
//! Pure mutation rules for the two quantities the order lifecycle keeps
//! consistent: product stock and customer credit usage.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Ledger Operations                                   │
//! │                                                                         │
//! │  Stock Ledger (per product)        Credit Ledger (per customer)        │
//! │  ──────────────────────────        ────────────────────────────        │
//! │  reserve(qty)  stock -= qty        consume(amount)  used += amount     │
//! │    fails if qty > stock            release(amount)  used -= amount     │
//! │  restore(qty)  stock += qty          floored at zero                   │
//! │    unconditional                   available = limit − used            │
//! │                                                                         │
//! │  complete():  reserve × lines, consume(total) when credit sale         │
//! │  annul():     restore × lines, release(total) when credit sale         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! These are pure in-memory rules. vendia-db applies the same arithmetic as
//! guarded SQL updates inside one transaction, so a failure on any line
//! rolls back every other line's change.

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Customer, Product};

// =============================================================================
// Stock Ledger
// =============================================================================

impl Product {
    /// Reserves `qty` units: fails with `InsufficientStock` when less than
    /// `qty` is on hand, otherwise decrements.
    pub fn reserve_stock(&mut self, qty: i64) -> CoreResult<()> {
        if self.stock < qty {
            return Err(CoreError::InsufficientStock {
                product: self.name.clone(),
                available: self.stock,
                requested: qty,
            });
        }
        self.stock -= qty;
        Ok(())
    }

    /// Returns `qty` units to stock. Unconditional: annulment puts back
    /// exactly what completion took out.
    pub fn restore_stock(&mut self, qty: i64) {
        self.stock += qty;
    }
}

// =============================================================================
// Credit Ledger
// =============================================================================

impl Customer {
    /// Consumes credit for a completed credit sale.
    ///
    /// No limit check: consumption past the limit is permitted and simply
    /// drives `available_credit` negative. Callers wanting enforcement can
    /// compare against `available_credit` first.
    pub fn consume_credit(&mut self, amount: Money) {
        self.credit_used_cents += amount.cents();
    }

    /// Releases previously consumed credit, floored at zero.
    ///
    /// The lifecycle only ever releases what it consumed, so the floor is a
    /// backstop rather than a rule callers may lean on.
    pub fn release_credit(&mut self, amount: Money) {
        self.credit_used_cents = (self.credit_used_cents - amount.cents()).max(0);
    }

    /// Credit headroom: `limit − used`. Negative when over-consumed.
    pub fn available_credit(&self) -> Money {
        Money::from_cents(self.credit_limit_cents - self.credit_used_cents)
    }

    /// Records a completed purchase: refreshes the last-purchase date and
    /// adds the order total to the cumulative purchase aggregate.
    ///
    /// Annulment does not rewind these aggregates.
    pub fn record_purchase(&mut self, sale_date: chrono::NaiveDate, total: Money) {
        self.last_purchase = Some(sale_date);
        self.total_purchases_cents += total.cents();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn product(stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: "p1".into(),
            code: "PROD000001".into(),
            name: "Widget".into(),
            price_cents: 1000,
            stock,
            min_stock: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn customer(limit: i64, used: i64) -> Customer {
        let now = Utc::now();
        Customer {
            id: "c1".into(),
            name: "Ada".into(),
            credit_limit_cents: limit,
            credit_used_cents: used,
            last_purchase: None,
            total_purchases_cents: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_reserve_and_restore_stock() {
        let mut p = product(10);

        p.reserve_stock(3).unwrap();
        assert_eq!(p.stock, 7);

        p.restore_stock(3);
        assert_eq!(p.stock, 10);
    }

    #[test]
    fn test_reserve_insufficient() {
        let mut p = product(2);

        let err = p.reserve_stock(5).unwrap_err();
        match err {
            CoreError::InsufficientStock {
                product,
                available,
                requested,
            } => {
                assert_eq!(product, "Widget");
                assert_eq!(available, 2);
                assert_eq!(requested, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
        // failed reserve leaves stock untouched
        assert_eq!(p.stock, 2);
    }

    #[test]
    fn test_reserve_exact_stock() {
        let mut p = product(5);
        p.reserve_stock(5).unwrap();
        assert_eq!(p.stock, 0);
    }

    #[test]
    fn test_credit_consume_release_roundtrip() {
        // limit 1000.00, used 0; credit sale of 300.00
        let mut c = customer(100000, 0);

        c.consume_credit(Money::from_cents(30000));
        assert_eq!(c.credit_used_cents, 30000);
        assert_eq!(c.available_credit().cents(), 70000);

        c.release_credit(Money::from_cents(30000));
        assert_eq!(c.credit_used_cents, 0);
        assert_eq!(c.available_credit().cents(), 100000);
    }

    #[test]
    fn test_credit_over_limit_goes_negative() {
        let mut c = customer(10000, 9000);

        // no enforcement at consumption time
        c.consume_credit(Money::from_cents(5000));
        assert_eq!(c.credit_used_cents, 14000);
        assert_eq!(c.available_credit().cents(), -4000);
    }

    #[test]
    fn test_release_floors_at_zero() {
        let mut c = customer(10000, 2000);
        c.release_credit(Money::from_cents(5000));
        assert_eq!(c.credit_used_cents, 0);
    }

    #[test]
    fn test_record_purchase() {
        let mut c = customer(0, 0);
        let date = NaiveDate::from_ymd_opt(2026, 4, 2).unwrap();

        c.record_purchase(date, Money::from_cents(4200));
        c.record_purchase(date, Money::from_cents(800));

        assert_eq!(c.last_purchase, Some(date));
        assert_eq!(c.total_purchases_cents, 5000);
    }
}
