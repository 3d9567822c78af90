//! # Domain Types
//!
//! Core domain types for the sales order engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Order       │   │   OrderLine     │   │    Product      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  code (VEN...)  │   │  order_id (FK)  │   │  code (business)│       │
//! │  │  status         │   │  quantity       │   │  stock          │       │
//! │  │  total_cents    │   │  unit_price     │   │  min_stock      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │   OrderStatus   │   │    SaleKind     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  credit_limit   │   │  Pending        │   │  Cash           │       │
//! │  │  credit_used    │   │  Completed      │   │  Credit         │       │
//! │  │  last_purchase  │   │  Annulled       │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business code: (`VEN000042`, product code, etc.) - human-readable
//!
//! ## Derived Fields Are Functions
//! "Can this order be edited", "is it overdue", "is stock low" are never
//! stored columns. They are pure functions over the record's current fields.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::{Money, Percent};

// =============================================================================
// Order Status
// =============================================================================

/// The lifecycle status of a sales order.
///
/// ```text
/// Pending ──complete()──► Completed ──annul()──► Annulled (terminal)
///    │                                              ▲
///    └──────────────────annul()─────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order recorded but side effects not yet applied. Editable.
    Pending,
    /// Stock and credit side effects applied. Read-only.
    Completed,
    /// Terminal. Any side effects have been reversed.
    Annulled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

// =============================================================================
// Sale Kind
// =============================================================================

/// Whether the sale is settled immediately or drawn against the
/// customer's credit line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum SaleKind {
    Cash,
    Credit,
}

// =============================================================================
// Document Kind
// =============================================================================

/// Fiscal document type attached to the order header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Invoice,
    Receipt,
    Note,
    Other,
}

// =============================================================================
// Order
// =============================================================================

/// A sales order header with derived monetary totals.
///
/// All `_cents` fields are authoritative derived values: they are recomputed
/// from the line set whenever the lines change, never accepted from callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Sequential human-readable code, e.g. `VEN000042`.
    pub code: String,

    /// Customer this order was sold to.
    pub customer_id: String,

    /// Fiscal document type.
    pub doc_kind: DocumentKind,

    /// Fiscal document number (free-form, e.g. `001-0001`).
    pub doc_number: String,

    /// Date of the sale.
    pub issue_date: NaiveDate,

    /// Payment due date. Present only for credit sales.
    pub due_date: Option<NaiveDate>,

    /// Cash or credit sale.
    pub sale_kind: SaleKind,

    /// Header discount rate in basis points.
    pub discount_rate_bps: u32,

    /// Discount amount in cents (derived).
    pub discount_cents: i64,

    /// Tax rate in basis points.
    pub tax_rate_bps: u32,

    /// Tax amount in cents (derived, on subtotal minus discount).
    pub tax_cents: i64,

    /// Sum of line subtotals in cents (derived).
    pub subtotal_cents: i64,

    /// Grand total in cents (derived).
    pub total_cents: i64,

    /// Lifecycle status.
    pub status: OrderStatus,

    /// Free-text notes.
    pub notes: Option<String>,

    /// Actor who created the order (audit reference).
    pub created_by: Option<String>,

    /// Actor who last touched the order (audit reference).
    pub updated_by: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    /// Returns the discount amount as Money.
    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    /// Returns the tax amount as Money.
    #[inline]
    pub fn tax(&self) -> Money {
        Money::from_cents(self.tax_cents)
    }

    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Returns the header discount rate.
    #[inline]
    pub fn discount_rate(&self) -> Percent {
        Percent::from_bps(self.discount_rate_bps)
    }

    /// Returns the header tax rate.
    #[inline]
    pub fn tax_rate(&self) -> Percent {
        Percent::from_bps(self.tax_rate_bps)
    }

    /// An order can be edited or physically deleted only while Pending.
    #[inline]
    pub fn is_editable(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    /// Whether this order draws on the customer's credit line.
    #[inline]
    pub fn is_credit(&self) -> bool {
        self.sale_kind == SaleKind::Credit
    }

    /// Whether a credit sale's due date has passed.
    ///
    /// Cash sales and orders without a due date are never overdue.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match (self.is_credit(), self.due_date) {
            (true, Some(due)) => due < today,
            _ => false,
        }
    }

    /// Days until the due date (negative when already past).
    ///
    /// `None` for cash sales or when no due date applies.
    pub fn days_until_due(&self, today: NaiveDate) -> Option<i64> {
        match (self.is_credit(), self.due_date) {
            (true, Some(due)) => Some((due - today).num_days()),
            _ => None,
        }
    }
}

// =============================================================================
// Order Line
// =============================================================================

/// A line item belonging to exactly one order.
///
/// Uses the snapshot pattern: `unit_price_cents` is frozen at creation time
/// so later product price changes do not rewrite history. Lines are owned by
/// the order and replaced wholesale on edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub id: String,
    pub order_id: String,
    pub product_id: String,

    /// Quantity sold (positive).
    pub quantity: i64,

    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,

    /// Line discount rate in basis points.
    pub discount_rate_bps: u32,

    /// Line subtotal in cents: quantity x unit price, less line discount.
    pub line_subtotal_cents: i64,

    pub created_at: DateTime<Utc>,
}

impl OrderLine {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line discount rate.
    #[inline]
    pub fn discount_rate(&self) -> Percent {
        Percent::from_bps(self.discount_rate_bps)
    }

    /// Returns the stored line subtotal as Money.
    #[inline]
    pub fn line_subtotal(&self) -> Money {
        Money::from_cents(self.line_subtotal_cents)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product referenced by order lines.
///
/// The engine reads and writes `stock`; everything else is master data
/// owned by other parts of the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: String,

    /// Business code, e.g. `PROD000017`.
    pub code: String,

    pub name: String,

    /// Sale price in cents.
    pub price_cents: i64,

    /// On-hand quantity.
    pub stock: i64,

    /// Reorder threshold.
    pub min_stock: i64,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the sale price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Stock at or below the reorder threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer with a credit line and purchase aggregates.
///
/// `credit_used_cents` and the purchase aggregates are mutated only as side
/// effects of order completion/annulment, inside the same transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,

    pub name: String,

    /// Maximum credit the customer may hold, in cents.
    pub credit_limit_cents: i64,

    /// Credit currently consumed, in cents.
    pub credit_used_cents: i64,

    /// Date of the most recent completed purchase.
    pub last_purchase: Option<NaiveDate>,

    /// Cumulative total of completed purchases, in cents.
    pub total_purchases_cents: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Returns the credit limit as Money.
    #[inline]
    pub fn credit_limit(&self) -> Money {
        Money::from_cents(self.credit_limit_cents)
    }

    /// Returns the credit currently consumed as Money.
    #[inline]
    pub fn credit_used(&self) -> Money {
        Money::from_cents(self.credit_used_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
