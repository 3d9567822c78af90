//! # vendia-core: Pure Business Logic for the Vendia Sales Engine
//!
//! This crate is the **heart** of the order lifecycle engine. It contains
//! all business rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vendia Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Request layer (HTTP / RPC, out of scope)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vendia-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  totals   │  │  ledger   │  │   │
//! │  │   │   Order   │  │   Money   │  │  derive   │  │  reserve  │  │   │
//! │  │   │ OrderLine │  │  Percent  │  │  headers  │  │  consume  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   vendia-db (Database Layer)                    │   │
//! │  │        SQLite repositories, transactions, lifecycle service     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Order, OrderLine, Product, Customer) and enums
//! - [`money`] - Money (integer cents) and Percent (basis points)
//! - [`totals`] - Header total derivation from line items
//! - [`ledger`] - Stock reserve/restore and credit consume/release rules
//! - [`lifecycle`] - State machine preconditions for transitions
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: every function is deterministic
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are i64 cents, percentages are
//!    u32 basis points; no floating point anywhere near an invariant
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod money;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Percent};
pub use totals::{line_subtotal, OrderTotals};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Prefix of the sequential human-readable order code (`VEN000042`).
pub const ORDER_CODE_PREFIX: &str = "VEN";

/// Zero-padded width of the numeric suffix in order codes.
pub const ORDER_CODE_PAD: usize = 6;

/// Maximum quantity of a single order line.
///
/// Catches typo-scale inputs (e.g. 100000 instead of 100) before they
/// reach stock arithmetic.
pub const MAX_LINE_QUANTITY: i64 = 999_999;

/// Maximum lines allowed on a single order.
pub const MAX_ORDER_LINES: usize = 500;

/// Maximum unit price of a single order line, in cents.
///
/// Together with [`MAX_LINE_QUANTITY`] and [`MAX_ORDER_LINES`] this keeps
/// every quantity-times-price product and every header sum inside i64:
/// 999,999 × 10^10 × 500 ≈ 5 × 10^18, under i64::MAX.
pub const MAX_UNIT_PRICE_CENTS: i64 = 10_000_000_000;
