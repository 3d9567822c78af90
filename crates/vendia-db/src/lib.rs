//! # vendia-db: Database Layer for the Vendia Sales Engine
//!
//! This crate provides SQLite persistence for the order lifecycle engine
//! and hosts the transactional lifecycle service.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vendia Data Flow                                 │
//! │                                                                         │
//! │  Caller (HTTP / RPC layer, out of scope)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     vendia-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────┐   ┌───────────────┐   ┌──────────────────┐  │   │
//! │  │   │ OrderService │──▶│ Repositories  │   │    Migrations    │  │   │
//! │  │   │ (service.rs) │   │ order.rs      │   │    (embedded)    │  │   │
//! │  │   │              │   │ product.rs    │   │                  │  │   │
//! │  │   │ transactions │   │ customer.rs   │   │ 001_initial.sql  │  │   │
//! │  │   └──────┬───────┘   └───────┬───────┘   └──────────────────┘  │   │
//! │  │          │                   │                                  │   │
//! │  │          └── vendia-core ────┘  (totals, ledgers, lifecycle)   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (WAL mode, foreign keys on)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and service error types
//! - [`repository`] - Repository implementations (order, product, customer)
//! - [`service`] - The transactional order lifecycle service
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vendia_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/vendia.db")).await?;
//!
//! let svc = db.service();
//! let view = svc.create_order(draft).await?;
//! svc.complete_order(&view.order.id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, OrderError, OrderResult};
pub use pool::{Database, DbConfig};
pub use service::{NewOrderLine, OrderDraft, OrderService, OrderView};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
