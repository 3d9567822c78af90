//! # Customer Repository
//!
//! Database operations for customers.
//!
//! The engine owns the credit ledger fields (`credit_used_cents`) and the
//! purchase aggregates (`last_purchase`, `total_purchases_cents`); they are
//! only ever written inside a lifecycle transaction, so the mutation
//! functions take a `&mut SqliteConnection`.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use vendia_core::Customer;

const CUSTOMER_COLUMNS: &str = "id, name, credit_limit_cents, credit_used_cents, \
     last_purchase, total_purchases_cents, created_at, updated_at";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Inserts a new customer.
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, "inserting customer");

        sqlx::query(
            "INSERT INTO customers \
             (id, name, credit_limit_cents, credit_used_cents, last_purchase, \
              total_purchases_cents, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(customer.credit_limit_cents)
        .bind(customer.credit_used_cents)
        .bind(customer.last_purchase)
        .bind(customer.total_purchases_cents)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Transactional operations
    // =========================================================================

    /// Fetches a customer inside an open transaction.
    pub async fn get_tx(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(customer)
    }

    /// Persists the ledger-owned fields of a customer inside an open
    /// transaction.
    ///
    /// The service mutates the in-memory record through the credit ledger
    /// rules first (consume/release/record_purchase) and then writes the
    /// result back here; the surrounding transaction serializes it against
    /// concurrent completions for the same customer.
    pub async fn persist_ledger_tx(conn: &mut SqliteConnection, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, credit_used = customer.credit_used_cents, "persisting customer ledger");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE customers SET \
                credit_used_cents = ?2, \
                last_purchase = ?3, \
                total_purchases_cents = ?4, \
                updated_at = ?5 \
             WHERE id = ?1",
        )
        .bind(&customer.id)
        .bind(customer.credit_used_cents)
        .bind(customer.last_purchase)
        .bind(customer.total_purchases_cents)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", &customer.id));
        }

        Ok(())
    }
}

/// Helper to generate a new customer ID.
pub fn generate_customer_id() -> String {
    Uuid::new_v4().to_string()
}
