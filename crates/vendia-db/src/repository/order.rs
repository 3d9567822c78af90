//! # Order Repository
//!
//! Database operations for orders and their lines.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── insert_tx() + insert_line_tx() × n  → Order { Pending }        │
//! │                                                                         │
//! │  2. EDIT (while Pending)                                               │
//! │     └── delete_lines_tx() + insert_line_tx() × n + update_header_tx()  │
//! │                                                                         │
//! │  3. COMPLETE                                                           │
//! │     └── set_status_tx(Completed), stock/credit effects alongside       │
//! │                                                                         │
//! │  4. ANNUL                                                              │
//! │     └── set_status_tx(Annulled), effects reversed alongside            │
//! │                                                                         │
//! │  All of the above run inside one transaction owned by the service.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use vendia_core::{Order, OrderLine, OrderStatus};

const ORDER_COLUMNS: &str = "id, code, customer_id, doc_kind, doc_number, issue_date, due_date, \
     sale_kind, discount_rate_bps, discount_cents, tax_rate_bps, tax_cents, \
     subtotal_cents, total_cents, status, notes, created_by, updated_by, \
     created_at, updated_at";

const LINE_COLUMNS: &str = "id, order_id, product_id, quantity, unit_price_cents, \
     discount_rate_bps, line_subtotal_cents, created_at";

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets an order by its human-readable code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE code = ?1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets all lines for an order, in insertion order.
    pub async fn get_lines(&self, order_id: &str) -> DbResult<Vec<OrderLine>> {
        let lines = sqlx::query_as::<_, OrderLine>(&format!(
            "SELECT {LINE_COLUMNS} FROM order_lines WHERE order_id = ?1 ORDER BY created_at, id"
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Lists the most recent orders.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Lists orders with a given status, most recent first.
    pub async fn list_by_status(&self, status: OrderStatus, limit: u32) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE status = ?1 \
             ORDER BY created_at DESC LIMIT ?2"
        ))
        .bind(status)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Lists a customer's orders, most recent first.
    pub async fn list_by_customer(&self, customer_id: &str, limit: u32) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE customer_id = ?1 \
             ORDER BY created_at DESC LIMIT ?2"
        ))
        .bind(customer_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    // =========================================================================
    // Transactional operations
    // =========================================================================

    /// Fetches an order inside an open transaction.
    pub async fn get_tx(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(order)
    }

    /// Fetches an order's lines inside an open transaction.
    pub async fn get_lines_tx(
        conn: &mut SqliteConnection,
        order_id: &str,
    ) -> DbResult<Vec<OrderLine>> {
        let lines = sqlx::query_as::<_, OrderLine>(&format!(
            "SELECT {LINE_COLUMNS} FROM order_lines WHERE order_id = ?1 ORDER BY created_at, id"
        ))
        .bind(order_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(lines)
    }

    /// Reads the highest existing order code inside an open transaction.
    ///
    /// Ordered by length first: once the sequence outgrows the zero-pad
    /// width a longer code is numerically larger but lexicographically
    /// smaller, so a plain MAX would hand out an already-taken successor.
    /// The caller's transaction is what serializes this read against a
    /// concurrent creation consuming the same code.
    pub async fn highest_code_tx(conn: &mut SqliteConnection) -> DbResult<Option<String>> {
        let code: Option<String> = sqlx::query_scalar(
            "SELECT code FROM orders ORDER BY length(code) DESC, code DESC LIMIT 1",
        )
        .fetch_optional(&mut *conn)
        .await?;

        Ok(code)
    }

    /// Inserts an order header inside an open transaction.
    pub async fn insert_tx(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, code = %order.code, "inserting order");

        sqlx::query(&format!(
            "INSERT INTO orders ({ORDER_COLUMNS}) VALUES \
             (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)"
        ))
        .bind(&order.id)
        .bind(&order.code)
        .bind(&order.customer_id)
        .bind(order.doc_kind)
        .bind(&order.doc_number)
        .bind(order.issue_date)
        .bind(order.due_date)
        .bind(order.sale_kind)
        .bind(order.discount_rate_bps)
        .bind(order.discount_cents)
        .bind(order.tax_rate_bps)
        .bind(order.tax_cents)
        .bind(order.subtotal_cents)
        .bind(order.total_cents)
        .bind(order.status)
        .bind(&order.notes)
        .bind(&order.created_by)
        .bind(&order.updated_by)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Inserts a line inside an open transaction.
    pub async fn insert_line_tx(conn: &mut SqliteConnection, line: &OrderLine) -> DbResult<()> {
        sqlx::query(&format!(
            "INSERT INTO order_lines ({LINE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
        ))
        .bind(&line.id)
        .bind(&line.order_id)
        .bind(&line.product_id)
        .bind(line.quantity)
        .bind(line.unit_price_cents)
        .bind(line.discount_rate_bps)
        .bind(line.line_subtotal_cents)
        .bind(line.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Deletes all lines of an order inside an open transaction.
    ///
    /// Edits replace the line set wholesale: delete everything, then
    /// recreate from the submitted lines.
    pub async fn delete_lines_tx(conn: &mut SqliteConnection, order_id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM order_lines WHERE order_id = ?1")
            .bind(order_id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected())
    }

    /// Updates an order's header fields and derived totals inside an open
    /// transaction.
    pub async fn update_header_tx(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, "updating order header");

        let result = sqlx::query(
            "UPDATE orders SET \
                customer_id = ?2, doc_kind = ?3, doc_number = ?4, \
                issue_date = ?5, due_date = ?6, sale_kind = ?7, \
                discount_rate_bps = ?8, discount_cents = ?9, \
                tax_rate_bps = ?10, tax_cents = ?11, \
                subtotal_cents = ?12, total_cents = ?13, \
                notes = ?14, updated_by = ?15, updated_at = ?16 \
             WHERE id = ?1",
        )
        .bind(&order.id)
        .bind(&order.customer_id)
        .bind(order.doc_kind)
        .bind(&order.doc_number)
        .bind(order.issue_date)
        .bind(order.due_date)
        .bind(order.sale_kind)
        .bind(order.discount_rate_bps)
        .bind(order.discount_cents)
        .bind(order.tax_rate_bps)
        .bind(order.tax_cents)
        .bind(order.subtotal_cents)
        .bind(order.total_cents)
        .bind(&order.notes)
        .bind(&order.updated_by)
        .bind(order.updated_at)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", &order.id));
        }

        Ok(())
    }

    /// Flips an order's status inside an open transaction.
    ///
    /// The `WHERE status = ?3` guard re-asserts the precondition the
    /// service already checked on the row it read in the same transaction.
    /// The caller supplies the transition timestamp so the order it hands
    /// back matches the stored row exactly.
    pub async fn set_status_tx(
        conn: &mut SqliteConnection,
        id: &str,
        from: OrderStatus,
        to: OrderStatus,
        now: chrono::DateTime<chrono::Utc>,
    ) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE orders SET status = ?2, updated_at = ?4 WHERE id = ?1 AND status = ?3",
        )
        .bind(id)
        .bind(to)
        .bind(from)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        Ok(())
    }

    /// Physically deletes an order header inside an open transaction.
    ///
    /// Lines must be deleted first (or by cascade); only Pending orders
    /// ever reach this point.
    pub async fn delete_tx(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        Ok(())
    }
}

/// Helper to generate a new order ID.
pub fn generate_order_id() -> String {
    Uuid::new_v4().to_string()
}

/// Helper to generate a new order line ID.
pub fn generate_line_id() -> String {
    Uuid::new_v4().to_string()
}
