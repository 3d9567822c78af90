//! # Order Lifecycle Service
//!
//! The transactional boundary of the engine. Every lifecycle operation
//! runs inside a single SQLite transaction: precondition checks first,
//! then the mutations, then commit. Any failure rolls the whole
//! transaction back, so callers never observe a partially applied order.
//!
//! ## Operation Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Lifecycle Operations                              │
//! │                                                                         │
//! │  create_order    validate → next code → insert header + lines          │
//! │  update_order    Pending only → replace lines → rewrite totals         │
//! │  delete_order    Pending only → physical delete                        │
//! │  complete_order  Pending → Completed                                   │
//! │                     per line: reserve stock                            │
//! │                     credit sale: consume customer credit               │
//! │                     always: record purchase aggregates                 │
//! │  annul_order     Pending|Completed → Annulled                          │
//! │                     was Completed: restore stock, release credit       │
//! │                     was Pending: status flip only                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Totals are always recomputed here from the submitted lines. A caller
//! cannot supply its own header figures.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, OrderError, OrderResult};
use crate::repository::customer::CustomerRepository;
use crate::repository::order::{generate_line_id, generate_order_id, OrderRepository};
use crate::repository::product::ProductRepository;
use vendia_core::{
    line_subtotal, validation, Customer, DocumentKind, Money, Order, OrderLine, OrderStatus,
    OrderTotals, Percent, SaleKind, ORDER_CODE_PAD, ORDER_CODE_PREFIX,
};

/// How many times create_order retries when two writers race for the same
/// sequential code. The UNIQUE index on `orders.code` is the arbiter.
const CODE_RETRY_ATTEMPTS: u32 = 3;

// =============================================================================
// Input DTOs
// =============================================================================

/// One submitted line of an order draft.
///
/// `unit_price_cents` is the price snapshot taken at submission time; later
/// catalog price changes never touch an existing order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderLine {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub discount_rate_bps: u32,
}

/// A full order submission, used by both create and update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
    pub customer_id: String,
    pub doc_kind: DocumentKind,
    pub doc_number: String,
    pub issue_date: chrono::NaiveDate,
    pub due_date: Option<chrono::NaiveDate>,
    pub sale_kind: SaleKind,
    pub discount_rate_bps: u32,
    pub tax_rate_bps: u32,
    pub notes: Option<String>,
    pub actor: Option<String>,
    pub lines: Vec<NewOrderLine>,
}

/// An order with its lines and its customer, as returned to callers.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub order: Order,
    pub lines: Vec<OrderLine>,
    pub customer: Customer,
}

// =============================================================================
// Service
// =============================================================================

/// Transactional order lifecycle operations.
#[derive(Debug, Clone)]
pub struct OrderService {
    pool: SqlitePool,
}

impl OrderService {
    /// Creates a new OrderService.
    pub fn new(pool: SqlitePool) -> Self {
        OrderService { pool }
    }

    /// Creates a new order in Pending status and assigns it the next
    /// sequential code.
    ///
    /// The code is read and consumed inside the same transaction as the
    /// insert. If a concurrent creation wins the code, the UNIQUE index
    /// rejects ours and the whole attempt is retried with a fresh read.
    pub async fn create_order(&self, draft: OrderDraft) -> OrderResult<OrderView> {
        validate_draft(&draft)?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_create(&draft).await {
                Err(OrderError::Db(DbError::UniqueViolation { field, .. }))
                    if field.contains("orders.code") && attempt < CODE_RETRY_ATTEMPTS =>
                {
                    debug!(attempt, "order code taken by concurrent writer, retrying");
                    continue;
                }
                other => return other,
            }
        }
    }

    async fn try_create(&self, draft: &OrderDraft) -> OrderResult<OrderView> {
        let mut tx = self.pool.begin().await?;

        let customer = CustomerRepository::get_tx(&mut tx, &draft.customer_id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", &draft.customer_id))?;

        let code = next_code(OrderRepository::highest_code_tx(&mut tx).await?.as_deref());
        let order_id = generate_order_id();
        let now = Utc::now();

        let lines = build_lines(&mut tx, &order_id, &draft.lines, now).await?;
        let totals = OrderTotals::derive(
            lines.iter().map(|l| l.line_subtotal()),
            Percent::from_bps(draft.discount_rate_bps),
            Percent::from_bps(draft.tax_rate_bps),
        );

        let order = Order {
            id: order_id,
            code,
            customer_id: draft.customer_id.clone(),
            doc_kind: draft.doc_kind,
            doc_number: draft.doc_number.trim().to_string(),
            issue_date: draft.issue_date,
            due_date: draft.due_date,
            sale_kind: draft.sale_kind,
            discount_rate_bps: draft.discount_rate_bps,
            discount_cents: totals.discount.cents(),
            tax_rate_bps: draft.tax_rate_bps,
            tax_cents: totals.tax.cents(),
            subtotal_cents: totals.subtotal.cents(),
            total_cents: totals.total.cents(),
            status: OrderStatus::Pending,
            notes: draft.notes.clone(),
            created_by: draft.actor.clone(),
            updated_by: draft.actor.clone(),
            created_at: now,
            updated_at: now,
        };

        OrderRepository::insert_tx(&mut tx, &order).await?;
        for line in &lines {
            OrderRepository::insert_line_tx(&mut tx, line).await?;
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            target: "audit",
            code = %order.code,
            customer = %customer.id,
            total_cents = order.total_cents,
            "order created"
        );

        Ok(OrderView {
            order,
            lines,
            customer,
        })
    }

    /// Replaces a Pending order's header fields and its entire line set,
    /// recomputing totals from the submitted lines.
    pub async fn update_order(&self, id: &str, draft: OrderDraft) -> OrderResult<OrderView> {
        validate_draft(&draft)?;

        let mut tx = self.pool.begin().await?;

        let existing = OrderRepository::get_tx(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))?;
        existing.ensure_editable()?;

        let customer = CustomerRepository::get_tx(&mut tx, &draft.customer_id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", &draft.customer_id))?;

        let now = Utc::now();
        OrderRepository::delete_lines_tx(&mut tx, id).await?;
        let lines = build_lines(&mut tx, id, &draft.lines, now).await?;
        let totals = OrderTotals::derive(
            lines.iter().map(|l| l.line_subtotal()),
            Percent::from_bps(draft.discount_rate_bps),
            Percent::from_bps(draft.tax_rate_bps),
        );

        let order = Order {
            customer_id: draft.customer_id.clone(),
            doc_kind: draft.doc_kind,
            doc_number: draft.doc_number.trim().to_string(),
            issue_date: draft.issue_date,
            due_date: draft.due_date,
            sale_kind: draft.sale_kind,
            discount_rate_bps: draft.discount_rate_bps,
            discount_cents: totals.discount.cents(),
            tax_rate_bps: draft.tax_rate_bps,
            tax_cents: totals.tax.cents(),
            subtotal_cents: totals.subtotal.cents(),
            total_cents: totals.total.cents(),
            notes: draft.notes.clone(),
            updated_by: draft.actor.clone(),
            updated_at: now,
            ..existing
        };

        for line in &lines {
            OrderRepository::insert_line_tx(&mut tx, line).await?;
        }
        OrderRepository::update_header_tx(&mut tx, &order).await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(target: "audit", code = %order.code, "order updated");

        Ok(OrderView {
            order,
            lines,
            customer,
        })
    }

    /// Physically deletes a Pending order and its lines.
    pub async fn delete_order(&self, id: &str) -> OrderResult<()> {
        let mut tx = self.pool.begin().await?;

        let order = OrderRepository::get_tx(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))?;
        order.ensure_editable()?;

        OrderRepository::delete_lines_tx(&mut tx, id).await?;
        OrderRepository::delete_tx(&mut tx, id).await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(target: "audit", code = %order.code, "order deleted");

        Ok(())
    }

    /// Completes a Pending order.
    ///
    /// Reserves stock for every line, consumes customer credit when the
    /// sale is on credit, records the purchase aggregates, and flips the
    /// status. An insufficient-stock failure on any line aborts everything.
    pub async fn complete_order(&self, id: &str) -> OrderResult<Order> {
        let mut tx = self.pool.begin().await?;

        let order = OrderRepository::get_tx(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))?;
        order.ensure_can_complete()?;

        let lines = OrderRepository::get_lines_tx(&mut tx, id).await?;

        for line in &lines {
            let mut product = ProductRepository::get_tx(&mut tx, &line.product_id)
                .await?
                .ok_or_else(|| DbError::not_found("Product", &line.product_id))?;
            product.reserve_stock(line.quantity)?;
            ProductRepository::adjust_stock_tx(&mut tx, &line.product_id, -line.quantity).await?;
        }

        let mut customer = CustomerRepository::get_tx(&mut tx, &order.customer_id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", &order.customer_id))?;
        if order.is_credit() {
            customer.consume_credit(order.total());
        }
        customer.record_purchase(order.issue_date, order.total());
        CustomerRepository::persist_ledger_tx(&mut tx, &customer).await?;

        let now = Utc::now();
        OrderRepository::set_status_tx(
            &mut tx,
            id,
            OrderStatus::Pending,
            OrderStatus::Completed,
            now,
        )
        .await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            target: "audit",
            code = %order.code,
            total_cents = order.total_cents,
            credit = order.is_credit(),
            "order completed"
        );

        let mut completed = order;
        completed.status = OrderStatus::Completed;
        completed.updated_at = now;
        Ok(completed)
    }

    /// Annuls a Pending or Completed order.
    ///
    /// When the order was Completed its side effects are reversed: stock
    /// goes back per line and consumed credit is released. The purchase
    /// aggregates are deliberately left alone. A Pending order just flips
    /// status.
    pub async fn annul_order(&self, id: &str) -> OrderResult<Order> {
        let mut tx = self.pool.begin().await?;

        let order = OrderRepository::get_tx(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))?;
        order.ensure_can_annul()?;

        if order.status == OrderStatus::Completed {
            let lines = OrderRepository::get_lines_tx(&mut tx, id).await?;
            for line in &lines {
                ProductRepository::adjust_stock_tx(&mut tx, &line.product_id, line.quantity)
                    .await?;
            }

            if order.is_credit() {
                let mut customer = CustomerRepository::get_tx(&mut tx, &order.customer_id)
                    .await?
                    .ok_or_else(|| DbError::not_found("Customer", &order.customer_id))?;
                customer.release_credit(order.total());
                CustomerRepository::persist_ledger_tx(&mut tx, &customer).await?;
            }
        }

        let now = Utc::now();
        OrderRepository::set_status_tx(&mut tx, id, order.status, OrderStatus::Annulled, now)
            .await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            target: "audit",
            code = %order.code,
            was = ?order.status,
            "order annulled"
        );

        let mut annulled = order;
        annulled.status = OrderStatus::Annulled;
        annulled.updated_at = now;
        Ok(annulled)
    }

    /// Loads an order with its lines and customer.
    pub async fn get_order(&self, id: &str) -> OrderResult<OrderView> {
        let orders = OrderRepository::new(self.pool.clone());
        let customers = CustomerRepository::new(self.pool.clone());

        let order = orders
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))?;
        let lines = orders.get_lines(id).await?;
        let customer = customers
            .get_by_id(&order.customer_id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", &order.customer_id))?;

        Ok(OrderView {
            order,
            lines,
            customer,
        })
    }

    /// Peeks at the code the next created order would receive.
    ///
    /// Advisory only: a creation committed between this call and yours can
    /// consume the code.
    pub async fn next_order_code(&self) -> OrderResult<String> {
        let mut conn = self.pool.acquire().await.map_err(DbError::from)?;
        let highest = OrderRepository::highest_code_tx(&mut conn).await?;
        Ok(next_code(highest.as_deref()))
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn validate_draft(draft: &OrderDraft) -> OrderResult<()> {
    validation::validate_doc_number(&draft.doc_number)?;
    validation::validate_rate("discount_rate", Percent::from_bps(draft.discount_rate_bps))?;
    validation::validate_rate("tax_rate", Percent::from_bps(draft.tax_rate_bps))?;
    validation::validate_due_date(draft.sale_kind, draft.due_date)?;
    validation::validate_line_count(draft.lines.len())?;
    for line in &draft.lines {
        validation::validate_quantity(line.quantity)?;
        validation::validate_unit_price(Money::from_cents(line.unit_price_cents))?;
        validation::validate_rate("line_discount", Percent::from_bps(line.discount_rate_bps))?;
    }
    Ok(())
}

/// Builds persisted line records from submitted lines, verifying each
/// product exists. The unit price is whatever the draft snapshotted.
async fn build_lines(
    conn: &mut sqlx::SqliteConnection,
    order_id: &str,
    drafts: &[NewOrderLine],
    now: chrono::DateTime<Utc>,
) -> OrderResult<Vec<OrderLine>> {
    let mut lines = Vec::with_capacity(drafts.len());

    for draft in drafts {
        ProductRepository::get_tx(conn, &draft.product_id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", &draft.product_id))?;

        let subtotal = line_subtotal(
            draft.quantity,
            Money::from_cents(draft.unit_price_cents),
            Percent::from_bps(draft.discount_rate_bps),
        );

        lines.push(OrderLine {
            id: generate_line_id(),
            order_id: order_id.to_string(),
            product_id: draft.product_id.clone(),
            quantity: draft.quantity,
            unit_price_cents: draft.unit_price_cents,
            discount_rate_bps: draft.discount_rate_bps,
            line_subtotal_cents: subtotal.cents(),
            created_at: now,
        });
    }

    Ok(lines)
}

/// Computes the successor of the highest assigned code.
///
/// Codes are `VEN` followed by a zero-padded sequence number. An overflow
/// past the pad width simply widens the number and never shrinks back;
/// the repository's highest-code read is length-aware so the widened
/// codes keep sequencing correctly.
fn next_code(highest: Option<&str>) -> String {
    let next = highest
        .and_then(|code| code.strip_prefix(ORDER_CODE_PREFIX))
        .and_then(|digits| digits.parse::<u64>().ok())
        .map(|n| n + 1)
        .unwrap_or(1);

    format!("{ORDER_CODE_PREFIX}{next:0width$}", width = ORDER_CODE_PAD)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OrderError;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;
    use vendia_core::{CoreError, Product, ValidationError};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_customer(db: &Database, id: &str, credit_limit_cents: i64) {
        let now = Utc::now();
        db.customers()
            .insert(&Customer {
                id: id.to_string(),
                name: format!("Customer {id}"),
                credit_limit_cents,
                credit_used_cents: 0,
                last_purchase: None,
                total_purchases_cents: 0,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
    }

    async fn seed_product(db: &Database, id: &str, price_cents: i64, stock: i64) {
        let now = Utc::now();
        db.products()
            .insert(&Product {
                id: id.to_string(),
                code: format!("PROD-{id}"),
                name: format!("Product {id}"),
                price_cents,
                stock,
                min_stock: 0,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
    }

    fn draft(customer_id: &str, lines: Vec<NewOrderLine>) -> OrderDraft {
        OrderDraft {
            customer_id: customer_id.to_string(),
            doc_kind: DocumentKind::Invoice,
            doc_number: "001-0001".to_string(),
            issue_date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            due_date: None,
            sale_kind: SaleKind::Cash,
            discount_rate_bps: 0,
            tax_rate_bps: 0,
            notes: None,
            actor: Some("tester".to_string()),
            lines,
        }
    }

    async fn seed_order_with_code(db: &Database, customer_id: &str, code: &str) {
        let now = Utc::now();
        let order = Order {
            id: generate_order_id(),
            code: code.to_string(),
            customer_id: customer_id.to_string(),
            doc_kind: DocumentKind::Invoice,
            doc_number: "001-0000".to_string(),
            issue_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            due_date: None,
            sale_kind: SaleKind::Cash,
            discount_rate_bps: 0,
            discount_cents: 0,
            tax_rate_bps: 0,
            tax_cents: 0,
            subtotal_cents: 0,
            total_cents: 0,
            status: OrderStatus::Pending,
            notes: None,
            created_by: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
        };

        let mut tx = db.pool().begin().await.unwrap();
        OrderRepository::insert_tx(&mut tx, &order).await.unwrap();
        tx.commit().await.unwrap();
    }

    fn line(product_id: &str, quantity: i64, unit_price_cents: i64) -> NewOrderLine {
        NewOrderLine {
            product_id: product_id.to_string(),
            quantity,
            unit_price_cents,
            discount_rate_bps: 0,
        }
    }

    #[test]
    fn test_next_code_sequence() {
        assert_eq!(next_code(None), "VEN000001");
        assert_eq!(next_code(Some("VEN000001")), "VEN000002");
        assert_eq!(next_code(Some("VEN000099")), "VEN000100");
        assert_eq!(next_code(Some("VEN999999")), "VEN1000000");
        assert_eq!(next_code(Some("VEN1000000")), "VEN1000001");
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_codes() {
        let db = setup().await;
        seed_customer(&db, "c1", 0).await;
        seed_product(&db, "p1", 1000, 100).await;

        let svc = db.service();
        let first = svc
            .create_order(draft("c1", vec![line("p1", 1, 1000)]))
            .await
            .unwrap();
        let second = svc
            .create_order(draft("c1", vec![line("p1", 2, 1000)]))
            .await
            .unwrap();

        assert_eq!(first.order.code, "VEN000001");
        assert_eq!(second.order.code, "VEN000002");
        assert_eq!(first.order.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_totals_follow_rates() {
        let db = setup().await;
        seed_customer(&db, "c1", 0).await;
        seed_product(&db, "p1", 1000, 100).await;

        // 10 × 10.00 = 100.00; 10% discount, 18% tax on the remainder
        let mut d = draft("c1", vec![line("p1", 10, 1000)]);
        d.discount_rate_bps = 1000;
        d.tax_rate_bps = 1800;

        let view = db.service().create_order(d).await.unwrap();
        let o = &view.order;

        assert_eq!(o.subtotal_cents, 10000);
        assert_eq!(o.discount_cents, 1000);
        assert_eq!(o.tax_cents, 1620);
        assert_eq!(o.total_cents, 10620);
        assert_eq!(
            o.total_cents,
            o.subtotal_cents - o.discount_cents + o.tax_cents
        );
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].line_subtotal_cents, 10000);
    }

    #[tokio::test]
    async fn test_create_does_not_touch_stock() {
        let db = setup().await;
        seed_customer(&db, "c1", 0).await;
        seed_product(&db, "p1", 1000, 10).await;

        db.service()
            .create_order(draft("c1", vec![line("p1", 3, 1000)]))
            .await
            .unwrap();

        let p = db.products().get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(p.stock, 10);
    }

    #[tokio::test]
    async fn test_complete_reserves_stock_and_records_purchase() {
        let db = setup().await;
        seed_customer(&db, "c1", 0).await;
        seed_product(&db, "p1", 1000, 10).await;

        let svc = db.service();
        let view = svc
            .create_order(draft("c1", vec![line("p1", 3, 1000)]))
            .await
            .unwrap();

        let completed = svc.complete_order(&view.order.id).await.unwrap();
        assert_eq!(completed.status, OrderStatus::Completed);

        let p = db.products().get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(p.stock, 7);

        let c = db.customers().get_by_id("c1").await.unwrap().unwrap();
        assert_eq!(c.last_purchase, Some(view.order.issue_date));
        assert_eq!(c.total_purchases_cents, 3000);
        // cash sale leaves credit alone
        assert_eq!(c.credit_used_cents, 0);
    }

    #[tokio::test]
    async fn test_complete_twice_fails_and_changes_nothing() {
        let db = setup().await;
        seed_customer(&db, "c1", 0).await;
        seed_product(&db, "p1", 1000, 10).await;

        let svc = db.service();
        let view = svc
            .create_order(draft("c1", vec![line("p1", 3, 1000)]))
            .await
            .unwrap();
        svc.complete_order(&view.order.id).await.unwrap();

        let err = svc.complete_order(&view.order.id).await.unwrap_err();
        assert!(matches!(
            err,
            OrderError::Core(CoreError::InvalidStateTransition { .. })
        ));

        // no second reservation happened
        let p = db.products().get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(p.stock, 7);
        let c = db.customers().get_by_id("c1").await.unwrap().unwrap();
        assert_eq!(c.total_purchases_cents, 3000);
    }

    #[tokio::test]
    async fn test_complete_insufficient_stock_is_all_or_nothing() {
        let db = setup().await;
        seed_customer(&db, "c1", 0).await;
        seed_product(&db, "pa", 1000, 5).await;
        seed_product(&db, "pb", 2000, 2).await;

        let svc = db.service();
        let view = svc
            .create_order(draft("c1", vec![line("pa", 3, 1000), line("pb", 5, 2000)]))
            .await
            .unwrap();

        let err = svc.complete_order(&view.order.id).await.unwrap_err();
        match err {
            OrderError::Core(CoreError::InsufficientStock {
                available,
                requested,
                ..
            }) => {
                assert_eq!(available, 2);
                assert_eq!(requested, 5);
            }
            other => panic!("unexpected error: {other}"),
        }

        // the first line's reservation was rolled back with everything else
        let pa = db.products().get_by_id("pa").await.unwrap().unwrap();
        assert_eq!(pa.stock, 5);
        let pb = db.products().get_by_id("pb").await.unwrap().unwrap();
        assert_eq!(pb.stock, 2);

        let order = db.orders().get_by_id(&view.order.id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_credit_sale_consumes_and_annul_releases() {
        let db = setup().await;
        // limit 1000.00
        seed_customer(&db, "c1", 100_000).await;
        seed_product(&db, "p1", 30_000, 10).await;

        let svc = db.service();
        let mut d = draft("c1", vec![line("p1", 1, 30_000)]);
        d.sale_kind = SaleKind::Credit;
        d.due_date = NaiveDate::from_ymd_opt(2026, 4, 10);

        let view = svc.create_order(d).await.unwrap();
        svc.complete_order(&view.order.id).await.unwrap();

        let c = db.customers().get_by_id("c1").await.unwrap().unwrap();
        assert_eq!(c.credit_used_cents, 30_000);
        assert_eq!(c.available_credit().cents(), 70_000);
        assert_eq!(c.total_purchases_cents, 30_000);

        svc.annul_order(&view.order.id).await.unwrap();

        let c = db.customers().get_by_id("c1").await.unwrap().unwrap();
        assert_eq!(c.credit_used_cents, 0);
        // aggregates are not rewound by annulment
        assert_eq!(c.total_purchases_cents, 30_000);
        assert!(c.last_purchase.is_some());

        let p = db.products().get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(p.stock, 10);
    }

    #[tokio::test]
    async fn test_annul_pending_flips_status_only() {
        let db = setup().await;
        seed_customer(&db, "c1", 0).await;
        seed_product(&db, "p1", 1000, 10).await;

        let svc = db.service();
        let view = svc
            .create_order(draft("c1", vec![line("p1", 4, 1000)]))
            .await
            .unwrap();

        let annulled = svc.annul_order(&view.order.id).await.unwrap();
        assert_eq!(annulled.status, OrderStatus::Annulled);

        // never completed, so no stock or ledger movement to reverse
        let p = db.products().get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(p.stock, 10);
        let c = db.customers().get_by_id("c1").await.unwrap().unwrap();
        assert_eq!(c.total_purchases_cents, 0);
    }

    #[tokio::test]
    async fn test_annul_twice_fails() {
        let db = setup().await;
        seed_customer(&db, "c1", 0).await;
        seed_product(&db, "p1", 1000, 10).await;

        let svc = db.service();
        let view = svc
            .create_order(draft("c1", vec![line("p1", 1, 1000)]))
            .await
            .unwrap();
        svc.annul_order(&view.order.id).await.unwrap();

        let err = svc.annul_order(&view.order.id).await.unwrap_err();
        assert!(matches!(
            err,
            OrderError::Core(CoreError::AlreadyAnnulled { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_replaces_lines_and_recomputes_totals() {
        let db = setup().await;
        seed_customer(&db, "c1", 0).await;
        seed_product(&db, "p1", 1000, 10).await;
        seed_product(&db, "p2", 500, 10).await;

        let svc = db.service();
        let view = svc
            .create_order(draft("c1", vec![line("p1", 2, 1000)]))
            .await
            .unwrap();
        assert_eq!(view.order.total_cents, 2000);

        let updated = svc
            .update_order(&view.order.id, draft("c1", vec![line("p2", 3, 500)]))
            .await
            .unwrap();

        assert_eq!(updated.order.code, view.order.code);
        assert_eq!(updated.order.total_cents, 1500);
        assert_eq!(updated.lines.len(), 1);
        assert_eq!(updated.lines[0].product_id, "p2");

        let stored = svc.get_order(&view.order.id).await.unwrap();
        assert_eq!(stored.lines.len(), 1);
        assert_eq!(stored.order.total_cents, 1500);
    }

    #[tokio::test]
    async fn test_update_and_delete_require_pending() {
        let db = setup().await;
        seed_customer(&db, "c1", 0).await;
        seed_product(&db, "p1", 1000, 10).await;

        let svc = db.service();
        let view = svc
            .create_order(draft("c1", vec![line("p1", 1, 1000)]))
            .await
            .unwrap();
        svc.complete_order(&view.order.id).await.unwrap();

        let err = svc
            .update_order(&view.order.id, draft("c1", vec![line("p1", 2, 1000)]))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Core(CoreError::NotEditable { .. })));

        let err = svc.delete_order(&view.order.id).await.unwrap_err();
        assert!(matches!(err, OrderError::Core(CoreError::NotEditable { .. })));
    }

    #[tokio::test]
    async fn test_delete_pending_removes_order_and_lines() {
        let db = setup().await;
        seed_customer(&db, "c1", 0).await;
        seed_product(&db, "p1", 1000, 10).await;

        let svc = db.service();
        let view = svc
            .create_order(draft("c1", vec![line("p1", 1, 1000)]))
            .await
            .unwrap();

        svc.delete_order(&view.order.id).await.unwrap();

        assert!(db.orders().get_by_id(&view.order.id).await.unwrap().is_none());
        assert!(db.orders().get_lines(&view.order.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_validation_rejects_bad_drafts() {
        let db = setup().await;
        seed_customer(&db, "c1", 0).await;
        seed_product(&db, "p1", 1000, 10).await;

        let svc = db.service();

        // no lines
        let err = svc.create_order(draft("c1", vec![])).await.unwrap_err();
        assert!(matches!(
            err,
            OrderError::Core(CoreError::Validation(ValidationError::Required { .. }))
        ));

        // cash sale with a due date
        let mut d = draft("c1", vec![line("p1", 1, 1000)]);
        d.due_date = NaiveDate::from_ymd_opt(2026, 5, 1);
        let err = svc.create_order(d).await.unwrap_err();
        assert!(matches!(
            err,
            OrderError::Core(CoreError::Validation(ValidationError::InvalidFormat { .. }))
        ));

        // zero quantity
        let err = svc
            .create_order(draft("c1", vec![line("p1", 0, 1000)]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OrderError::Core(CoreError::Validation(ValidationError::MustBePositive { .. }))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_customer_and_product() {
        let db = setup().await;
        seed_customer(&db, "c1", 0).await;
        seed_product(&db, "p1", 1000, 10).await;

        let svc = db.service();

        let err = svc
            .create_order(draft("ghost", vec![line("p1", 1, 1000)]))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Db(DbError::NotFound { .. })));

        let err = svc
            .create_order(draft("c1", vec![line("ghost", 1, 1000)]))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Db(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_next_order_code_peek() {
        let db = setup().await;
        seed_customer(&db, "c1", 0).await;
        seed_product(&db, "p1", 1000, 10).await;

        let svc = db.service();
        assert_eq!(svc.next_order_code().await.unwrap(), "VEN000001");

        svc.create_order(draft("c1", vec![line("p1", 1, 1000)]))
            .await
            .unwrap();
        assert_eq!(svc.next_order_code().await.unwrap(), "VEN000002");
    }

    #[tokio::test]
    async fn test_code_sequence_survives_pad_overflow() {
        let db = setup().await;
        seed_customer(&db, "c1", 0).await;
        seed_product(&db, "p1", 1000, 10).await;

        // sequence already past the six-digit pad width; the widened code
        // is numerically larger but sorts below the padded one
        seed_order_with_code(&db, "c1", "VEN999999").await;
        seed_order_with_code(&db, "c1", "VEN1000000").await;

        let view = db
            .service()
            .create_order(draft("c1", vec![line("p1", 1, 1000)]))
            .await
            .unwrap();
        assert_eq!(view.order.code, "VEN1000001");
    }

    #[tokio::test]
    async fn test_transition_returns_persisted_timestamps() {
        let db = setup().await;
        seed_customer(&db, "c1", 0).await;
        seed_product(&db, "p1", 1000, 10).await;

        let svc = db.service();
        let view = svc
            .create_order(draft("c1", vec![line("p1", 1, 1000)]))
            .await
            .unwrap();

        let completed = svc.complete_order(&view.order.id).await.unwrap();
        let stored = db.orders().get_by_id(&view.order.id).await.unwrap().unwrap();
        assert_eq!(completed.status, stored.status);
        assert_eq!(completed.updated_at, stored.updated_at);

        let annulled = svc.annul_order(&view.order.id).await.unwrap();
        let stored = db.orders().get_by_id(&view.order.id).await.unwrap().unwrap();
        assert_eq!(annulled.status, stored.status);
        assert_eq!(annulled.updated_at, stored.updated_at);
    }

    #[tokio::test]
    async fn test_interleaved_creates_get_distinct_codes() {
        let db = setup().await;
        seed_customer(&db, "c1", 0).await;
        seed_product(&db, "p1", 1000, 100).await;

        let svc = db.service();
        let (a, b) = tokio::join!(
            svc.create_order(draft("c1", vec![line("p1", 1, 1000)])),
            svc.create_order(draft("c1", vec![line("p1", 1, 1000)])),
        );

        let a = a.unwrap();
        let b = b.unwrap();
        assert_ne!(a.order.code, b.order.code);
    }
}
