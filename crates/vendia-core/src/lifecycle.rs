//! # Order State Machine
//!
//! Transition preconditions for the order lifecycle.
//!
//! ```text
//! Pending ──complete()──► Completed ──annul()──► Annulled
//!    │                                              ▲
//!    └──────────────────annul()─────────────────────┘
//! ```
//!
//! These checks run before any mutation; the db layer calls them at the top
//! of its transactions so a precondition failure aborts with the store
//! untouched.

use crate::error::{CoreError, CoreResult};
use crate::types::{Order, OrderStatus};

impl Order {
    /// Completion is only reachable from Pending.
    pub fn ensure_can_complete(&self) -> CoreResult<()> {
        if self.status != OrderStatus::Pending {
            return Err(CoreError::InvalidStateTransition {
                code: self.code.clone(),
                status: self.status,
            });
        }
        Ok(())
    }

    /// Annulment is allowed from Pending or Completed; Annulled is terminal.
    pub fn ensure_can_annul(&self) -> CoreResult<()> {
        if self.status == OrderStatus::Annulled {
            return Err(CoreError::AlreadyAnnulled {
                code: self.code.clone(),
            });
        }
        Ok(())
    }

    /// Update and physical delete require a Pending order.
    pub fn ensure_editable(&self) -> CoreResult<()> {
        if !self.is_editable() {
            return Err(CoreError::NotEditable {
                code: self.code.clone(),
                status: self.status,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DocumentKind, SaleKind};
    use chrono::{NaiveDate, Utc};

    fn order(status: OrderStatus) -> Order {
        let now = Utc::now();
        Order {
            id: "o1".into(),
            code: "VEN000009".into(),
            customer_id: "c1".into(),
            doc_kind: DocumentKind::Invoice,
            doc_number: "001-0009".into(),
            issue_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            due_date: None,
            sale_kind: SaleKind::Cash,
            discount_rate_bps: 0,
            discount_cents: 0,
            tax_rate_bps: 0,
            tax_cents: 0,
            subtotal_cents: 0,
            total_cents: 0,
            status,
            notes: None,
            created_by: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_complete_requires_pending() {
        assert!(order(OrderStatus::Pending).ensure_can_complete().is_ok());

        let err = order(OrderStatus::Completed)
            .ensure_can_complete()
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidStateTransition { .. }));

        let err = order(OrderStatus::Annulled)
            .ensure_can_complete()
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidStateTransition { .. }));
    }

    #[test]
    fn test_annul_rejects_only_annulled() {
        assert!(order(OrderStatus::Pending).ensure_can_annul().is_ok());
        assert!(order(OrderStatus::Completed).ensure_can_annul().is_ok());

        let err = order(OrderStatus::Annulled).ensure_can_annul().unwrap_err();
        assert!(matches!(err, CoreError::AlreadyAnnulled { .. }));
    }

    #[test]
    fn test_editable_only_when_pending() {
        assert!(order(OrderStatus::Pending).ensure_editable().is_ok());

        for status in [OrderStatus::Completed, OrderStatus::Annulled] {
            let err = order(status).ensure_editable().unwrap_err();
            assert!(matches!(err, CoreError::NotEditable { .. }));
        }
    }
}
