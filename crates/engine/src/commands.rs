//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{FundingSource, Money, Shift, ShiftStatus, TransactionKind};

/// Record one transaction against a shift.
///
/// The shift is captured as the caller currently sees it: whether it is open
/// is checked against that view, not re-read from the store.
#[derive(Clone, Debug)]
pub struct RecordCmd {
    pub shift_id: Option<Uuid>,
    pub shift_status: ShiftStatus,
    pub kind: TransactionKind,
    pub amount: Money,
    pub description: Option<String>,
    /// Defaults to the time the command is executed.
    pub created_at: Option<DateTime<Utc>>,
}

impl RecordCmd {
    #[must_use]
    pub fn new(shift: &Shift, kind: TransactionKind, amount: Money) -> Self {
        Self {
            shift_id: shift.id,
            shift_status: shift.status,
            kind,
            amount,
            description: None,
            created_at: None,
        }
    }

    #[must_use]
    pub fn sale(shift: &Shift, amount: Money) -> Self {
        Self::new(shift, TransactionKind::Sale, amount)
    }

    #[must_use]
    pub fn withdrawal(shift: &Shift, amount: Money) -> Self {
        Self::new(shift, TransactionKind::Withdrawal, amount)
    }

    #[must_use]
    pub fn expense(shift: &Shift, source: FundingSource, amount: Money) -> Self {
        Self::new(
            shift,
            TransactionKind::Expense {
                source,
                expense_head_id: None,
            },
            amount,
        )
    }

    #[must_use]
    pub fn purchase(shift: &Shift, vendor_id: Uuid, source: FundingSource, amount: Money) -> Self {
        Self::new(shift, TransactionKind::Purchase { source, vendor_id }, amount)
    }

    #[must_use]
    pub fn vendor_payment(
        shift: &Shift,
        vendor_id: Uuid,
        source: FundingSource,
        amount: Money,
    ) -> Self {
        Self::new(
            shift,
            TransactionKind::VendorPayment {
                source,
                vendor_id,
                payment_method: None,
            },
            amount,
        )
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}
