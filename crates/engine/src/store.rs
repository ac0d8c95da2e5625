//! The durable store the engine writes to.
//!
//! The engine never talks to a database directly: it goes through [`Store`],
//! whose calls may fail transiently at any time. [`DatabaseStore`] binds the
//! capability to a sea-orm connection.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    ExpenseHead, ResultEngine, Shift, ShiftClose, ShiftLabel, ShiftStatus, Transaction, Vendor,
};

pub use database::DatabaseStore;

mod database;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Table {
    Shifts,
    Transactions,
    Vendors,
    ExpenseHeads,
}

impl Table {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shifts => "shifts",
            Self::Transactions => "transactions",
            Self::Vendors => "vendors",
            Self::ExpenseHeads => "expense_heads",
        }
    }
}

/// A full row, as handed to `insert` and `upsert`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Record {
    Shift(Shift),
    Transaction(Transaction),
    Vendor(Vendor),
    ExpenseHead(ExpenseHead),
}

impl Record {
    pub fn table(&self) -> Table {
        match self {
            Self::Shift(_) => Table::Shifts,
            Self::Transaction(_) => Table::Transactions,
            Self::Vendor(_) => Table::Vendors,
            Self::ExpenseHead(_) => Table::ExpenseHeads,
        }
    }

    pub fn id(&self) -> Option<Uuid> {
        match self {
            Self::Shift(shift) => shift.id,
            Self::Transaction(tx) => Some(tx.id),
            Self::Vendor(vendor) => Some(vendor.id),
            Self::ExpenseHead(head) => Some(head.id),
        }
    }

    /// The shift this row belongs to, used to keep per-shift replay order.
    pub fn shift_id(&self) -> Option<Uuid> {
        match self {
            Self::Shift(shift) => shift.id,
            Self::Transaction(tx) => Some(tx.shift_id),
            Self::Vendor(_) | Self::ExpenseHead(_) => None,
        }
    }
}

/// A partial update addressed by id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Patch {
    /// Applied as one unit together with the `open -> closed` transition, and
    /// only if the shift is still open.
    CloseShift { id: Uuid, close: ShiftClose },
    VendorActive { id: Uuid, active: bool },
    VendorName { id: Uuid, name: String },
    ExpenseHeadActive { id: Uuid, active: bool },
}

impl Patch {
    pub fn table(&self) -> Table {
        match self {
            Self::CloseShift { .. } => Table::Shifts,
            Self::VendorActive { .. } | Self::VendorName { .. } => Table::Vendors,
            Self::ExpenseHeadActive { .. } => Table::ExpenseHeads,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Self::CloseShift { id, .. }
            | Self::VendorActive { id, .. }
            | Self::VendorName { id, .. }
            | Self::ExpenseHeadActive { id, .. } => *id,
        }
    }
}

/// Filters for listing shifts. Unset fields do not restrict the result.
///
/// `from` and `to` are both inclusive.
#[derive(Clone, Debug, Default)]
pub struct ShiftFilter {
    pub id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub label: Option<ShiftLabel>,
    pub status: Option<ShiftStatus>,
}

impl ShiftFilter {
    #[must_use]
    pub fn by_id(id: Uuid) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn slot(date: NaiveDate, label: ShiftLabel, status: ShiftStatus) -> Self {
        Self {
            from: Some(date),
            to: Some(date),
            label: Some(label),
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Filters for listing transactions.
///
/// `from` is inclusive and `to` is exclusive (`[from, to)`), both in UTC.
#[derive(Clone, Debug, Default)]
pub struct TransactionFilter {
    /// If present, acts as an allow-list of owning shifts.
    pub shift_ids: Option<Vec<Uuid>>,
    pub vendor_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Filters for listing vendors or expense heads.
#[derive(Clone, Debug, Default)]
pub struct CatalogFilter {
    pub id: Option<Uuid>,
    pub active: Option<bool>,
}

impl CatalogFilter {
    #[must_use]
    pub fn by_id(id: Uuid) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// `true` keeps only active rows, `false` keeps every row.
    #[must_use]
    pub fn active_only(active_only: bool) -> Self {
        Self {
            active: active_only.then_some(true),
            ..Self::default()
        }
    }
}

/// Storage capability consumed by the engine.
///
/// Contract expected from implementations:
///
/// - `insert` fails with [`EngineError::ExistingKey`] when the id is already
///   stored, so a replayed insert can be recognised as already committed;
/// - `update`, `upsert` and `delete` are idempotent by id;
/// - `transactions` returns rows ordered by `(created_at, id)` ascending.
///
/// [`EngineError::ExistingKey`]: crate::EngineError::ExistingKey
pub trait Store: Send + Sync {
    fn insert(&self, record: Record) -> impl Future<Output = ResultEngine<Record>> + Send;

    fn update(&self, patch: Patch) -> impl Future<Output = ResultEngine<()>> + Send;

    fn upsert(&self, record: Record) -> impl Future<Output = ResultEngine<()>> + Send;

    fn delete(&self, table: Table, id: Uuid) -> impl Future<Output = ResultEngine<()>> + Send;

    fn shifts(&self, filter: &ShiftFilter)
    -> impl Future<Output = ResultEngine<Vec<Shift>>> + Send;

    fn transactions(
        &self,
        filter: &TransactionFilter,
    ) -> impl Future<Output = ResultEngine<Vec<Transaction>>> + Send;

    /// Vendors ordered by name.
    fn vendors(
        &self,
        filter: &CatalogFilter,
    ) -> impl Future<Output = ResultEngine<Vec<Vendor>>> + Send;

    /// Expense heads ordered by name.
    fn expense_heads(
        &self,
        filter: &CatalogFilter,
    ) -> impl Future<Output = ResultEngine<Vec<ExpenseHead>>> + Send;
}
