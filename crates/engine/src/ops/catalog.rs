//! Vendors and expense heads.
//!
//! Administrative writes go through the same queue as transactions. Records
//! are created with `upsert` so a replay after an outage cannot duplicate
//! them.

use uuid::Uuid;

use crate::{
    EngineError, ExpenseHead, Money, PendingOp, ResultEngine, Vendor,
    store::{CatalogFilter, Patch, Record, Store, Table},
    util::normalize_required_name,
};

use super::{Engine, WriteOutcome};

impl<S: Store> Engine<S> {
    pub async fn add_vendor(
        &mut self,
        name: &str,
        opening_balance: Money,
    ) -> ResultEngine<WriteOutcome<Vendor>> {
        let vendor = Vendor::new(name, opening_balance)?;
        let outcome = self
            .submit(PendingOp::Upsert(Record::Vendor(vendor.clone())))
            .await?;
        Ok(outcome.map(|()| vendor))
    }

    pub async fn set_vendor_active(
        &mut self,
        vendor_id: Uuid,
        active: bool,
    ) -> ResultEngine<WriteOutcome<()>> {
        self.submit(PendingOp::Update(Patch::VendorActive {
            id: vendor_id,
            active,
        }))
        .await
    }

    /// Renames a vendor, keeping its balance and history.
    pub async fn rename_vendor(
        &mut self,
        vendor_id: Uuid,
        name: &str,
    ) -> ResultEngine<WriteOutcome<()>> {
        let name = normalize_required_name(name, "vendor")?;
        self.submit(PendingOp::Update(Patch::VendorName {
            id: vendor_id,
            name,
        }))
        .await
    }

    /// Deletes a vendor. Transactions booked against it keep the stale
    /// reference; prefer deactivating a vendor that still has history.
    pub async fn remove_vendor(&mut self, vendor_id: Uuid) -> ResultEngine<WriteOutcome<()>> {
        self.submit(PendingOp::Delete {
            table: Table::Vendors,
            id: vendor_id,
        })
        .await
    }

    pub async fn vendor(&self, vendor_id: Uuid) -> ResultEngine<Vendor> {
        self.store
            .vendors(&CatalogFilter::by_id(vendor_id))
            .await?
            .into_iter()
            .find(|vendor| vendor.id == vendor_id)
            .ok_or_else(|| EngineError::KeyNotFound(format!("vendor {vendor_id}")))
    }

    /// Vendors sorted by name; `active_only` hides deactivated ones.
    pub async fn vendors(&self, active_only: bool) -> ResultEngine<Vec<Vendor>> {
        self.store.vendors(&CatalogFilter::active_only(active_only)).await
    }

    pub async fn add_expense_head(&mut self, name: &str) -> ResultEngine<WriteOutcome<ExpenseHead>> {
        let head = ExpenseHead::new(name)?;
        let outcome = self
            .submit(PendingOp::Upsert(Record::ExpenseHead(head.clone())))
            .await?;
        Ok(outcome.map(|()| head))
    }

    pub async fn set_expense_head_active(
        &mut self,
        head_id: Uuid,
        active: bool,
    ) -> ResultEngine<WriteOutcome<()>> {
        self.submit(PendingOp::Update(Patch::ExpenseHeadActive {
            id: head_id,
            active,
        }))
        .await
    }

    /// Deletes an expense head. Expenses already booked under it keep the
    /// stale reference.
    pub async fn remove_expense_head(&mut self, head_id: Uuid) -> ResultEngine<WriteOutcome<()>> {
        self.submit(PendingOp::Delete {
            table: Table::ExpenseHeads,
            id: head_id,
        })
        .await
    }

    pub async fn expense_heads(&self, active_only: bool) -> ResultEngine<Vec<ExpenseHead>> {
        self.store
            .expense_heads(&CatalogFilter::active_only(active_only))
            .await
    }
}

