//! Reports over the shifts dated within a range.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    ExpenseReport, LedgerLine, ResultEngine, Transaction, ledger,
    store::{CatalogFilter, ShiftFilter, Store},
};

use super::Engine;

impl<S: Store> Engine<S> {
    /// Expenses booked in shifts dated within `[from, to]`, optionally for a
    /// single expense head.
    pub async fn expense_report(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        head_id: Option<Uuid>,
    ) -> ResultEngine<ExpenseReport> {
        let transactions = self.transactions_between(from, to).await?;
        let heads = self.store.expense_heads(&CatalogFilter::default()).await?;
        Ok(ExpenseReport::build(&transactions, &heads, head_id))
    }

    /// Vendor movements booked in shifts dated within `[from, to]`, for one
    /// vendor or all of them. The running balance starts from 0.
    pub async fn vendor_report(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        vendor_id: Option<Uuid>,
    ) -> ResultEngine<Vec<LedgerLine>> {
        if let Some(vendor_id) = vendor_id {
            self.vendor(vendor_id).await?;
        }
        let transactions = self.transactions_between(from, to).await?;
        Ok(ledger::vendor_activity(vendor_id, &transactions))
    }

    pub(super) async fn transactions_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ResultEngine<Vec<Transaction>> {
        let filter = ShiftFilter {
            from: Some(from),
            to: Some(to),
            ..ShiftFilter::default()
        };
        let shifts = self.store.shifts(&filter).await?;
        self.transactions_of(&shifts).await
    }
}
