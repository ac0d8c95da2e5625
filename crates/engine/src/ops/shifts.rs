use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    CashSummary, EngineError, Money, PendingOp, ProfitAndLoss, ResultEngine, Shift, ShiftClose,
    ShiftLabel, ShiftStatus, Transaction, ledger,
    shifts::opening_sources,
    store::{Patch, Record, ShiftFilter, Store, TransactionFilter},
};

use super::{Engine, WriteOutcome};

/// One shift with its per-kind totals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ShiftReportRow {
    pub shift: Shift,
    pub summary: CashSummary,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ShiftReport {
    pub rows: Vec<ShiftReportRow>,
    pub totals: CashSummary,
    /// Sum of the shortages of the closed shifts in the report.
    pub total_shortage: Money,
}

impl<S: Store> Engine<S> {
    /// Returns the open shift for `(date, label)`, opening it if needed.
    ///
    /// A new shift starts with the actual closing cash of the previous slot
    /// when that shift is closed. Evening and night shifts fall back to the
    /// previous day's closed night shift, and start at 0 when neither exists. If the store refuses
    /// the creation the returned shift has no id and its insert is queued.
    pub async fn open_or_get_shift(
        &mut self,
        date: NaiveDate,
        label: ShiftLabel,
    ) -> ResultEngine<Shift> {
        self.flush_pending().await;

        if let Some(shift) = self.find_open_shift(date, label).await? {
            return Ok(shift);
        }
        if let Some(shift) = self.queued_shift(date, label) {
            return Ok(shift);
        }

        let opening_cash = self.carried_opening_cash(date, label).await?;
        let shift = Shift::open(date, label, opening_cash);
        match self
            .submit(PendingOp::Insert(Record::Shift(shift.clone())))
            .await?
        {
            WriteOutcome::Committed(()) => {
                tracing::info!(%date, label = label.as_str(), %opening_cash, "shift opened");
                Ok(shift)
            }
            WriteOutcome::Queued(()) => Ok(Shift { id: None, ..shift }),
        }
    }

    pub async fn find_open_shift(
        &self,
        date: NaiveDate,
        label: ShiftLabel,
    ) -> ResultEngine<Option<Shift>> {
        let filter = ShiftFilter::slot(date, label, ShiftStatus::Open);
        Ok(self.store.shifts(&filter).await?.into_iter().next())
    }

    /// The local view of a shift whose creation is still queued.
    fn queued_shift(&self, date: NaiveDate, label: ShiftLabel) -> Option<Shift> {
        self.queue.iter().find_map(|op| match op {
            PendingOp::Insert(Record::Shift(shift)) if shift.date == date && shift.label == label => {
                Some(Shift {
                    id: None,
                    ..shift.clone()
                })
            }
            _ => None,
        })
    }

    async fn carried_opening_cash(&self, date: NaiveDate, label: ShiftLabel) -> ResultEngine<Money> {
        for (prev_date, prev_label) in opening_sources(date, label) {
            let filter = ShiftFilter::slot(prev_date, prev_label, ShiftStatus::Closed);
            let closed = self.store.shifts(&filter).await?;
            if let Some(cash) = closed.iter().rev().find_map(Shift::actual_closing) {
                return Ok(cash);
            }
        }
        Ok(Money::ZERO)
    }

    /// Reconciles a physical cash count and closes the shift.
    ///
    /// Never queued: the count is only meaningful against the history stored
    /// right now, so any failure is returned to the caller.
    pub async fn close_shift(&mut self, shift_id: Uuid, actual_cash: Money) -> ResultEngine<Shift> {
        if actual_cash.is_negative() {
            return Err(EngineError::InvalidAmount(
                "actual cash must be >= 0".to_string(),
            ));
        }

        self.flush_pending().await;
        if self.queue.has_writes_for_shift(shift_id) {
            return Err(EngineError::PendingWrites(format!(
                "shift {shift_id} has writes waiting for the store"
            )));
        }

        let shift = self
            .store
            .shifts(&ShiftFilter::by_id(shift_id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::KeyNotFound(format!("shift {shift_id}")))?;
        if !shift.is_open() {
            return Err(EngineError::ShiftClosed(format!(
                "shift {shift_id} is already closed"
            )));
        }

        let transactions = self.shift_transactions(shift_id).await?;
        let close = ShiftClose::reconcile(ledger::expected_cash(&shift, &transactions), actual_cash);
        self.store
            .update(Patch::CloseShift {
                id: shift_id,
                close,
            })
            .await?;

        tracing::info!(
            %shift_id,
            expected = %close.expected_closing,
            actual = %close.actual_closing,
            shortage = %close.shortage,
            "shift closed"
        );
        Ok(Shift {
            status: ShiftStatus::Closed,
            close: Some(close),
            ..shift
        })
    }

    /// Expected till cash for `shift` given the history stored now.
    pub async fn compute_expected_cash(&self, shift: &Shift) -> ResultEngine<Money> {
        let transactions = match shift.id {
            Some(id) => self.shift_transactions(id).await?,
            None => Vec::new(),
        };
        Ok(ledger::expected_cash(shift, &transactions))
    }

    /// Per-shift totals for shifts dated within `[from, to]`.
    pub async fn shift_report(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        label: Option<ShiftLabel>,
    ) -> ResultEngine<ShiftReport> {
        let filter = ShiftFilter {
            from: Some(from),
            to: Some(to),
            label,
            ..ShiftFilter::default()
        };
        let shifts = self.store.shifts(&filter).await?;
        let mut by_shift: HashMap<Uuid, Vec<Transaction>> = HashMap::new();
        for tx in self.transactions_of(&shifts).await? {
            by_shift.entry(tx.shift_id).or_default().push(tx);
        }

        let mut report = ShiftReport::default();
        for shift in shifts {
            let owned = shift
                .id
                .and_then(|id| by_shift.remove(&id))
                .unwrap_or_default();
            let summary = CashSummary::from_transactions(&owned);
            report.totals.merge(&summary);
            if let Some(close) = shift.close {
                report.total_shortage += close.shortage;
            }
            report.rows.push(ShiftReportRow { shift, summary });
        }
        Ok(report)
    }

    /// Totals over every shift of `date`.
    pub async fn daily_summary(&self, date: NaiveDate) -> ResultEngine<CashSummary> {
        Ok(self.shift_report(date, date, None).await?.totals)
    }

    /// Actual closing cash of the latest closed slot, 0 if none.
    ///
    /// "Latest" is slot order, `(date, label)`, the same order opening cash
    /// is carried in. A shift closed late for an earlier slot does not
    /// replace the count of a later one.
    pub async fn cash_in_hand(&self) -> ResultEngine<Money> {
        let filter = ShiftFilter {
            status: Some(ShiftStatus::Closed),
            ..ShiftFilter::default()
        };
        Ok(self
            .store
            .shifts(&filter)
            .await?
            .iter()
            .rev()
            .find_map(Shift::actual_closing)
            .unwrap_or(Money::ZERO))
    }

    pub async fn profit_and_loss(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        cogs: Money,
    ) -> ResultEngine<ProfitAndLoss> {
        let transactions = self.transactions_between(from, to).await?;
        Ok(ProfitAndLoss::compute(&transactions, cogs))
    }

    pub(super) async fn transactions_of(&self, shifts: &[Shift]) -> ResultEngine<Vec<Transaction>> {
        let filter = TransactionFilter {
            shift_ids: Some(shifts.iter().filter_map(|shift| shift.id).collect()),
            ..TransactionFilter::default()
        };
        self.store.transactions(&filter).await
    }
}
