use chrono::Utc;
use uuid::Uuid;

use crate::{
    EngineError, PendingOp, RecordCmd, ResultEngine, ShiftStatus, Transaction, TransactionKind,
    store::{Record, Store, TransactionFilter},
    util::normalize_optional_text,
};

use super::{Engine, WriteOutcome};

impl<S: Store> Engine<S> {
    /// Validates and records a transaction.
    ///
    /// Validation failures are returned as errors and never queued. When the
    /// store cannot take the write it is queued and `Queued` is returned with
    /// the transaction as it will be stored.
    pub async fn record_transaction(
        &mut self,
        cmd: RecordCmd,
    ) -> ResultEngine<WriteOutcome<Transaction>> {
        let shift_id = cmd.shift_id.ok_or_else(|| {
            EngineError::InvalidReference(
                "shift is not stored yet; flush pending writes and reload it".to_string(),
            )
        })?;
        if cmd.shift_status != ShiftStatus::Open {
            return Err(EngineError::ShiftClosed(format!(
                "shift {shift_id} is closed"
            )));
        }

        let kind = match cmd.kind {
            TransactionKind::VendorPayment {
                source,
                vendor_id,
                payment_method,
            } => TransactionKind::VendorPayment {
                source,
                vendor_id,
                payment_method: normalize_optional_text(payment_method.as_deref()),
            },
            other => other,
        };
        let tx = Transaction::new(
            shift_id,
            kind,
            cmd.amount,
            normalize_optional_text(cmd.description.as_deref()),
            cmd.created_at.unwrap_or_else(Utc::now),
        )?;

        let outcome = self
            .submit(PendingOp::Insert(Record::Transaction(tx.clone())))
            .await?;
        tracing::debug!(
            id = %tx.id,
            kind = tx.kind.as_str(),
            amount = %tx.amount,
            queued = outcome.is_queued(),
            "transaction recorded"
        );
        Ok(outcome.map(|()| tx))
    }

    /// Stored transactions of a shift, oldest first.
    pub async fn shift_transactions(&self, shift_id: Uuid) -> ResultEngine<Vec<Transaction>> {
        let filter = TransactionFilter {
            shift_ids: Some(vec![shift_id]),
            ..TransactionFilter::default()
        };
        self.store.transactions(&filter).await
    }
}
