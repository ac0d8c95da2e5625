use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    EngineError, LedgerLine, Money, ResultEngine, Transaction, Vendor, ledger,
    store::{Store, TransactionFilter},
};

use super::Engine;

impl<S: Store> Engine<S> {
    /// Balance owed to a vendor, replayed from its full history.
    pub async fn vendor_balance(&self, vendor_id: Uuid) -> ResultEngine<Money> {
        let (vendor, transactions) = self.vendor_history(vendor_id).await?;
        Ok(ledger::vendor_balance(&vendor, &transactions))
    }

    pub async fn vendor_statement(&self, vendor_id: Uuid) -> ResultEngine<Vec<LedgerLine>> {
        let (vendor, transactions) = self.vendor_history(vendor_id).await?;
        Ok(ledger::vendor_statement(&vendor, &transactions))
    }

    /// Owner's personal balance over the whole recorded history.
    pub async fn personal_balance(&self) -> ResultEngine<Money> {
        let transactions = self
            .store
            .transactions(&TransactionFilter::default())
            .await?;
        Ok(ledger::personal_balance(&transactions))
    }

    /// Personal ledger lines for transactions created in `[from, to)`.
    ///
    /// The running balance starts from 0 at `from`.
    pub async fn personal_statement(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> ResultEngine<Vec<LedgerLine>> {
        if let (Some(from), Some(to)) = (from, to)
            && from >= to
        {
            return Err(EngineError::InvalidReference(
                "invalid range: from must be < to".to_string(),
            ));
        }
        let filter = TransactionFilter {
            from,
            to,
            ..TransactionFilter::default()
        };
        let transactions = self.store.transactions(&filter).await?;
        Ok(ledger::personal_statement(&transactions))
    }

    async fn vendor_history(&self, vendor_id: Uuid) -> ResultEngine<(Vendor, Vec<Transaction>)> {
        let vendor = self.vendor(vendor_id).await?;
        let filter = TransactionFilter {
            vendor_id: Some(vendor_id),
            ..TransactionFilter::default()
        };
        let transactions = self.store.transactions(&filter).await?;
        Ok((vendor, transactions))
    }
}
