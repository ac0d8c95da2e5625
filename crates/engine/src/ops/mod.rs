use crate::{
    EngineError, PendingOp, PendingQueue, ResultEngine,
    store::{DatabaseStore, Store},
};

mod balances;
mod catalog;
mod reports;
mod shifts;
mod transactions;

pub use shifts::{ShiftReport, ShiftReportRow};

/// How a write ended when it did not fail outright.
///
/// A rejected write is an `Err`; the two success states must stay
/// distinguishable to the operator.
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOutcome<T> {
    /// Durably stored.
    Committed(T),
    /// Held in the pending queue; will be retried on the next interaction.
    Queued(T),
}

impl<T> WriteOutcome<T> {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }

    pub fn is_queued(&self) -> bool {
        matches!(self, Self::Queued(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> WriteOutcome<U> {
        match self {
            Self::Committed(value) => WriteOutcome::Committed(f(value)),
            Self::Queued(value) => WriteOutcome::Queued(f(value)),
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Committed(value) | Self::Queued(value) => value,
        }
    }
}

/// Session context: the injected store plus this session's pending writes.
#[derive(Debug)]
pub struct Engine<S> {
    store: S,
    queue: PendingQueue,
}

impl<S: Store> Engine<S> {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder<S> {
        EngineBuilder { store: None }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Writes waiting for the store, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &PendingOp> {
        self.queue.iter()
    }

    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    /// Drop a pending write by position without applying it.
    pub fn discard_pending(&mut self, index: usize) -> Option<PendingOp> {
        self.queue.discard(index)
    }

    /// Retry every pending write. Returns `true` when nothing is left queued.
    pub async fn flush_pending(&mut self) -> bool {
        self.queue.flush(&self.store).await
    }

    /// Attempt a write, queueing it when the store is unavailable.
    ///
    /// A write goes behind the queue only when a write with the same ordering
    /// key (see [`PendingOp::order_key`]) is still waiting; otherwise it is
    /// tried right away. Rejections from the store are returned as errors.
    async fn submit(&mut self, op: PendingOp) -> ResultEngine<WriteOutcome<()>> {
        self.queue.flush(&self.store).await;
        if self.queue.holds_key_of(&op) {
            self.queue.enqueue(op);
            return Ok(WriteOutcome::Queued(()));
        }
        match op.apply(&self.store).await {
            Ok(()) => Ok(WriteOutcome::Committed(())),
            Err(err) if err.is_transient() => {
                tracing::warn!("store write failed: {err}");
                self.queue.enqueue(op);
                Ok(WriteOutcome::Queued(()))
            }
            Err(err) => Err(err),
        }
    }
}

/// The builder for `Engine`
pub struct EngineBuilder<S> {
    store: Option<S>,
}

impl<S: Store> EngineBuilder<S> {
    /// Pass the store the engine writes to.
    pub fn store(mut self, store: S) -> EngineBuilder<S> {
        self.store = Some(store);
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> ResultEngine<Engine<S>> {
        let store = self
            .store
            .ok_or_else(|| EngineError::KeyNotFound("store".to_string()))?;
        Ok(Engine {
            store,
            queue: PendingQueue::new(),
        })
    }
}

impl EngineBuilder<DatabaseStore> {
    /// Pass the required database
    pub fn database(self, db: sea_orm::DatabaseConnection) -> EngineBuilder<DatabaseStore> {
        self.store(DatabaseStore::new(db))
    }
}
