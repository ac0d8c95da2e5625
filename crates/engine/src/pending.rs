//! Writes that could not reach the store yet.
//!
//! Every entry stays queued until a retry commits it or it is discarded by
//! hand: there is no terminal failed state. Replays run in FIFO order, and
//! once a write fails, later writes with the same ordering key (the owning
//! shift, or the vendor or expense head they touch) wait for the next flush.
//! A shift's history is never applied out of order, and a write that keeps
//! failing only holds back writes to the same key.

use std::collections::{HashSet, VecDeque};

use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    store::{Patch, Record, Store, Table},
};

/// A store write held for retry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingOp {
    Insert(Record),
    Update(Patch),
    Upsert(Record),
    Delete { table: Table, id: Uuid },
}

impl PendingOp {
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Insert(_) => "insert",
            Self::Update(_) => "update",
            Self::Upsert(_) => "upsert",
            Self::Delete { .. } => "delete",
        }
    }

    pub fn table(&self) -> Table {
        match self {
            Self::Insert(record) | Self::Upsert(record) => record.table(),
            Self::Update(patch) => patch.table(),
            Self::Delete { table, .. } => *table,
        }
    }

    /// The shift whose history this write belongs to, if any.
    pub fn shift_id(&self) -> Option<Uuid> {
        match self {
            Self::Insert(record) | Self::Upsert(record) => record.shift_id(),
            Self::Update(Patch::CloseShift { id, .. }) => Some(*id),
            Self::Update(_) => None,
            Self::Delete { table, id } => (*table == Table::Shifts).then_some(*id),
        }
    }

    /// Writes sharing a key must reach the store in queue order.
    pub fn order_key(&self) -> Option<Uuid> {
        match self {
            Self::Insert(record) | Self::Upsert(record) => record.shift_id().or(record.id()),
            Self::Update(patch) => Some(patch.id()),
            Self::Delete { id, .. } => Some(*id),
        }
    }

    /// Apply the write to `store`.
    ///
    /// An insert the store already holds counts as committed: ids are
    /// generated before the first attempt, so the row can only be ours.
    pub async fn apply<S: Store>(&self, store: &S) -> ResultEngine<()> {
        match self {
            Self::Insert(record) => match store.insert(record.clone()).await {
                Ok(_) | Err(EngineError::ExistingKey(_)) => Ok(()),
                Err(err) => Err(err),
            },
            Self::Update(patch) => store.update(patch.clone()).await,
            Self::Upsert(record) => store.upsert(record.clone()).await,
            Self::Delete { table, id } => store.delete(*table, *id).await,
        }
    }
}

/// In-memory FIFO of [`PendingOp`]s, owned by one session.
#[derive(Debug, Default)]
pub struct PendingQueue {
    ops: VecDeque<PendingOp>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the tail.
    pub fn enqueue(&mut self, op: PendingOp) {
        tracing::warn!(
            table = op.table().as_str(),
            verb = op.verb(),
            queued = self.ops.len() + 1,
            "store write queued for retry"
        );
        self.ops.push_back(op);
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingOp> {
        self.ops.iter()
    }

    pub fn has_writes_for_shift(&self, shift_id: Uuid) -> bool {
        self.ops.iter().any(|op| op.shift_id() == Some(shift_id))
    }

    /// Whether a write with the same ordering key as `op` is queued.
    pub fn holds_key_of(&self, op: &PendingOp) -> bool {
        op.order_key()
            .is_some_and(|key| self.ops.iter().any(|queued| queued.order_key() == Some(key)))
    }

    /// Drop the entry at `index` without applying it.
    pub fn discard(&mut self, index: usize) -> Option<PendingOp> {
        let op = self.ops.remove(index)?;
        tracing::warn!(
            table = op.table().as_str(),
            verb = op.verb(),
            "pending store write discarded"
        );
        Some(op)
    }

    /// Retry every queued write in order.
    ///
    /// Committed writes are removed; the rest keep their relative order.
    /// Returns `true` when the queue is empty afterwards.
    pub async fn flush<S: Store>(&mut self, store: &S) -> bool {
        if self.ops.is_empty() {
            return true;
        }

        let mut remaining = VecDeque::with_capacity(self.ops.len());
        let mut blocked: HashSet<Uuid> = HashSet::new();
        let mut committed = 0usize;

        while let Some(op) = self.ops.pop_front() {
            let key = op.order_key();
            if key.is_some_and(|key| blocked.contains(&key)) {
                remaining.push_back(op);
                continue;
            }
            match op.apply(store).await {
                Ok(()) => committed += 1,
                Err(err) => {
                    tracing::warn!(
                        table = op.table().as_str(),
                        verb = op.verb(),
                        "pending store write still failing: {err}"
                    );
                    if let Some(key) = key {
                        blocked.insert(key);
                    }
                    remaining.push_back(op);
                }
            }
        }

        self.ops = remaining;
        tracing::info!(
            committed,
            remaining = self.ops.len(),
            "pending queue flushed"
        );
        self.ops.is_empty()
    }
}
