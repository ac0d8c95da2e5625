#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use engine::{
    DatabaseStore, Engine, EngineError, ExpenseHead, Money, Shift, Transaction, Vendor,
    store::{CatalogFilter, Patch, Record, ShiftFilter, Store, Table, TransactionFilter},
};
use migration::MigratorTrait;

pub async fn database() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

pub async fn engine() -> Engine<FlakyStore> {
    Engine::builder()
        .store(FlakyStore::new(DatabaseStore::new(database().await)))
        .build()
        .unwrap()
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
}

/// Fixed instant on 2026-03-10, `minute` minutes after 09:00 UTC.
pub fn at(minute: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap() + Duration::minutes(minute)
}

pub fn units(value: i64) -> Money {
    Money::units(value)
}

/// Wraps a real store and injects outages on demand.
///
/// - `writes_down`: every write fails before reaching the database;
/// - `reads_down`: every query fails;
/// - `lose_acks`: writes reach the database but report a failure, as when the
///   connection drops after the commit.
pub struct FlakyStore {
    inner: DatabaseStore,
    writes_down: AtomicBool,
    reads_down: AtomicBool,
    lose_acks: AtomicBool,
}

impl FlakyStore {
    pub fn new(inner: DatabaseStore) -> Self {
        Self {
            inner,
            writes_down: AtomicBool::new(false),
            reads_down: AtomicBool::new(false),
            lose_acks: AtomicBool::new(false),
        }
    }

    pub fn inner(&self) -> &DatabaseStore {
        &self.inner
    }

    pub fn set_writes_down(&self, down: bool) {
        self.writes_down.store(down, Ordering::SeqCst);
    }

    pub fn set_reads_down(&self, down: bool) {
        self.reads_down.store(down, Ordering::SeqCst);
    }

    pub fn set_lose_acks(&self, lose: bool) {
        self.lose_acks.store(lose, Ordering::SeqCst);
    }

    pub async fn all_transactions(&self) -> Vec<Transaction> {
        self.inner
            .transactions(&TransactionFilter::default())
            .await
            .unwrap()
    }

    pub async fn all_shifts(&self) -> Vec<Shift> {
        self.inner.shifts(&ShiftFilter::default()).await.unwrap()
    }

    fn before_write(&self) -> Result<(), EngineError> {
        if self.writes_down.load(Ordering::SeqCst) {
            return Err(EngineError::Unavailable("writes down".to_string()));
        }
        Ok(())
    }

    fn after_write<T>(&self, result: Result<T, EngineError>) -> Result<T, EngineError> {
        let value = result?;
        if self.lose_acks.load(Ordering::SeqCst) {
            return Err(EngineError::Unavailable("ack lost".to_string()));
        }
        Ok(value)
    }

    fn before_read(&self) -> Result<(), EngineError> {
        if self.reads_down.load(Ordering::SeqCst) {
            return Err(EngineError::Unavailable("reads down".to_string()));
        }
        Ok(())
    }
}

impl Store for FlakyStore {
    async fn insert(&self, record: Record) -> Result<Record, EngineError> {
        self.before_write()?;
        self.after_write(self.inner.insert(record).await)
    }

    async fn update(&self, patch: Patch) -> Result<(), EngineError> {
        self.before_write()?;
        self.after_write(self.inner.update(patch).await)
    }

    async fn upsert(&self, record: Record) -> Result<(), EngineError> {
        self.before_write()?;
        self.after_write(self.inner.upsert(record).await)
    }

    async fn delete(&self, table: Table, id: Uuid) -> Result<(), EngineError> {
        self.before_write()?;
        self.after_write(self.inner.delete(table, id).await)
    }

    async fn shifts(&self, filter: &ShiftFilter) -> Result<Vec<Shift>, EngineError> {
        self.before_read()?;
        self.inner.shifts(filter).await
    }

    async fn transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, EngineError> {
        self.before_read()?;
        self.inner.transactions(filter).await
    }

    async fn vendors(&self, filter: &CatalogFilter) -> Result<Vec<Vendor>, EngineError> {
        self.before_read()?;
        self.inner.vendors(filter).await
    }

    async fn expense_heads(&self, filter: &CatalogFilter) -> Result<Vec<ExpenseHead>, EngineError> {
        self.before_read()?;
        self.inner.expense_heads(filter).await
    }
}
