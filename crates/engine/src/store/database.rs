use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, SqlErr,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use crate::{
    EngineError, ExpenseHead, ResultEngine, Shift, ShiftStatus, Transaction, Vendor,
    expense_heads, shifts, transactions, vendors,
};

use super::{CatalogFilter, Patch, Record, ShiftFilter, Store, Table, TransactionFilter};

/// [`Store`] backed by a sea-orm connection (SQLite in practice).
#[derive(Clone, Debug)]
pub struct DatabaseStore {
    database: DatabaseConnection,
}

impl DatabaseStore {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.database
    }
}

/// Map a failed insert to the rejection it stands for.
///
/// A duplicate id is `ExistingKey` and a row pointing at a missing shift is
/// `InvalidReference`. Anything else goes through the generic conversion,
/// which only treats connection failures as transient.
fn insert_error(err: DbErr, table: Table, id: Option<Uuid>) -> EngineError {
    let message = err.to_string();
    let unique = matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        || message.contains("UNIQUE constraint failed");
    let dangling = matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
        || message.contains("FOREIGN KEY constraint failed");
    if unique {
        let id = id.map(|id| id.to_string()).unwrap_or_default();
        EngineError::ExistingKey(format!("{}:{id}", table.as_str()))
    } else if dangling {
        EngineError::InvalidReference(format!("{}: {message}", table.as_str()))
    } else {
        EngineError::from(err)
    }
}

impl Store for DatabaseStore {
    async fn insert(&self, record: Record) -> ResultEngine<Record> {
        let db = &self.database;
        let result = match &record {
            Record::Shift(shift) => {
                shifts::Entity::insert(shifts::ActiveModel::try_from(shift)?)
                    .exec_without_returning(db)
                    .await
            }
            Record::Transaction(tx) => {
                transactions::Entity::insert(transactions::ActiveModel::from(tx))
                    .exec_without_returning(db)
                    .await
            }
            Record::Vendor(vendor) => {
                vendors::Entity::insert(vendors::ActiveModel::from(vendor))
                    .exec_without_returning(db)
                    .await
            }
            Record::ExpenseHead(head) => {
                expense_heads::Entity::insert(expense_heads::ActiveModel::from(head))
                    .exec_without_returning(db)
                    .await
            }
        };
        result.map_err(|err| insert_error(err, record.table(), record.id()))?;
        Ok(record)
    }

    async fn update(&self, patch: Patch) -> ResultEngine<()> {
        let db = &self.database;
        match patch {
            Patch::CloseShift { id, close } => {
                // One statement, guarded on status: a concurrent close loses.
                let result = shifts::Entity::update_many()
                    .col_expr(
                        shifts::Column::ExpectedClosing,
                        Expr::value(close.expected_closing.cents()),
                    )
                    .col_expr(
                        shifts::Column::ActualClosing,
                        Expr::value(close.actual_closing.cents()),
                    )
                    .col_expr(shifts::Column::Shortage, Expr::value(close.shortage.cents()))
                    .col_expr(
                        shifts::Column::Status,
                        Expr::value(ShiftStatus::Closed.as_str()),
                    )
                    .filter(shifts::Column::Id.eq(id))
                    .filter(shifts::Column::Status.eq(ShiftStatus::Open.as_str()))
                    .exec(db)
                    .await?;
                if result.rows_affected == 0 {
                    return Err(EngineError::ShiftClosed(format!("shift {id} is not open")));
                }
            }
            Patch::VendorActive { id, active } => {
                let result = vendors::Entity::update_many()
                    .col_expr(vendors::Column::Active, Expr::value(active))
                    .filter(vendors::Column::Id.eq(id))
                    .exec(db)
                    .await?;
                if result.rows_affected == 0 {
                    return Err(EngineError::KeyNotFound(format!("vendor {id}")));
                }
            }
            Patch::VendorName { id, name } => {
                let result = vendors::Entity::update_many()
                    .col_expr(vendors::Column::Name, Expr::value(name))
                    .filter(vendors::Column::Id.eq(id))
                    .exec(db)
                    .await?;
                if result.rows_affected == 0 {
                    return Err(EngineError::KeyNotFound(format!("vendor {id}")));
                }
            }
            Patch::ExpenseHeadActive { id, active } => {
                let result = expense_heads::Entity::update_many()
                    .col_expr(expense_heads::Column::Active, Expr::value(active))
                    .filter(expense_heads::Column::Id.eq(id))
                    .exec(db)
                    .await?;
                if result.rows_affected == 0 {
                    return Err(EngineError::KeyNotFound(format!("expense head {id}")));
                }
            }
        }
        Ok(())
    }

    async fn upsert(&self, record: Record) -> ResultEngine<()> {
        let db = &self.database;
        match &record {
            Record::Shift(shift) => {
                shifts::Entity::insert(shifts::ActiveModel::try_from(shift)?)
                    .on_conflict(
                        OnConflict::column(shifts::Column::Id)
                            .update_columns([
                                shifts::Column::OpeningCash,
                                shifts::Column::ExpectedClosing,
                                shifts::Column::ActualClosing,
                                shifts::Column::Shortage,
                                shifts::Column::Status,
                            ])
                            .to_owned(),
                    )
                    .exec_without_returning(db)
                    .await?;
            }
            Record::Transaction(tx) => {
                // Transactions are immutable: an existing row wins.
                transactions::Entity::insert(transactions::ActiveModel::from(tx))
                    .on_conflict(
                        OnConflict::column(transactions::Column::Id)
                            .do_nothing()
                            .to_owned(),
                    )
                    .exec_without_returning(db)
                    .await?;
            }
            Record::Vendor(vendor) => {
                vendors::Entity::insert(vendors::ActiveModel::from(vendor))
                    .on_conflict(
                        OnConflict::column(vendors::Column::Id)
                            .update_columns([
                                vendors::Column::Name,
                                vendors::Column::OpeningBalance,
                                vendors::Column::Active,
                            ])
                            .to_owned(),
                    )
                    .exec_without_returning(db)
                    .await?;
            }
            Record::ExpenseHead(head) => {
                expense_heads::Entity::insert(expense_heads::ActiveModel::from(head))
                    .on_conflict(
                        OnConflict::column(expense_heads::Column::Id)
                            .update_columns([
                                expense_heads::Column::Name,
                                expense_heads::Column::Active,
                            ])
                            .to_owned(),
                    )
                    .exec_without_returning(db)
                    .await?;
            }
        }
        Ok(())
    }

    async fn delete(&self, table: Table, id: Uuid) -> ResultEngine<()> {
        let db = &self.database;
        match table {
            Table::Shifts => shifts::Entity::delete_by_id(id).exec(db).await?,
            Table::Transactions => transactions::Entity::delete_by_id(id).exec(db).await?,
            Table::Vendors => vendors::Entity::delete_by_id(id).exec(db).await?,
            Table::ExpenseHeads => expense_heads::Entity::delete_by_id(id).exec(db).await?,
        };
        Ok(())
    }

    async fn shifts(&self, filter: &ShiftFilter) -> ResultEngine<Vec<Shift>> {
        let mut query = shifts::Entity::find();
        if let Some(id) = filter.id {
            query = query.filter(shifts::Column::Id.eq(id));
        }
        if let Some(from) = filter.from {
            query = query.filter(shifts::Column::Date.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(shifts::Column::Date.lte(to));
        }
        if let Some(label) = filter.label {
            query = query.filter(shifts::Column::Label.eq(label.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(shifts::Column::Status.eq(status.as_str()));
        }

        let models = query
            .order_by_asc(shifts::Column::Date)
            .order_by_asc(shifts::Column::CreatedAt)
            .all(&self.database)
            .await?;
        let mut shifts = models
            .into_iter()
            .map(Shift::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        // Labels are stored as text, so their day order is restored here.
        shifts.sort_by_key(|shift| (shift.date, shift.label, shift.created_at));
        Ok(shifts)
    }

    async fn transactions(&self, filter: &TransactionFilter) -> ResultEngine<Vec<Transaction>> {
        let mut query = transactions::Entity::find();
        if let Some(shift_ids) = &filter.shift_ids {
            if shift_ids.is_empty() {
                return Ok(Vec::new());
            }
            query = query.filter(transactions::Column::ShiftId.is_in(shift_ids.clone()));
        }
        if let Some(vendor_id) = filter.vendor_id {
            query = query.filter(transactions::Column::VendorId.eq(vendor_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(transactions::Column::CreatedAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(transactions::Column::CreatedAt.lt(to));
        }

        query
            .order_by_asc(transactions::Column::CreatedAt)
            .order_by_asc(transactions::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    async fn vendors(&self, filter: &CatalogFilter) -> ResultEngine<Vec<Vendor>> {
        let mut query = vendors::Entity::find();
        if let Some(id) = filter.id {
            query = query.filter(vendors::Column::Id.eq(id));
        }
        if let Some(active) = filter.active {
            query = query.filter(vendors::Column::Active.eq(active));
        }
        Ok(query
            .order_by_asc(vendors::Column::Name)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Vendor::from)
            .collect())
    }

    async fn expense_heads(&self, filter: &CatalogFilter) -> ResultEngine<Vec<ExpenseHead>> {
        let mut query = expense_heads::Entity::find();
        if let Some(id) = filter.id {
            query = query.filter(expense_heads::Column::Id.eq(id));
        }
        if let Some(active) = filter.active {
            query = query.filter(expense_heads::Column::Active.eq(active));
        }
        Ok(query
            .order_by_asc(expense_heads::Column::Name)
            .all(&self.database)
            .await?
            .into_iter()
            .map(ExpenseHead::from)
            .collect())
    }
}
