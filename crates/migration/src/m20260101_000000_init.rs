//! Initial schema.
//!
//! - `shifts`: one row per opened shift, closed in place
//! - `transactions`: append-only cash movements, owned by a shift
//! - `vendors`: suppliers with their opening balance
//! - `expense_heads`: expense categories
//!
//! Vendor and expense head references on `transactions` are deliberately not
//! foreign keys: heads can be deleted while expenses still point at them.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Shifts {
    Table,
    Id,
    Date,
    Label,
    OpeningCash,
    ExpectedClosing,
    ActualClosing,
    Shortage,
    Status,
    CreatedAt,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    ShiftId,
    Kind,
    Amount,
    Source,
    VendorId,
    ExpenseHeadId,
    PaymentMethod,
    Description,
    CreatedAt,
}

#[derive(Iden)]
enum Vendors {
    Table,
    Id,
    Name,
    OpeningBalance,
    Active,
}

#[derive(Iden)]
enum ExpenseHeads {
    Table,
    Id,
    Name,
    Active,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Shifts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Shifts::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Shifts::Date).date().not_null())
                    .col(ColumnDef::new(Shifts::Label).string().not_null())
                    .col(ColumnDef::new(Shifts::OpeningCash).big_integer().not_null())
                    .col(ColumnDef::new(Shifts::ExpectedClosing).big_integer())
                    .col(ColumnDef::new(Shifts::ActualClosing).big_integer())
                    .col(ColumnDef::new(Shifts::Shortage).big_integer())
                    .col(
                        ColumnDef::new(Shifts::Status)
                            .string()
                            .not_null()
                            .default("open"),
                    )
                    .col(ColumnDef::new(Shifts::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-shifts-date-label-status")
                    .table(Shifts::Table)
                    .col(Shifts::Date)
                    .col(Shifts::Label)
                    .col(Shifts::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::ShiftId).blob().not_null())
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(ColumnDef::new(Transactions::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Transactions::Source).string())
                    .col(ColumnDef::new(Transactions::VendorId).blob())
                    .col(ColumnDef::new(Transactions::ExpenseHeadId).blob())
                    .col(ColumnDef::new(Transactions::PaymentMethod).string())
                    .col(ColumnDef::new(Transactions::Description).string())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-shift_id")
                            .from(Transactions::Table, Transactions::ShiftId)
                            .to(Shifts::Table, Shifts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-shift_id-created_at")
                    .table(Transactions::Table)
                    .col(Transactions::ShiftId)
                    .col(Transactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-vendor_id")
                    .table(Transactions::Table)
                    .col(Transactions::VendorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Vendors::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Vendors::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Vendors::Name).string().not_null())
                    .col(
                        ColumnDef::new(Vendors::OpeningBalance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Vendors::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ExpenseHeads::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseHeads::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExpenseHeads::Name).string().not_null())
                    .col(
                        ColumnDef::new(ExpenseHeads::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExpenseHeads::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Vendors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Shifts::Table).to_owned())
            .await?;
        Ok(())
    }
}
