//! Shift ledger and cash reconciliation.
//!
//! Staff record sales, returns, expenses, vendor payments, purchases and
//! withdrawals against a work shift; closing a shift reconciles the counted
//! cash against what the recorded history says should be in the till.
//!
//! - [`Engine`] is the session context: it owns the injected [`Store`] and the
//!   [`PendingQueue`] of writes the store could not take yet.
//! - [`ledger`] derives expected cash, vendor balances and the owner's
//!   personal balance by replaying transactions.
//!
//! [`Store`]: store::Store

pub use commands::RecordCmd;
pub use error::EngineError;
pub use expense_heads::ExpenseHead;
pub use ledger::{CashSummary, ExpenseLine, ExpenseReport, LedgerLine, ProfitAndLoss};
pub use money::Money;
pub use ops::{Engine, EngineBuilder, ShiftReport, ShiftReportRow, WriteOutcome};
pub use pending::{PendingOp, PendingQueue};
pub use shifts::{Shift, ShiftClose, ShiftLabel, ShiftStatus, opening_sources, previous_slot};
pub use store::{DatabaseStore, Store};
pub use transactions::{FundingSource, Transaction, TransactionKind};
pub use vendors::Vendor;

mod commands;
mod error;
mod expense_heads;
pub mod ledger;
mod money;
mod ops;
mod pending;
mod shifts;
pub mod store;
mod transactions;
mod util;
mod vendors;

type ResultEngine<T> = Result<T, EngineError>;
