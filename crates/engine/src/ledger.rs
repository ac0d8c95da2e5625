//! Derived balances.
//!
//! Everything here is a pure function of a transaction list: no I/O, no
//! mutation. Folds always run in `(created_at, id)` order, so the same set of
//! transactions gives the same answer whatever order it was loaded in.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{ExpenseHead, FundingSource, Money, Shift, Transaction, TransactionKind, Vendor};

fn chronological(transactions: &[Transaction]) -> Vec<&Transaction> {
    let mut ordered: Vec<&Transaction> = transactions.iter().collect();
    ordered.sort_by_key(|tx| (tx.created_at, tx.id));
    ordered
}

/// Effect of a transaction on the till.
fn till_change(tx: &Transaction) -> Money {
    match &tx.kind {
        TransactionKind::Sale => tx.amount,
        TransactionKind::Return { .. } | TransactionKind::Withdrawal => -tx.amount,
        TransactionKind::Expense { source, .. }
        | TransactionKind::VendorPayment { source, .. }
        | TransactionKind::Purchase { source, .. } => {
            if *source == FundingSource::Sales {
                -tx.amount
            } else {
                Money::ZERO
            }
        }
    }
}

/// Effect of a transaction on what the store owes a vendor. `None` as
/// `vendor_id` accepts every vendor.
fn vendor_change(tx: &Transaction, vendor_id: Option<Uuid>) -> Option<Money> {
    if vendor_id.is_some_and(|vendor_id| tx.kind.vendor_id() != Some(vendor_id)) {
        return None;
    }
    match &tx.kind {
        TransactionKind::Purchase {
            source: FundingSource::Credit,
            ..
        } => Some(tx.amount),
        TransactionKind::VendorPayment { .. } => Some(-tx.amount),
        TransactionKind::Return { vendor_id: Some(_) } => Some(-tx.amount),
        _ => None,
    }
}

/// Effect of a transaction on the owner's personal ledger.
fn personal_change(tx: &Transaction) -> Option<Money> {
    match tx.kind {
        TransactionKind::Withdrawal => Some(-tx.amount),
        _ if tx.kind.source() == Some(FundingSource::Pocket) => Some(tx.amount),
        _ => None,
    }
}

/// One row of a running-balance statement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LedgerLine {
    pub transaction_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub kind: &'static str,
    pub vendor_id: Option<Uuid>,
    pub description: Option<String>,
    /// Signed change applied by this transaction.
    pub change: Money,
    /// Balance after applying `change`.
    pub balance: Money,
}

fn statement<F>(opening: Money, transactions: &[Transaction], change: F) -> Vec<LedgerLine>
where
    F: Fn(&Transaction) -> Option<Money>,
{
    let mut balance = opening;
    chronological(transactions)
        .into_iter()
        .filter_map(|tx| {
            let delta = change(tx)?;
            balance += delta;
            Some(LedgerLine {
                transaction_id: tx.id,
                created_at: tx.created_at,
                kind: tx.kind.as_str(),
                vendor_id: tx.kind.vendor_id(),
                description: tx.description.clone(),
                change: delta,
                balance,
            })
        })
        .collect()
}

/// Cash that should be in the till at the end of `shift`.
///
/// Only transactions owned by `shift` are counted; a shift that is not stored
/// yet owns none and is expected to hold its opening cash.
pub fn expected_cash(shift: &Shift, transactions: &[Transaction]) -> Money {
    let movement: Money = transactions
        .iter()
        .filter(|tx| shift.id == Some(tx.shift_id))
        .map(till_change)
        .sum();
    shift.opening_cash + movement
}

/// Running balance owed to `vendor` (positive = the store owes the vendor).
pub fn vendor_balance(vendor: &Vendor, transactions: &[Transaction]) -> Money {
    vendor_statement(vendor, transactions)
        .last()
        .map_or(vendor.opening_balance, |line| line.balance)
}

pub fn vendor_statement(vendor: &Vendor, transactions: &[Transaction]) -> Vec<LedgerLine> {
    statement(vendor.opening_balance, transactions, |tx| {
        vendor_change(tx, Some(vendor.id))
    })
}

/// Vendor movements over `transactions`, for one vendor or all of them.
///
/// Unlike [`vendor_statement`], the running balance starts from 0: it shows
/// what the window added to the amounts owed, not the amounts themselves.
pub fn vendor_activity(vendor_id: Option<Uuid>, transactions: &[Transaction]) -> Vec<LedgerLine> {
    statement(Money::ZERO, transactions, |tx| vendor_change(tx, vendor_id))
}

/// Owner's cash currently inside the store: pocket-funded costs minus
/// withdrawals.
pub fn personal_balance(transactions: &[Transaction]) -> Money {
    personal_statement(transactions)
        .last()
        .map_or(Money::ZERO, |line| line.balance)
}

pub fn personal_statement(transactions: &[Transaction]) -> Vec<LedgerLine> {
    statement(Money::ZERO, transactions, personal_change)
}

/// Per-kind cash totals over a set of transactions.
///
/// Costs only count when they were paid from the till (`sales` source);
/// withdrawals always leave the till.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CashSummary {
    pub sales: Money,
    pub returns: Money,
    pub expenses: Money,
    pub vendor_payments: Money,
    pub purchases: Money,
    pub withdrawals: Money,
}

impl CashSummary {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut summary = Self::default();
        for tx in transactions {
            let from_till = tx.kind.source() == Some(FundingSource::Sales);
            match tx.kind {
                TransactionKind::Sale => summary.sales += tx.amount,
                TransactionKind::Return { .. } => summary.returns += tx.amount,
                TransactionKind::Withdrawal => summary.withdrawals += tx.amount,
                TransactionKind::Expense { .. } if from_till => summary.expenses += tx.amount,
                TransactionKind::VendorPayment { .. } if from_till => {
                    summary.vendor_payments += tx.amount;
                }
                TransactionKind::Purchase { .. } if from_till => summary.purchases += tx.amount,
                _ => {}
            }
        }
        summary
    }

    /// Net change of the till.
    pub fn net_cash(&self) -> Money {
        self.sales
            - self.returns
            - self.expenses
            - self.vendor_payments
            - self.purchases
            - self.withdrawals
    }

    pub fn merge(&mut self, other: &CashSummary) {
        self.sales += other.sales;
        self.returns += other.returns;
        self.expenses += other.expenses;
        self.vendor_payments += other.vendor_payments;
        self.purchases += other.purchases;
        self.withdrawals += other.withdrawals;
    }
}

/// One expense, with the name of its head resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExpenseLine {
    pub transaction_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expense_head_id: Option<Uuid>,
    /// `None` when no head was given or the head has since been removed.
    pub head: Option<String>,
    pub source: FundingSource,
    pub description: Option<String>,
    pub amount: Money,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ExpenseReport {
    pub lines: Vec<ExpenseLine>,
    pub total: Money,
}

impl ExpenseReport {
    /// Every expense in `transactions` whatever its funding source,
    /// restricted to `head_id` when given.
    pub fn build(transactions: &[Transaction], heads: &[ExpenseHead], head_id: Option<Uuid>) -> Self {
        let mut report = Self::default();
        for tx in chronological(transactions) {
            let TransactionKind::Expense {
                source,
                expense_head_id,
            } = &tx.kind
            else {
                continue;
            };
            if head_id.is_some_and(|id| *expense_head_id != Some(id)) {
                continue;
            }
            let head = expense_head_id
                .and_then(|id| heads.iter().find(|head| head.id == id))
                .map(|head| head.name.clone());
            report.total += tx.amount;
            report.lines.push(ExpenseLine {
                transaction_id: tx.id,
                created_at: tx.created_at,
                expense_head_id: *expense_head_id,
                head,
                source: *source,
                description: tx.description.clone(),
                amount: tx.amount,
            });
        }
        report
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ProfitAndLoss {
    pub net_sales: Money,
    pub cogs: Money,
    pub gross_profit: Money,
    pub expenses: Money,
    pub net_profit: Money,
}

impl ProfitAndLoss {
    /// `cogs` is supplied by the caller; only till-funded expenses are
    /// deducted.
    pub fn compute(transactions: &[Transaction], cogs: Money) -> Self {
        let summary = CashSummary::from_transactions(transactions);
        let net_sales = summary.sales - summary.returns;
        let gross_profit = net_sales - cogs;
        Self {
            net_sales,
            cogs,
            gross_profit,
            expenses: summary.expenses,
            net_profit: gross_profit - summary.expenses,
        }
    }
}
