//! Transaction primitives.
//!
//! A `Transaction` is an immutable cash event recorded against a shift. Each
//! kind carries only the fields that are meaningful for it; the flat storage
//! row is rebuilt into the tagged form on load.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

/// Where the cash for a cost came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundingSource {
    /// Paid out of the till.
    Sales,
    /// Paid by the owner personally.
    Pocket,
    /// Deferred: the store now owes the vendor.
    Credit,
}

impl FundingSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::Pocket => "pocket",
            Self::Credit => "credit",
        }
    }
}

impl TryFrom<&str> for FundingSource {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sales" => Ok(Self::Sales),
            "pocket" => Ok(Self::Pocket),
            "credit" => Ok(Self::Credit),
            other => Err(EngineError::InvalidReference(format!(
                "invalid funding source: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionKind {
    Sale,
    Return {
        vendor_id: Option<Uuid>,
    },
    Expense {
        source: FundingSource,
        expense_head_id: Option<Uuid>,
    },
    VendorPayment {
        source: FundingSource,
        vendor_id: Uuid,
        payment_method: Option<String>,
    },
    Purchase {
        source: FundingSource,
        vendor_id: Uuid,
    },
    Withdrawal,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Return { .. } => "return",
            Self::Expense { .. } => "expense",
            Self::VendorPayment { .. } => "vendor_payment",
            Self::Purchase { .. } => "purchase",
            Self::Withdrawal => "withdrawal",
        }
    }

    /// Funding source, for the kinds that carry one.
    pub fn source(&self) -> Option<FundingSource> {
        match self {
            Self::Expense { source, .. }
            | Self::VendorPayment { source, .. }
            | Self::Purchase { source, .. } => Some(*source),
            Self::Sale | Self::Return { .. } | Self::Withdrawal => None,
        }
    }

    pub fn vendor_id(&self) -> Option<Uuid> {
        match self {
            Self::VendorPayment { vendor_id, .. } | Self::Purchase { vendor_id, .. } => {
                Some(*vendor_id)
            }
            Self::Return { vendor_id } => *vendor_id,
            _ => None,
        }
    }

    pub fn expense_head_id(&self) -> Option<Uuid> {
        match self {
            Self::Expense {
                expense_head_id, ..
            } => *expense_head_id,
            _ => None,
        }
    }

    /// Credit is only a valid source for purchases: an expense or a vendor
    /// payment is cash leaving someone's hands.
    fn validate(&self) -> ResultEngine<()> {
        match self {
            Self::Expense {
                source: FundingSource::Credit,
                ..
            }
            | Self::VendorPayment {
                source: FundingSource::Credit,
                ..
            } => Err(EngineError::InvalidReference(format!(
                "{} cannot be funded on credit",
                self.as_str()
            ))),
            _ => Ok(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Generated client side; doubles as idempotency key when a queued insert
    /// is replayed.
    pub id: Uuid,
    pub shift_id: Uuid,
    pub kind: TransactionKind,
    pub amount: Money,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        shift_id: Uuid,
        kind: TransactionKind,
        amount: Money,
        description: Option<String>,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if amount.is_negative() {
            return Err(EngineError::InvalidAmount(
                "amount must be >= 0".to_string(),
            ));
        }
        kind.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            shift_id,
            kind,
            amount,
            description,
            created_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub shift_id: Uuid,
    pub kind: String,
    pub amount: i64,
    pub source: Option<String>,
    pub vendor_id: Option<Uuid>,
    pub expense_head_id: Option<Uuid>,
    pub payment_method: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shifts::Entity",
        from = "Column::ShiftId",
        to = "super::shifts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Shift,
}

impl Related<super::shifts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shift.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        let payment_method = match &tx.kind {
            TransactionKind::VendorPayment { payment_method, .. } => payment_method.clone(),
            _ => None,
        };
        Self {
            id: ActiveValue::Set(tx.id),
            shift_id: ActiveValue::Set(tx.shift_id),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount: ActiveValue::Set(tx.amount.cents()),
            source: ActiveValue::Set(tx.kind.source().map(|s| s.as_str().to_string())),
            vendor_id: ActiveValue::Set(tx.kind.vendor_id()),
            expense_head_id: ActiveValue::Set(tx.kind.expense_head_id()),
            payment_method: ActiveValue::Set(payment_method),
            description: ActiveValue::Set(tx.description.clone()),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let source = || -> ResultEngine<FundingSource> {
            let raw = model.source.as_deref().ok_or_else(|| {
                EngineError::InvalidReference(format!("{} without funding source", model.kind))
            })?;
            FundingSource::try_from(raw)
        };
        let vendor = || {
            model.vendor_id.ok_or_else(|| {
                EngineError::InvalidReference(format!("{} without vendor", model.kind))
            })
        };

        let kind = match model.kind.as_str() {
            "sale" => TransactionKind::Sale,
            "return" => TransactionKind::Return {
                vendor_id: model.vendor_id,
            },
            "expense" => TransactionKind::Expense {
                source: source()?,
                expense_head_id: model.expense_head_id,
            },
            "vendor_payment" => TransactionKind::VendorPayment {
                source: source()?,
                vendor_id: vendor()?,
                payment_method: model.payment_method.clone(),
            },
            "purchase" => TransactionKind::Purchase {
                source: source()?,
                vendor_id: vendor()?,
            },
            "withdrawal" => TransactionKind::Withdrawal,
            other => {
                return Err(EngineError::InvalidReference(format!(
                    "invalid transaction kind: {other}"
                )));
            }
        };

        Ok(Self {
            id: model.id,
            shift_id: model.shift_id,
            kind,
            amount: Money::new(model.amount),
            description: model.description,
            created_at: model.created_at,
        })
    }
}
