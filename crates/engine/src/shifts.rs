//! Work shifts.
//!
//! A shift is identified by a calendar date and a [`ShiftLabel`]. Labels have a
//! fixed order inside a day, and the last label of a day precedes the first
//! label of the next one: this chain drives the opening-cash carry-forward.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftLabel {
    Morning,
    Evening,
    Night,
}

impl ShiftLabel {
    /// All labels in chronological order within a day.
    pub const ORDER: [ShiftLabel; 3] = [Self::Morning, Self::Evening, Self::Night];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Evening => "evening",
            Self::Night => "night",
        }
    }

    #[must_use]
    pub fn first() -> Self {
        Self::ORDER[0]
    }

    #[must_use]
    pub fn last() -> Self {
        Self::ORDER[Self::ORDER.len() - 1]
    }

    /// The label before this one on the same day, if any.
    #[must_use]
    pub fn previous(self) -> Option<Self> {
        let idx = Self::ORDER.iter().position(|label| *label == self)?;
        idx.checked_sub(1).map(|prev| Self::ORDER[prev])
    }
}

impl TryFrom<&str> for ShiftLabel {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "morning" => Ok(Self::Morning),
            "evening" => Ok(Self::Evening),
            "night" => Ok(Self::Night),
            other => Err(EngineError::InvalidReference(format!(
                "invalid shift label: {other}"
            ))),
        }
    }
}

/// Returns the slot chronologically before `(date, label)`.
///
/// The first label of a day is preceded by the last label of the previous
/// calendar day.
#[must_use]
pub fn previous_slot(date: NaiveDate, label: ShiftLabel) -> Option<(NaiveDate, ShiftLabel)> {
    match label.previous() {
        Some(prev) => Some((date, prev)),
        None => date.pred_opt().map(|day| (day, ShiftLabel::last())),
    }
}

/// Slots whose closed shift can hand its cash to a new `(date, label)`
/// shift, in the order they are tried.
///
/// The previous slot comes first. A later label of the day then falls back
/// to the last label of the previous day, so a skipped earlier slot does not
/// drop the cash carried over night.
#[must_use]
pub fn opening_sources(date: NaiveDate, label: ShiftLabel) -> Vec<(NaiveDate, ShiftLabel)> {
    let mut sources: Vec<_> = previous_slot(date, label).into_iter().collect();
    if label.previous().is_some() {
        sources.extend(date.pred_opt().map(|day| (day, ShiftLabel::last())));
    }
    sources
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    Open,
    Closed,
}

impl ShiftStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl TryFrom<&str> for ShiftStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            other => Err(EngineError::InvalidReference(format!(
                "invalid shift status: {other}"
            ))),
        }
    }
}

/// Figures persisted together when a shift is closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftClose {
    pub expected_closing: Money,
    pub actual_closing: Money,
    pub shortage: Money,
}

impl ShiftClose {
    /// Reconciles a physical cash count against the expected till amount.
    #[must_use]
    pub fn reconcile(expected_closing: Money, actual_closing: Money) -> Self {
        Self {
            expected_closing,
            actual_closing,
            shortage: actual_closing - expected_closing,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    /// `None` for a shift synthesized locally while its creation is queued.
    pub id: Option<Uuid>,
    pub date: NaiveDate,
    pub label: ShiftLabel,
    pub opening_cash: Money,
    pub status: ShiftStatus,
    pub close: Option<ShiftClose>,
    pub created_at: DateTime<Utc>,
}

impl Shift {
    #[must_use]
    pub fn open(date: NaiveDate, label: ShiftLabel, opening_cash: Money) -> Self {
        Self {
            id: Some(Uuid::new_v4()),
            date,
            label,
            opening_cash,
            status: ShiftStatus::Open,
            close: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == ShiftStatus::Open
    }

    /// Returns `true` while the shift only exists locally.
    pub fn is_pending(&self) -> bool {
        self.id.is_none()
    }

    pub fn actual_closing(&self) -> Option<Money> {
        self.close.map(|close| close.actual_closing)
    }

    pub fn require_id(&self) -> ResultEngine<Uuid> {
        self.id.ok_or_else(|| {
            EngineError::InvalidReference(format!(
                "{} {} shift is not stored yet",
                self.date,
                self.label.as_str()
            ))
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "shifts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub date: Date,
    pub label: String,
    pub opening_cash: i64,
    pub expected_closing: Option<i64>,
    pub actual_closing: Option<i64>,
    pub shortage: Option<i64>,
    pub status: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Shift> for ActiveModel {
    type Error = EngineError;

    fn try_from(shift: &Shift) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActiveValue::Set(shift.require_id()?),
            date: ActiveValue::Set(shift.date),
            label: ActiveValue::Set(shift.label.as_str().to_string()),
            opening_cash: ActiveValue::Set(shift.opening_cash.cents()),
            expected_closing: ActiveValue::Set(shift.close.map(|c| c.expected_closing.cents())),
            actual_closing: ActiveValue::Set(shift.close.map(|c| c.actual_closing.cents())),
            shortage: ActiveValue::Set(shift.close.map(|c| c.shortage.cents())),
            status: ActiveValue::Set(shift.status.as_str().to_string()),
            created_at: ActiveValue::Set(shift.created_at),
        })
    }
}

impl TryFrom<Model> for Shift {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let close = match (model.expected_closing, model.actual_closing, model.shortage) {
            (Some(expected), Some(actual), Some(shortage)) => Some(ShiftClose {
                expected_closing: Money::new(expected),
                actual_closing: Money::new(actual),
                shortage: Money::new(shortage),
            }),
            _ => None,
        };
        Ok(Self {
            id: Some(model.id),
            date: model.date,
            label: ShiftLabel::try_from(model.label.as_str())?,
            opening_cash: Money::new(model.opening_cash),
            status: ShiftStatus::try_from(model.status.as_str())?,
            close,
            created_at: model.created_at,
        })
    }
}
