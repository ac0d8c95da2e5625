//! The module contains the error the engine can throw.
//!
//! Errors fall in two groups:
//!
//! - rejections ([`InvalidAmount`], [`InvalidReference`], [`ShiftClosed`], ...)
//!   which are returned synchronously and never queued;
//! - storage failures. Only [`Unavailable`] (the store could not be reached)
//!   is turned into a queued pending operation by the write paths; a
//!   [`Database`] error means the statement itself failed and is returned.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidReference`]: EngineError::InvalidReference
//!  [`ShiftClosed`]: EngineError::ShiftClosed
//!  [`Unavailable`]: EngineError::Unavailable
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid reference: {0}")]
    InvalidReference(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Shift closed: {0}")]
    ShiftClosed(String),
    #[error("Pending writes: {0}")]
    PendingWrites(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Database(DbErr),
}

impl From<DbErr> for EngineError {
    /// Connection and pool failures become [`EngineError::Unavailable`]; every
    /// other database error is kept as is.
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => Self::Unavailable(err.to_string()),
            err => Self::Database(err),
        }
    }
}

impl EngineError {
    /// Returns `true` when the store could not be reached, so a later retry
    /// may get past the failure.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidReference(a), Self::InvalidReference(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::ShiftClosed(a), Self::ShiftClosed(b)) => a == b,
            (Self::PendingWrites(a), Self::PendingWrites(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Unavailable(a), Self::Unavailable(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
