//! Vendor registry.
//!
//! The stored row only holds the opening balance; the running balance is
//! always derived from transaction history (see [`crate::ledger`]).

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Money, ResultEngine, util::normalize_required_name};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: Uuid,
    pub name: String,
    /// Balance owed to the vendor before any recorded transaction.
    pub opening_balance: Money,
    pub active: bool,
}

impl Vendor {
    pub fn new(name: &str, opening_balance: Money) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: normalize_required_name(name, "vendor")?,
            opening_balance,
            active: true,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "vendors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub opening_balance: i64,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Vendor> for ActiveModel {
    fn from(vendor: &Vendor) -> Self {
        Self {
            id: ActiveValue::Set(vendor.id),
            name: ActiveValue::Set(vendor.name.clone()),
            opening_balance: ActiveValue::Set(vendor.opening_balance.cents()),
            active: ActiveValue::Set(vendor.active),
        }
    }
}

impl From<Model> for Vendor {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            opening_balance: Money::new(model.opening_balance),
            active: model.active,
        }
    }
}
