//! Expense heads: the categories an expense can be booked under.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ResultEngine, util::normalize_required_name};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseHead {
    pub id: Uuid,
    pub name: String,
    pub active: bool,
}

impl ExpenseHead {
    pub fn new(name: &str) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: normalize_required_name(name, "expense head")?,
            active: true,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_heads")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ExpenseHead> for ActiveModel {
    fn from(head: &ExpenseHead) -> Self {
        Self {
            id: ActiveValue::Set(head.id),
            name: ActiveValue::Set(head.name.clone()),
            active: ActiveValue::Set(head.active),
        }
    }
}

impl From<Model> for ExpenseHead {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            active: model.active,
        }
    }
}
