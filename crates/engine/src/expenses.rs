//! Expense primitives.
//!
//! An `Expense` is a shared purchase paid by one user and owed, in parts, by
//! a set of users via its `ExpenseSplit`s. The split amounts sum to the
//! expense amount up to division rounding. Once settled an expense is
//! immutable; until then only its payer may edit or delete it.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, expense_splits::ExpenseSplit};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub amount: f64,
    pub description: String,
    pub payer_id: Uuid,
    pub settled: bool,
    pub created_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
    pub splits: Vec<ExpenseSplit>,
}

impl Expense {
    pub fn new(
        amount: f64,
        description: String,
        payer_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> Result<Self, EngineError> {
        if amount <= 0.0 {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }
        if description.trim().is_empty() {
            return Err(EngineError::InvalidAmount(
                "description must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            amount,
            description,
            payer_id,
            settled: false,
            created_at,
            settled_at: None,
            splits: Vec::new(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub amount: f64,
    pub description: String,
    pub payer_id: String,
    pub settled: bool,
    pub created_at: DateTimeUtc,
    pub settled_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::expense_splits::Entity")]
    ExpenseSplits,
}

impl Related<super::expense_splits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseSplits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            amount: ActiveValue::Set(expense.amount),
            description: ActiveValue::Set(expense.description.clone()),
            payer_id: ActiveValue::Set(expense.payer_id.to_string()),
            settled: ActiveValue::Set(expense.settled),
            created_at: ActiveValue::Set(expense.created_at),
            settled_at: ActiveValue::Set(expense.settled_at),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("expense not exists".to_string()))?,
            amount: model.amount,
            description: model.description,
            payer_id: Uuid::parse_str(&model.payer_id)
                .map_err(|_| EngineError::KeyNotFound("user not exists".to_string()))?,
            settled: model.settled,
            created_at: model.created_at,
            settled_at: model.settled_at,
            splits: Vec::new(),
        })
    }
}
