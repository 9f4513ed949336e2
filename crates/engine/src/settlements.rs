//! Directed payment obligations produced by a settlement run.
//!
//! Settlement rows are only ever created in batches by the committer, as a
//! side effect of closing out a batch of expenses. Amount and direction are
//! immutable afterwards; either party to the payment may flip `completed`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, planner::PlannedPayment};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Settlement {
    pub fn from_payment(payment: &PlannedPayment, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            from_user_id: payment.from,
            to_user_id: payment.to,
            amount: payment.amount,
            created_at,
            completed: false,
            completed_at: None,
        }
    }

    /// Returns `true` when `user_id` is the debtor or the creditor.
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.from_user_id == user_id || self.to_user_id == user_id
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "settlements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub from_user_id: String,
    pub to_user_id: String,
    pub amount: f64,
    pub created_at: DateTimeUtc,
    pub completed: bool,
    pub completed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Settlement> for ActiveModel {
    fn from(settlement: &Settlement) -> Self {
        Self {
            id: ActiveValue::Set(settlement.id.to_string()),
            from_user_id: ActiveValue::Set(settlement.from_user_id.to_string()),
            to_user_id: ActiveValue::Set(settlement.to_user_id.to_string()),
            amount: ActiveValue::Set(settlement.amount),
            created_at: ActiveValue::Set(settlement.created_at),
            completed: ActiveValue::Set(settlement.completed),
            completed_at: ActiveValue::Set(settlement.completed_at),
        }
    }
}

impl TryFrom<Model> for Settlement {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("settlement not exists".to_string()))?,
            from_user_id: Uuid::parse_str(&model.from_user_id)
                .map_err(|_| EngineError::KeyNotFound("user not exists".to_string()))?,
            to_user_id: Uuid::parse_str(&model.to_user_id)
                .map_err(|_| EngineError::KeyNotFound("user not exists".to_string()))?,
            amount: model.amount,
            created_at: model.created_at,
            completed: model.completed,
            completed_at: model.completed_at,
        })
    }
}
