//! Dashboard reads and the settlement run.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Engine, EngineError, ResultEngine,
    balance::{DashboardBalances, compute_dashboard},
    expenses,
    planner::{PlannedPayment, SettlementPlan, plan_settlement},
    settlements::{self, Settlement},
};

/// Result of one settlement run.
#[derive(Clone, Debug, PartialEq)]
pub enum SettleOutcome {
    /// There were no unsettled expenses to begin with.
    NothingToSettle,
    /// The snapshot was closed. `payments` can legitimately be empty when
    /// all balances already net to zero.
    Settled {
        payments: Vec<PlannedPayment>,
        expenses_settled: usize,
    },
}

impl Engine {
    /// Gross and net balances for one user over the unsettled snapshot.
    ///
    /// A missing user is an error, never an empty dashboard.
    pub async fn dashboard(&self, user_id: Uuid) -> ResultEngine<DashboardBalances> {
        self.user_by_id(user_id).await?;
        let snapshot = self.list_unsettled_expenses().await?;
        Ok(compute_dashboard(user_id, &snapshot))
    }

    /// Plans and commits a settlement of everything currently unsettled.
    ///
    /// Concurrent runs serialize on the store; a second run recomputes
    /// against whatever is still unsettled.
    pub async fn settle(&self, now: DateTime<Utc>) -> ResultEngine<SettleOutcome> {
        let snapshot = self.list_unsettled_expenses().await?;
        let Some(plan) = plan_settlement(&snapshot) else {
            return Ok(SettleOutcome::NothingToSettle);
        };

        self.apply_settlement(&plan, now).await?;

        Ok(SettleOutcome::Settled {
            payments: plan.payments,
            expenses_settled: plan.expense_ids.len(),
        })
    }

    /// Persists a plan: one settlement row per payment, then every covered
    /// expense flipped to settled.
    ///
    /// Both writes happen in one store transaction: a failure between them
    /// leaves the ledger untouched, so the caller can simply retry. The
    /// plan must come from the same unsettled snapshot in the same pass.
    pub async fn apply_settlement(
        &self,
        plan: &SettlementPlan,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        let db_tx = self.database.begin().await?;
        for payment in &plan.payments {
            settlements::ActiveModel::from(&Settlement::from_payment(payment, now))
                .insert(&db_tx)
                .await?;
        }
        expenses::Entity::update_many()
            .col_expr(expenses::Column::Settled, Expr::value(true))
            .col_expr(expenses::Column::SettledAt, Expr::value(Some(now)))
            .filter(expenses::Column::Id.is_in(plan.expense_ids.iter().map(ToString::to_string)))
            .exec(&db_tx)
            .await?;
        db_tx.commit().await?;

        Ok(())
    }

    /// Returns the settlement history, newest first.
    pub async fn list_settlements(&self) -> ResultEngine<Vec<Settlement>> {
        let models = settlements::Entity::find()
            .order_by_desc(settlements::Column::CreatedAt)
            .all(&self.database)
            .await?;
        models.into_iter().map(Settlement::try_from).collect()
    }

    /// Marks a settlement as paid.
    ///
    /// Only the debtor or the creditor of the payment may flip it; amount
    /// and direction stay immutable.
    pub async fn complete_settlement(
        &self,
        settlement_id: Uuid,
        acting_user_id: Uuid,
        now: DateTime<Utc>,
    ) -> ResultEngine<Settlement> {
        let model = settlements::Entity::find_by_id(settlement_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("settlement not exists".to_string()))?;
        let mut settlement = Settlement::try_from(model)?;

        if !settlement.involves(acting_user_id) {
            return Err(EngineError::Forbidden(
                "only a party to the payment can complete it".to_string(),
            ));
        }
        if settlement.completed {
            return Err(EngineError::AlreadyCompleted(
                "settlement is already completed".to_string(),
            ));
        }

        settlement.completed = true;
        settlement.completed_at = Some(now);
        settlements::ActiveModel::from(&settlement)
            .save(&self.database)
            .await?;

        Ok(settlement)
    }
}
