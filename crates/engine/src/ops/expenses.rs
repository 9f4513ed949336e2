//! Expense lifecycle operations.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    Engine, EngineError, ResultEngine,
    expense_splits::{self, ExpenseSplit},
    expenses::{self, Expense},
    money::round_to_cents,
};

/// Loads the splits belonging to `models` and zips them back onto the
/// domain expenses, preserving the order of `models`.
pub(crate) async fn attach_splits<C: ConnectionTrait>(
    db: &C,
    models: Vec<expenses::Model>,
) -> ResultEngine<Vec<Expense>> {
    let ids: Vec<String> = models.iter().map(|model| model.id.clone()).collect();
    let split_models = if ids.is_empty() {
        Vec::new()
    } else {
        expense_splits::Entity::find()
            .filter(expense_splits::Column::ExpenseId.is_in(ids))
            .all(db)
            .await?
    };

    let mut by_expense: HashMap<Uuid, Vec<ExpenseSplit>> = HashMap::new();
    for model in split_models {
        let split = ExpenseSplit::try_from(model)?;
        by_expense.entry(split.expense_id).or_default().push(split);
    }

    let mut out = Vec::with_capacity(models.len());
    for model in models {
        let mut expense = Expense::try_from(model)?;
        expense.splits = by_expense.remove(&expense.id).unwrap_or_default();
        out.push(expense);
    }
    Ok(out)
}

impl Engine {
    /// Creates an expense with an equal split over the involved users.
    ///
    /// Shares are `amount / n`, rounded to cents, so the split sum may
    /// drift from the amount by less than half a cent per split. The
    /// expense and its splits are inserted in one store transaction.
    pub async fn create_expense(
        &self,
        payer_id: Uuid,
        amount: f64,
        description: &str,
        involved_user_ids: &[Uuid],
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Expense> {
        let mut expense = Expense::new(amount, description.to_string(), payer_id, created_at)?;
        expense.splits = build_splits(expense.id, amount, involved_user_ids)?;

        let db_tx = self.database.begin().await?;
        expenses::ActiveModel::from(&expense).insert(&db_tx).await?;
        for split in &expense.splits {
            expense_splits::ActiveModel::from(split).insert(&db_tx).await?;
        }
        db_tx.commit().await?;

        Ok(expense)
    }

    /// Returns one expense with its splits.
    pub async fn expense(&self, expense_id: Uuid) -> ResultEngine<Expense> {
        let model = expenses::Entity::find_by_id(expense_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;

        let mut loaded = attach_splits(&self.database, vec![model]).await?;
        loaded
            .pop()
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))
    }

    /// Returns every unsettled expense, newest first, splits attached.
    pub async fn list_unsettled_expenses(&self) -> ResultEngine<Vec<Expense>> {
        let models = expenses::Entity::find()
            .filter(expenses::Column::Settled.eq(false))
            .order_by_desc(expenses::Column::CreatedAt)
            .all(&self.database)
            .await?;

        attach_splits(&self.database, models).await
    }

    /// Replaces an expense's amount, description and split set.
    ///
    /// Old splits are deleted and the new set inserted in the same store
    /// transaction; splits are never patched individually. Refused once
    /// the expense is settled, or when the acting user is not the payer.
    pub async fn update_expense(
        &self,
        expense_id: Uuid,
        acting_user_id: Uuid,
        amount: f64,
        description: &str,
        involved_user_ids: &[Uuid],
    ) -> ResultEngine<Expense> {
        let model = expenses::Entity::find_by_id(expense_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
        let mut expense = Expense::try_from(model)?;

        if expense.settled {
            return Err(EngineError::AlreadySettled(
                "a settled expense cannot be edited".to_string(),
            ));
        }
        if expense.payer_id != acting_user_id {
            return Err(EngineError::Forbidden(
                "only the payer can edit this expense".to_string(),
            ));
        }
        if amount <= 0.0 {
            return Err(EngineError::InvalidAmount("amount must be > 0".to_string()));
        }
        if description.trim().is_empty() {
            return Err(EngineError::InvalidAmount(
                "description must not be empty".to_string(),
            ));
        }

        expense.amount = amount;
        expense.description = description.to_string();
        expense.splits = build_splits(expense.id, amount, involved_user_ids)?;

        let db_tx = self.database.begin().await?;
        expense_splits::Entity::delete_many()
            .filter(expense_splits::Column::ExpenseId.eq(expense_id.to_string()))
            .exec(&db_tx)
            .await?;
        expenses::ActiveModel::from(&expense).save(&db_tx).await?;
        for split in &expense.splits {
            expense_splits::ActiveModel::from(split).insert(&db_tx).await?;
        }
        db_tx.commit().await?;

        Ok(expense)
    }

    /// Deletes an unsettled expense and its splits.
    ///
    /// Same policy gates as editing: settled expenses are immutable and
    /// only the payer may delete.
    pub async fn delete_expense(&self, expense_id: Uuid, acting_user_id: Uuid) -> ResultEngine<()> {
        let model = expenses::Entity::find_by_id(expense_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;

        if model.settled {
            return Err(EngineError::AlreadySettled(
                "a settled expense cannot be deleted".to_string(),
            ));
        }
        if model.payer_id != acting_user_id.to_string() {
            return Err(EngineError::Forbidden(
                "only the payer can delete this expense".to_string(),
            ));
        }

        let db_tx = self.database.begin().await?;
        expense_splits::Entity::delete_many()
            .filter(expense_splits::Column::ExpenseId.eq(expense_id.to_string()))
            .exec(&db_tx)
            .await?;
        model.delete(&db_tx).await?;
        db_tx.commit().await?;

        Ok(())
    }
}

fn build_splits(
    expense_id: Uuid,
    amount: f64,
    involved_user_ids: &[Uuid],
) -> ResultEngine<Vec<ExpenseSplit>> {
    if involved_user_ids.is_empty() {
        return Err(EngineError::InvalidAmount(
            "at least one involved user is required".to_string(),
        ));
    }

    let share = round_to_cents(amount / involved_user_ids.len() as f64);
    Ok(involved_user_ids
        .iter()
        .map(|user_id| ExpenseSplit::new(expense_id, *user_id, share))
        .collect())
}
