//! User account operations.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, JoinType, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait,
};
use uuid::Uuid;

use crate::{
    Engine, EngineError, ResultEngine, expense_splits, expenses,
    users::{self, User},
};

impl Engine {
    /// Creates a user account. Emails are unique.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        avatar_url: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<User> {
        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?;
        if existing.is_some() {
            return Err(EngineError::ExistingKey(email.to_string()));
        }

        let user = User::new(
            name.to_string(),
            email.to_string(),
            avatar_url.map(|url| url.to_string()),
            created_at,
        );
        users::ActiveModel::from(&user).insert(&self.database).await?;
        Ok(user)
    }

    /// Returns the account for `email`, creating it on first sign-in.
    pub async fn find_or_create_user(
        &self,
        name: &str,
        email: &str,
        avatar_url: Option<&str>,
        now: DateTime<Utc>,
    ) -> ResultEngine<User> {
        match users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?
        {
            Some(model) => User::try_from(model),
            None => self.create_user(name, email, avatar_url, now).await,
        }
    }

    pub async fn user_by_id(&self, user_id: Uuid) -> ResultEngine<User> {
        let model = users::Entity::find_by_id(user_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
        User::try_from(model)
    }

    pub async fn user_by_email(&self, email: &str) -> ResultEngine<User> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
        User::try_from(model)
    }

    pub async fn list_users(&self) -> ResultEngine<Vec<User>> {
        let models = users::Entity::find()
            .order_by_asc(users::Column::CreatedAt)
            .all(&self.database)
            .await?;
        models.into_iter().map(User::try_from).collect()
    }

    /// Counts the unsettled expenses a user is involved in, as payer or as
    /// split owner. Used to gate deletion.
    pub async fn count_unsettled_involving(&self, user_id: Uuid) -> ResultEngine<u64> {
        let as_payer = expenses::Entity::find()
            .filter(expenses::Column::PayerId.eq(user_id.to_string()))
            .filter(expenses::Column::Settled.eq(false))
            .count(&self.database)
            .await?;

        let as_ower = expense_splits::Entity::find()
            .filter(expense_splits::Column::UserId.eq(user_id.to_string()))
            .join(JoinType::InnerJoin, expense_splits::Relation::Expenses.def())
            .filter(expenses::Column::Settled.eq(false))
            .count(&self.database)
            .await?;

        Ok(as_payer + as_ower)
    }

    /// Deletes a user account.
    ///
    /// Refused while the user still has unsettled involvement; those
    /// expenses have to be settled first.
    pub async fn delete_user(&self, user_id: Uuid) -> ResultEngine<()> {
        let model = users::Entity::find_by_id(user_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;

        let involved = self.count_unsettled_involving(user_id).await?;
        if involved > 0 {
            return Err(EngineError::UnsettledObligations(format!(
                "user is involved in {involved} unsettled expenses"
            )));
        }

        model.delete(&self.database).await?;
        Ok(())
    }
}
