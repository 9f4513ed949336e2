//! Expense API endpoints.

use std::collections::HashMap;

use api_types::{
    expense::{ExpenseNew, ExpenseUpdate, ExpenseView, SplitView},
    user::UserView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user_index, view_for};

fn expense_view(
    expense: engine::Expense,
    index: &HashMap<Uuid, UserView>,
) -> Result<ExpenseView, ServerError> {
    let payer = view_for(index, expense.payer_id)?;
    let mut splits = Vec::with_capacity(expense.splits.len());
    for split in expense.splits {
        splits.push(SplitView {
            user: view_for(index, split.user_id)?,
            amount_owed: split.amount_owed,
        });
    }

    Ok(ExpenseView {
        id: expense.id,
        amount: expense.amount,
        description: expense.description,
        payer,
        settled: expense.settled,
        created_at: expense.created_at,
        splits,
    })
}

pub async fn list(
    Extension(_user): Extension<engine::User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let expenses = state.engine.list_unsettled_expenses().await?;
    let index = user_index(&state.engine).await?;

    let mut views = Vec::with_capacity(expenses.len());
    for expense in expenses {
        views.push(expense_view(expense, &index)?);
    }
    Ok(Json(views))
}

pub async fn create(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state
        .engine
        .create_expense(
            user.id,
            payload.amount,
            &payload.description,
            &payload.involved_user_ids,
            Utc::now(),
        )
        .await?;

    let index = user_index(&state.engine).await?;
    Ok(Json(expense_view(expense, &index)?))
}

pub async fn detail(
    Extension(_user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state.engine.expense(id).await?;
    let index = user_index(&state.engine).await?;
    Ok(Json(expense_view(expense, &index)?))
}

pub async fn update(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ExpenseUpdate>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state
        .engine
        .update_expense(
            id,
            user.id,
            payload.amount,
            &payload.description,
            &payload.involved_user_ids,
        )
        .await?;

    let index = user_index(&state.engine).await?;
    Ok(Json(expense_view(expense, &index)?))
}

pub async fn remove(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_expense(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
