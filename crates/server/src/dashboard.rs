//! Per-user balance dashboard.

use std::collections::HashMap;

use api_types::dashboard::{CounterpartyBalance, DashboardResponse};
use axum::{Extension, Json, extract::State};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user_index, view_for};

fn decorate(
    amounts: &HashMap<Uuid, f64>,
    index: &HashMap<Uuid, api_types::user::UserView>,
) -> Result<Vec<CounterpartyBalance>, ServerError> {
    let mut balances = Vec::with_capacity(amounts.len());
    for (counterparty, amount) in amounts {
        balances.push(CounterpartyBalance {
            user: view_for(index, *counterparty)?,
            amount: *amount,
        });
    }
    // Stable output order for clients.
    balances.sort_by(|a, b| a.user.id.cmp(&b.user.id));
    Ok(balances)
}

pub async fn get(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
) -> Result<Json<DashboardResponse>, ServerError> {
    let balances = state.engine.dashboard(user.id).await?;
    let index = user_index(&state.engine).await?;

    Ok(Json(DashboardResponse {
        i_owe: decorate(&balances.owed_by_me, &index)?,
        others_owe: decorate(&balances.owed_to_me, &index)?,
        net_balances: decorate(&balances.net, &index)?,
    }))
}
