//! Settlement trigger and history endpoints.

use api_types::settlement::{PaymentView, SettleResponse, SettlementView};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user::require_service_token, user_index, view_for};

fn settlement_view(
    settlement: engine::Settlement,
    index: &std::collections::HashMap<Uuid, api_types::user::UserView>,
) -> Result<SettlementView, ServerError> {
    Ok(SettlementView {
        id: settlement.id,
        from_user: view_for(index, settlement.from_user_id)?,
        to_user: view_for(index, settlement.to_user_id)?,
        amount: settlement.amount,
        created_at: settlement.created_at,
        completed: settlement.completed,
        completed_at: settlement.completed_at,
    })
}

pub async fn list(
    Extension(_user): Extension<engine::User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<SettlementView>>, ServerError> {
    let settlements = state.engine.list_settlements().await?;
    let index = user_index(&state.engine).await?;

    let mut views = Vec::with_capacity(settlements.len());
    for settlement in settlements {
        views.push(settlement_view(settlement, &index)?);
    }
    Ok(Json(views))
}

/// Marks a settlement as paid; allowed for either party to the payment.
pub async fn complete(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SettlementView>, ServerError> {
    let settlement = state
        .engine
        .complete_settlement(id, user.id, Utc::now())
        .await?;

    let index = user_index(&state.engine).await?;
    Ok(Json(settlement_view(settlement, &index)?))
}

/// Settles everything currently unsettled.
///
/// Service-scoped: triggered by a scheduler or an operator, not an end
/// user, so it authorizes with the shared service token.
pub async fn settle(
    State(state): State<ServerState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<Json<SettleResponse>, ServerError> {
    require_service_token(&state, bearer.as_ref())?;

    let outcome = state.engine.settle(Utc::now()).await?;
    let response = match outcome {
        engine::SettleOutcome::NothingToSettle => SettleResponse {
            message: "no unsettled expenses".to_string(),
            payments: Vec::new(),
            expenses_settled: 0,
        },
        engine::SettleOutcome::Settled {
            payments,
            expenses_settled,
        } => SettleResponse {
            message: "settlement committed".to_string(),
            payments: payments
                .iter()
                .map(|payment| PaymentView {
                    from_user_id: payment.from,
                    to_user_id: payment.to,
                    amount: payment.amount,
                })
                .collect(),
            expenses_settled,
        },
    };

    Ok(Json(response))
}
