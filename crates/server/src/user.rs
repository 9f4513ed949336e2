//! User listing, sign-in hook and deletion.

use api_types::user::{SignIn, UserView};
use axum::{Extension, Json, extract::Path, extract::State, http::StatusCode};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub(crate) fn view(user: engine::User) -> UserView {
    UserView {
        id: user.id,
        name: user.name,
        email: user.email,
        avatar_url: user.avatar_url,
    }
}

pub async fn list(
    Extension(_user): Extension<engine::User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<UserView>>, ServerError> {
    let users = state.engine.list_users().await?;
    Ok(Json(users.into_iter().map(view).collect()))
}

/// Called by the identity layer after a successful external sign-in;
/// returns the account for the email, creating it the first time.
pub async fn sign_in(
    State(state): State<ServerState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    Json(payload): Json<SignIn>,
) -> Result<Json<UserView>, ServerError> {
    require_service_token(&state, bearer.as_ref())?;

    let user = state
        .engine
        .find_or_create_user(
            &payload.name,
            &payload.email,
            payload.avatar_url.as_deref(),
            Utc::now(),
        )
        .await?;
    Ok(Json(view(user)))
}

/// Deletes a user account, refused while they still have unsettled
/// involvement.
pub async fn remove(
    Extension(_user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn require_service_token(
    state: &ServerState,
    bearer: Option<&TypedHeader<Authorization<Bearer>>>,
) -> Result<(), ServerError> {
    match bearer {
        Some(TypedHeader(auth)) if auth.token() == state.service_token.as_str() => Ok(()),
        _ => Err(ServerError::Unauthorized),
    }
}
