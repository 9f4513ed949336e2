use std::collections::HashMap;

use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;
use serde::Serialize;
use uuid::Uuid;

pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod dashboard;
mod expenses;
mod server;
mod settlements;
mod user;

pub mod types {
    pub mod user {
        pub use api_types::user::{SignIn, UserView};
    }

    pub mod expense {
        pub use api_types::expense::{ExpenseNew, ExpenseUpdate, ExpenseView, SplitView};
    }

    pub mod dashboard {
        pub use api_types::dashboard::{CounterpartyBalance, DashboardResponse};
    }

    pub mod settlement {
        pub use api_types::settlement::{PaymentView, SettleResponse, SettlementView};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Unauthorized,
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::AlreadySettled(_)
        | EngineError::AlreadyCompleted(_)
        | EngineError::UnsettledObligations(_)
        | EngineError::InvalidAmount(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

/// Loads every user once, keyed by id, for decorating amounts with user
/// views.
pub(crate) async fn user_index(
    engine: &engine::Engine,
) -> Result<HashMap<Uuid, api_types::user::UserView>, ServerError> {
    let users = engine.list_users().await?;
    Ok(users
        .into_iter()
        .map(|u| (u.id, user::view(u)))
        .collect())
}

pub(crate) fn view_for(
    index: &HashMap<Uuid, api_types::user::UserView>,
    user_id: Uuid,
) -> Result<api_types::user::UserView, ServerError> {
    index
        .get(&user_id)
        .cloned()
        .ok_or_else(|| ServerError::Generic(format!("unknown user {user_id}")))
}
