use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, patch, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
};
use engine::Engine;

use crate::{dashboard, expenses, settlements, user};

static AUTH_USER_HEADER: axum::http::HeaderName =
    axum::http::HeaderName::from_static("x-auth-user");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub service_token: Arc<String>,
}

/// `TypedHeader` for the authenticated-user header.
///
/// Session verification happens in the identity layer in front of the
/// server; it forwards the verified account email in "x-auth-user".
#[derive(Debug)]
struct AuthUserHeader(String);

impl Header for AuthUserHeader {
    fn name() -> &'static axum::http::HeaderName {
        &AUTH_USER_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        if value.is_empty() {
            return Err(AxumError::invalid());
        }

        Ok(AuthUserHeader(value.to_string()))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        match axum::http::HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-auth-user header"),
        }
    }
}

async fn auth(
    auth_header: Option<TypedHeader<AuthUserHeader>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(AuthUserHeader(email))) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    let user = state
        .engine
        .user_by_email(&email)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let authed = Router::new()
        .route("/users", get(user::list))
        .route("/users/{id}", delete(user::remove))
        .route("/expenses", get(expenses::list).post(expenses::create))
        .route(
            "/expenses/{id}",
            get(expenses::detail)
                .put(expenses::update)
                .delete(expenses::remove),
        )
        .route("/dashboard", get(dashboard::get))
        .route("/settlements", get(settlements::list))
        .route("/settlements/{id}", patch(settlements::complete))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    // Service-scoped routes: authorized by the shared service token, not
    // tied to an end-user identity.
    Router::new()
        .route("/auth/sign-in", post(user::sign_in))
        .route("/settle", post(settlements::settle))
        .merge(authed)
        .with_state(state)
}

pub async fn run(engine: Engine, service_token: String) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, service_token, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    service_token: String,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        service_token: Arc::new(service_token),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    service_token: String,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, service_token, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
