use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::Utc;
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::{Engine, User};
use migration::MigratorTrait;
use server::ServerState;

const SERVICE_TOKEN: &str = "test-service-token";

async fn test_app() -> (Router, Engine) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build();

    let state = ServerState {
        engine: Arc::new(engine.clone()),
        service_token: Arc::new(SERVICE_TOKEN.to_string()),
    };
    (server::router(state), engine)
}

async fn new_user(engine: &Engine, name: &str) -> User {
    engine
        .create_user(name, &format!("{name}@example.com"), None, Utc::now())
        .await
        .unwrap()
}

fn get(uri: &str, email: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-auth-user", email)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, email: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-auth-user", email)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn requests_without_identity_are_rejected() {
    let (app, engine) = test_app().await;
    new_user(&engine, "alice").await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/expenses").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(get("/expenses", "nobody@example.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expense_dashboard_settle_roundtrip() {
    let (app, engine) = test_app().await;
    let alice = new_user(&engine, "alice").await;
    let bob = new_user(&engine, "bob").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/expenses",
            "alice@example.com",
            &json!({
                "amount": 90.0,
                "description": "groceries",
                "involved_user_ids": [alice.id, bob.id],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let expense = body_json(response).await;
    assert_eq!(expense["payer"]["id"], json!(alice.id));
    assert_eq!(expense["splits"].as_array().unwrap().len(), 2);

    let response = app
        .clone()
        .oneshot(get("/dashboard", "bob@example.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let dashboard = body_json(response).await;
    assert_eq!(dashboard["i_owe"][0]["user"]["id"], json!(alice.id));
    assert_eq!(dashboard["i_owe"][0]["amount"], json!(45.0));
    assert_eq!(dashboard["net_balances"][0]["amount"], json!(-45.0));

    // The settlement trigger is service-scoped; a user header is not enough.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/settle")
                .header(header::AUTHORIZATION, "Bearer wrong-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/settle")
                .header(header::AUTHORIZATION, format!("Bearer {SERVICE_TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let settled = body_json(response).await;
    assert_eq!(settled["expenses_settled"], json!(1));
    assert_eq!(settled["payments"][0]["from_user_id"], json!(bob.id));
    assert_eq!(settled["payments"][0]["to_user_id"], json!(alice.id));
    assert_eq!(settled["payments"][0]["amount"], json!(45.0));

    let response = app
        .clone()
        .oneshot(get("/settlements", "alice@example.com"))
        .await
        .unwrap();
    let history = body_json(response).await;
    let settlement_id = history[0]["id"].as_str().unwrap().to_string();
    assert_eq!(history[0]["completed"], json!(false));

    // The debtor marks the payment as done.
    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/settlements/{settlement_id}"),
            "bob@example.com",
            &json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let completed = body_json(response).await;
    assert_eq!(completed["completed"], json!(true));

    // Nothing is left to settle afterwards.
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/settle")
                .header(header::AUTHORIZATION, format!("Bearer {SERVICE_TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let settled = body_json(response).await;
    assert_eq!(settled["expenses_settled"], json!(0));
    assert_eq!(settled["payments"], json!([]));
}

#[tokio::test]
async fn policy_violations_surface_as_client_errors() {
    let (app, engine) = test_app().await;
    let alice = new_user(&engine, "alice").await;
    let bob = new_user(&engine, "bob").await;

    let expense = engine
        .create_expense(alice.id, 40.0, "taxi", &[alice.id, bob.id], Utc::now())
        .await
        .unwrap();

    // Only the payer may delete.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/expenses/{}", expense.id))
                .header("x-auth-user", "bob@example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Users with unsettled involvement cannot be deleted.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/users/{}", bob.id))
                .header("x-auth-user", "alice@example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .oneshot(get(&format!("/expenses/{}", uuid::Uuid::new_v4()), "alice@example.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sign_in_hook_is_service_scoped_and_idempotent() {
    let (app, _engine) = test_app().await;

    let payload = json!({
        "name": "carol",
        "email": "carol@example.com",
        "avatar_url": null,
    });

    // Without the service token the hook is refused.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/sign-in")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let sign_in = |payload: Value| {
        let app = app.clone();
        async move {
            let response = app
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/auth/sign-in")
                        .header(header::CONTENT_TYPE, "application/json")
                        .header(header::AUTHORIZATION, format!("Bearer {SERVICE_TOKEN}"))
                        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            body_json(response).await
        }
    };

    let first = sign_in(payload.clone()).await;
    let second = sign_in(payload).await;
    assert_eq!(first["id"], second["id"]);

    // The new account is a valid identity for user-scoped routes.
    let response = app
        .oneshot(get("/users", "carol@example.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let users = body_json(response).await;
    assert_eq!(users.as_array().unwrap().len(), 1);
}
