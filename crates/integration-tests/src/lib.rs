//! Shared fixtures for the end-to-end API tests: an in-memory store, a
//! cheap-to-hash auth provider, and helpers to drive the actix test service.

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::test::{self, TestRequest};
use actix_web::web;
use chrono::Duration;
use dd_api::AppState;
use dd_auth_jwt::{Argon2Params, JwtAuthProvider, DEFAULT_TOKEN_TTL_SECS};
use dd_db_sqlite::SqliteDiaryRepo;
use secrecy::SecretString;
use serde_json::{json, Value};

pub const SECRET: &str = "integration-secret";

pub fn token_provider() -> JwtAuthProvider {
    JwtAuthProvider::new(
        SecretString::from(SECRET.to_string()),
        Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
    )
    .with_argon2_params(Argon2Params {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
}

pub struct Fixture {
    pub state: web::Data<AppState>,
    /// Same database the app writes to, for checks behind its back
    pub store: SqliteDiaryRepo,
    /// Shares the app's secret, so it can mint and read the app's tokens
    pub tokens: JwtAuthProvider,
}

impl Fixture {
    pub async fn new() -> Self {
        let store = SqliteDiaryRepo::new("sqlite::memory:")
            .await
            .expect("in-memory sqlite");
        let state = web::Data::new(AppState::new(store.clone(), token_provider()));
        Self {
            state,
            store,
            tokens: token_provider(),
        }
    }
}

/// Builds the routed app around a fixture's state.
#[macro_export]
macro_rules! init_app {
    ($fixture:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($fixture.state.clone())
                .configure(dd_api::configure_routes),
        )
        .await
    };
}

/// Sends `req` and returns the status with the body parsed as JSON
/// (`Value::Null` for an empty or non-JSON body).
pub async fn call<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

/// Registers a user named `name` (email `name@x.com`, password `pw123`)
/// and returns their token.
pub async fn signup<S, B>(app: &S, name: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "username": name, "email": format!("{name}@x.com"), "password": "pw123" }))
        .to_request();
    let (status, body) = call(app, req).await;
    assert_eq!(status, StatusCode::OK, "signup of {name} failed: {body}");
    body["token"].as_str().expect("token in response").to_string()
}

/// Creates a post as the holder of `token` and returns its JSON.
pub async fn publish<S, B>(app: &S, token: &str, title: &str, content: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(token))
        .set_json(json!({ "title": title, "content": content }))
        .to_request();
    let (status, body) = call(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "publish failed: {body}");
    body
}

/// Replies to `post_id` as the holder of `token` and returns the reply JSON.
pub async fn reply_to<S, B>(app: &S, token: &str, post_id: &str, content: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = TestRequest::post()
        .uri(&format!("/api/posts/{post_id}/replies"))
        .insert_header(bearer(token))
        .set_json(json!({ "content": content }))
        .to_request();
    let (status, body) = call(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "reply failed: {body}");
    body
}
