#![allow(dead_code)]

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App, Error};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use taskboard::auth::session::CookieSettings;
use taskboard::auth::TokenService;
use taskboard::models::User;
use taskboard::routes;
use taskboard::state::AppState;
use taskboard::store::Store;

pub const PASSWORD: &str = "Abcdef1!";

pub fn test_state(store: Store) -> web::Data<AppState> {
    web::Data::new(AppState::new(
        store,
        TokenService::new("integration-access-secret", "integration-refresh-secret"),
        CookieSettings::default(),
    ))
}

pub async fn init_app(
    state: web::Data<AppState>,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = Error> {
    test::init_service(App::new().app_data(state).configure(routes::config)).await
}

/// Status of a request whether a handler or a middleware answered it.
pub async fn status_of<S, B>(app: &S, req: Request) -> StatusCode
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
{
    match test::try_call_service(app, req).await {
        Ok(resp) => resp.status(),
        Err(err) => err.as_response_error().status_code(),
    }
}

/// Inserts a user directly, with a cheap hash so tests stay fast.
pub async fn seed_user(state: &web::Data<AppState>, username: &str, is_admin: bool) -> User {
    let user = User {
        id: Uuid::new_v4(),
        name: username.to_string(),
        username: username.to_string(),
        password_hash: bcrypt::hash(PASSWORD, 4).unwrap(),
        email: format!("{}@example.com", username),
        is_admin,
        created_ts: Utc::now(),
        last_login_ts: None,
    };
    state.store.users.create_user(&user).await.unwrap()
}

/// A valid access token for `username`.
pub fn access_token(state: &web::Data<AppState>, username: &str) -> String {
    state.tokens.issue_access(username).unwrap().token
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

pub async fn create_board<S, B>(app: &S, token: &str, name: &str) -> serde_json::Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/boards")
        .insert_header(bearer(token))
        .set_json(json!({ "name": name }))
        .to_request();
    test::call_and_read_body_json(app, req).await
}

pub async fn create_list<S, B>(
    app: &S,
    token: &str,
    board_id: &str,
    name: &str,
    order: i32,
) -> serde_json::Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri(&format!("/boards/{}/lists", board_id))
        .insert_header(bearer(token))
        .set_json(json!({ "name": name, "order": order }))
        .to_request();
    test::call_and_read_body_json(app, req).await
}

pub async fn create_task<S, B>(
    app: &S,
    token: &str,
    board_id: &str,
    list_id: &str,
    name: &str,
) -> serde_json::Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri(&format!("/boards/{}/lists/{}/tasks", board_id, list_id))
        .insert_header(bearer(token))
        .set_json(json!({ "name": name, "content": "details" }))
        .to_request();
    test::call_and_read_body_json(app, req).await
}
