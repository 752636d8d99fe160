use crate::{
    auth::{
        password::verify_password_blocking,
        session::{clear_session_cookies, issue_session, set_session_cookies},
        LoginRequest, LoginResponse,
    },
    error::AppError,
    state::AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use chrono::Utc;
use validator::Validate;

const BAD_CREDENTIALS: &str = "username or password is incorrect";

/// Login user
///
/// Checks the credentials, records the login time and starts a session: the
/// access and refresh tokens are returned in the body and set as cookies
/// together with the display-only `user` cookie.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;
    let login_data = login_data.into_inner();
    let username = login_data.normalized_username();

    let user = state
        .store
        .users
        .find_user_by_username(&username)
        .await?
        .ok_or_else(|| AppError::Unauthorized(BAD_CREDENTIALS.into()))?;

    if !verify_password_blocking(login_data.password, user.password_hash.clone()).await {
        log::info!("Failed login for {}", username);
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.into()));
    }

    state.store.users.record_login(user.id, Utc::now()).await?;
    let session = issue_session(&state.tokens, &user.username, user.display_name())?;
    log::info!("User {} logged in", user.username);

    let mut response = HttpResponse::Ok();
    set_session_cookies(&mut response, &session, state.cookies)?;
    Ok(response.json(LoginResponse {
        token: session.access.token,
        refresh_token: session.refresh.token,
    }))
}

/// Logout user
///
/// Expires the session cookies. Tokens already handed out stay valid until
/// their own expiry.
#[post("/logout")]
pub async fn logout(state: web::Data<AppState>) -> impl Responder {
    let mut response = HttpResponse::Ok();
    clear_session_cookies(&mut response, state.cookies);
    response.finish()
}
