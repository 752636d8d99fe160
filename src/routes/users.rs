use crate::{
    auth::{
        authorization::{authorize_user, parse_id, require_admin},
        password::hash_password_blocking,
        CurrentUser, MaybeUser,
    },
    error::AppError,
    models::{NewUserRequest, UpdateUserRequest},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use validator::Validate;

/// All users. Admin only.
#[get("/users")]
pub async fn get_users(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    require_admin(&user.0)?;
    let users = state.store.users.list_users().await?;
    Ok(HttpResponse::Ok().json(users))
}

/// One user. Allowed for the user themselves and for admins.
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let user_id = parse_id(&path, "user")?;
    authorize_user(&user.0, user_id)?;

    let found = state
        .store
        .users
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".into()))?;
    Ok(HttpResponse::Ok().json(found))
}

/// Sign up.
///
/// Public. Username and email are trimmed and lower-cased before validation.
/// `is_admin` only takes effect when the caller is an authenticated admin.
///
/// ## Responses:
/// - `200 OK`: the created `User` (never includes the password).
/// - `400 Bad Request`: a field failed its policy.
/// - `409 Conflict`: the username is taken.
#[post("/users")]
pub async fn create_user(
    state: web::Data<AppState>,
    caller: MaybeUser,
    user_data: web::Json<NewUserRequest>,
) -> Result<impl Responder, AppError> {
    let request = user_data.into_inner().normalized();
    request.validate()?;

    if state
        .store
        .users
        .find_user_by_username(&request.username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "user by that username already exists".into(),
        ));
    }

    let is_admin = request.is_admin && caller.0.map(|c| c.is_admin).unwrap_or(false);
    let password_hash = hash_password_blocking(request.password.clone()).await?;
    let created = state
        .store
        .users
        .create_user(&request.into_user(password_hash, is_admin))
        .await?;

    log::info!("Created user {} (admin: {})", created.username, created.is_admin);
    Ok(HttpResponse::Ok().json(created))
}

/// Updates name, email or password. Self or admin; only an admin may change
/// `is_admin`.
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
    user_data: web::Json<UpdateUserRequest>,
) -> Result<impl Responder, AppError> {
    let caller = user.0;
    let user_id = parse_id(&path, "user")?;
    authorize_user(&caller, user_id)?;

    let changes = user_data.into_inner().normalized();
    changes.validate()?;
    if changes.is_admin.is_some() {
        require_admin(&caller)?;
    }

    let mut target = state
        .store
        .users
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".into()))?;

    if let Some(name) = changes.name.filter(|name| !name.is_empty()) {
        target.name = name;
    }
    if let Some(email) = changes.email {
        target.email = email;
    }
    if let Some(password) = changes.password {
        target.password_hash = hash_password_blocking(password).await?;
    }
    if let Some(is_admin) = changes.is_admin {
        target.is_admin = is_admin;
    }

    let updated = state
        .store
        .users
        .update_user(&target)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".into()))?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Admin only.
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    require_admin(&user.0)?;
    let user_id = parse_id(&path, "user")?;

    if !state.store.users.delete_user(user_id).await? {
        return Err(AppError::NotFound("user not found".into()));
    }
    log::info!("User {} deleted by {}", user_id, user.0.username);
    Ok(HttpResponse::NoContent().finish())
}
