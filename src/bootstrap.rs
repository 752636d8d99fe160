use crate::auth::password::hash_password_blocking;
use crate::config::AdminSeed;
use crate::error::AppError;
use crate::models::NewUserRequest;
use crate::store::Store;
use validator::Validate;

/// Creates the configured administrator unless a user with that username
/// already exists. Returns whether a user was created.
///
/// The seed goes through the same normalization and policy as signup.
pub async fn ensure_admin(store: &Store, seed: &AdminSeed) -> Result<bool, AppError> {
    let request = NewUserRequest {
        name: String::new(),
        username: seed.username.clone(),
        password: seed.password.clone(),
        email: seed.email.clone(),
        is_admin: true,
    }
    .normalized();
    request.validate()?;

    if store
        .users
        .find_user_by_username(&request.username)
        .await?
        .is_some()
    {
        log::debug!("Admin user {} already present", request.username);
        return Ok(false);
    }

    let password_hash = hash_password_blocking(request.password.clone()).await?;
    let admin = store
        .users
        .create_user(&request.into_user(password_hash, true))
        .await?;
    log::info!("Created admin user {}", admin.username);
    Ok(true)
}
