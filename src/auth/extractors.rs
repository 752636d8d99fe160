use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;

use crate::auth::token::Claims;
use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;
use crate::store::UserStore;

/// Looks up the user named by the verified claim attached to the request.
///
/// This is the only place identity is derived for a handler; nothing else
/// re-reads raw tokens.
pub async fn resolve_current_user(
    claims: Option<&Claims>,
    users: &dyn UserStore,
) -> Result<User, AppError> {
    let claims = claims.ok_or_else(|| AppError::Unauthorized("Not authenticated".into()))?;
    users
        .find_user_by_username(&claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".into()))
}

/// The authenticated caller.
///
/// Requires `AuthMiddleware` to have attached `Claims` to the request; fails
/// with `Unauthorized` when no claim is present or the user no longer exists.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<Claims>().cloned();
        let state = req.app_data::<web::Data<AppState>>().cloned();
        Box::pin(async move {
            let state = state.ok_or_else(|| {
                AppError::InternalServerError("application state not configured".into())
            })?;
            let user = resolve_current_user(claims.as_ref(), state.store.users.as_ref()).await?;
            Ok(CurrentUser(user))
        })
    }
}

/// The caller if one is authenticated, `None` on anonymous requests.
///
/// Used on public routes where a session changes behavior but is not required.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl FromRequest for MaybeUser {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<Claims>().cloned();
        let state = req.app_data::<web::Data<AppState>>().cloned();
        Box::pin(async move {
            let (claims, state) = match (claims, state) {
                (Some(claims), Some(state)) => (claims, state),
                _ => return Ok(MaybeUser(None)),
            };
            let user = state.store.users.find_user_by_username(&claims.sub).await?;
            Ok(MaybeUser(user))
        })
    }
}
