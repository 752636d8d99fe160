//! Sliding session renewal.
//!
//! When the verified access token has less than [`ROTATION_WINDOW_MINUTES`]
//! left and the request carries a valid refresh token for the same subject, a
//! fresh access + refresh pair is minted and written over the old cookies on
//! the outgoing response. Rotation is best-effort: any failure is logged and
//! the request completes as if nothing happened.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use chrono::{DateTime, Duration, Utc};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::session::{
    issue_session, read_display_name, read_refresh_token, write_session_cookies, IssuedSession,
};
use crate::auth::token::{Claims, TokenKind, TokenService};
use crate::state::AppState;

pub const ROTATION_WINDOW_MINUTES: i64 = 15;

/// Decides whether the session should be rotated and, if so, mints the new pair.
///
/// The `user` cookie keeps the display name the client already holds and falls
/// back to the claim subject, so no storage lookup happens here.
pub fn rotate_if_expiring(
    claims: &Claims,
    refresh_token: Option<&str>,
    display_name: Option<&str>,
    tokens: &TokenService,
    now: DateTime<Utc>,
) -> Option<IssuedSession> {
    if claims.remaining(now) >= Duration::minutes(ROTATION_WINDOW_MINUTES) {
        return None;
    }

    let refresh_claims = match tokens.verify(refresh_token?, TokenKind::Refresh) {
        Ok(refresh_claims) => refresh_claims,
        Err(e) => {
            log::debug!("Refresh token not usable for {}: {}", claims.sub, e);
            return None;
        }
    };
    if refresh_claims.sub != claims.sub {
        log::warn!(
            "Refresh token subject {} does not match access subject {}",
            refresh_claims.sub,
            claims.sub
        );
        return None;
    }

    let display_name = display_name.unwrap_or(claims.sub.as_str());
    match issue_session(tokens, &claims.sub, display_name) {
        Ok(session) => Some(session),
        Err(e) => {
            log::warn!("Session rotation for {} failed: {}", claims.sub, e);
            None
        }
    }
}

/// Rotates expiring sessions. Must be wrapped by `AuthMiddleware`.
pub struct RefreshMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RefreshMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RefreshMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RefreshMiddlewareService { service }))
    }
}

pub struct RefreshMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RefreshMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let claims = req.extensions().get::<Claims>().cloned();
        let state = req.app_data::<web::Data<AppState>>().cloned();

        let rotated = match (claims, state.as_ref()) {
            (Some(claims), Some(state)) => rotate_if_expiring(
                &claims,
                read_refresh_token(req.request()).as_deref(),
                read_display_name(req.request()).as_deref(),
                &state.tokens,
                Utc::now(),
            )
            .map(|session| (session, state.cookies)),
            _ => None,
        };

        let fut = self.service.call(req);
        Box::pin(async move {
            let mut res = fut.await?;
            if let Some((session, settings)) = rotated {
                match write_session_cookies(res.response_mut(), &session, settings) {
                    Ok(()) => log::debug!("Rotated session cookies"),
                    Err(e) => log::warn!("Could not write rotated session cookies: {}", e),
                }
            }
            Ok(res)
        })
    }
}
