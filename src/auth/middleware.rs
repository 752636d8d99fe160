use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::Method,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::session::read_access_token;
use crate::auth::token::TokenKind;
use crate::error::AppError;
use crate::state::AppState;

/// Routes reachable without a session. A valid token is still attached on
/// these so handlers can tell an admin caller apart from an anonymous one.
pub fn is_public_route(method: &Method, path: &str) -> bool {
    let path = path.trim_end_matches('/');
    (*method == Method::POST && matches!(path, "/login" | "/logout" | "/users"))
        || (*method == Method::GET && path == "/api/healthcheck")
}

/// Verifies the access token and attaches its `Claims` to the request.
///
/// Must wrap `RefreshMiddleware`, which reads the attached claims.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
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
        let public = is_public_route(req.method(), req.path());

        let verified = match req.app_data::<web::Data<AppState>>() {
            Some(state) => read_access_token(req.request())
                .map(|token| state.tokens.verify(&token, TokenKind::Access)),
            None => {
                let err = AppError::InternalServerError("application state not configured".into());
                return Box::pin(async move { Err(err.into()) });
            }
        };

        match verified {
            Some(Ok(claims)) => {
                req.extensions_mut().insert(claims);
            }
            Some(Err(err)) if !public => {
                log::debug!("Rejected access token for {}: {}", req.path(), err);
                let app_err: AppError = err.into();
                return Box::pin(async move { Err(app_err.into()) });
            }
            None if !public => {
                let app_err = AppError::Unauthorized("Missing token".into());
                return Box::pin(async move { Err(app_err.into()) });
            }
            // Public route with an absent or unusable token: proceed anonymously.
            _ => {}
        }

        let fut = self.service.call(req);
        Box::pin(fut)
    }
}
