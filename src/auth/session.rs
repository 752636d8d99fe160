//! Session transport: binds tokens to the request/response boundary.
//!
//! The access token is read from the `access-token` cookie, falling back to an
//! `Authorization: Bearer` header. The refresh token is only ever read from
//! its own cookie. Responses carry both tokens as HttpOnly cookies plus a
//! display-only `user` cookie that must never be used for authorization.
//! Cookie names and values are percent-encoded on the way out, and actix
//! decodes them on the way back in.

use actix_web::cookie::time::OffsetDateTime;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::error::HttpError;
use actix_web::http::header::{self, HeaderValue, InvalidHeaderValue};
use actix_web::{HttpRequest, HttpResponse, HttpResponseBuilder};
use chrono::{DateTime, Utc};

use crate::auth::token::{IssuedToken, TokenError, TokenService};

pub const ACCESS_TOKEN_COOKIE: &str = "access-token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh-token";
pub const USER_COOKIE: &str = "user";

/// Cookie attributes shared by every cookie the service writes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieSettings {
    pub secure: bool,
}

/// Reads the access token: cookie first, then the `Authorization` header.
pub fn read_access_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(ACCESS_TOKEN_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Reads the refresh token from its cookie only.
pub fn read_refresh_token(req: &HttpRequest) -> Option<String> {
    req.cookie(REFRESH_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// Display name the client currently shows, if it sent one back.
pub fn read_display_name(req: &HttpRequest) -> Option<String> {
    req.cookie(USER_COOKIE)
        .map(|cookie| cookie.value().trim().to_string())
        .filter(|name| !name.is_empty())
}

/// `Set-Cookie` value with the cookie's name and value percent-encoded.
pub fn set_cookie_value(cookie: &Cookie<'_>) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&cookie.encoded().to_string())
}

fn cookie_expiry(expires_at: DateTime<Utc>) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(expires_at.timestamp())
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

/// HttpOnly, `path=/` cookie carrying a token until `expires_at`.
pub fn token_cookie(
    name: &'static str,
    value: &str,
    expires_at: DateTime<Utc>,
    settings: CookieSettings,
) -> Cookie<'static> {
    Cookie::build(name, value.to_string())
        .path("/")
        .http_only(true)
        .secure(settings.secure)
        .same_site(SameSite::Lax)
        .expires(cookie_expiry(expires_at))
        .finish()
}

/// Script-readable cookie with the display name, for UI use only.
pub fn user_cookie(
    display_name: &str,
    expires_at: DateTime<Utc>,
    settings: CookieSettings,
) -> Cookie<'static> {
    Cookie::build(USER_COOKIE, display_name.to_string())
        .path("/")
        .secure(settings.secure)
        .same_site(SameSite::Lax)
        .expires(cookie_expiry(expires_at))
        .finish()
}

/// A freshly minted access + refresh pair.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
    pub display_name: String,
}

impl IssuedSession {
    pub fn cookies(&self, settings: CookieSettings) -> [Cookie<'static>; 3] {
        [
            token_cookie(
                ACCESS_TOKEN_COOKIE,
                &self.access.token,
                self.access.expires_at,
                settings,
            ),
            user_cookie(&self.display_name, self.access.expires_at, settings),
            token_cookie(
                REFRESH_TOKEN_COOKIE,
                &self.refresh.token,
                self.refresh.expires_at,
                settings,
            ),
        ]
    }
}

/// Mints a new access + refresh pair for `username`.
pub fn issue_session(
    tokens: &TokenService,
    username: &str,
    display_name: &str,
) -> Result<IssuedSession, TokenError> {
    Ok(IssuedSession {
        access: tokens.issue_access(username)?,
        refresh: tokens.issue_refresh(username)?,
        display_name: display_name.to_string(),
    })
}

/// Adds the three session cookies to a response being built.
pub fn set_session_cookies(
    builder: &mut HttpResponseBuilder,
    session: &IssuedSession,
    settings: CookieSettings,
) -> Result<(), HttpError> {
    for cookie in session.cookies(settings) {
        builder.append_header((header::SET_COOKIE, set_cookie_value(&cookie)?));
    }
    Ok(())
}

/// Overwrites the three session cookies on an already-built response.
pub fn write_session_cookies<B>(
    res: &mut HttpResponse<B>,
    session: &IssuedSession,
    settings: CookieSettings,
) -> Result<(), HttpError> {
    for cookie in session.cookies(settings) {
        res.headers_mut()
            .append(header::SET_COOKIE, set_cookie_value(&cookie)?);
    }
    Ok(())
}

/// Adds expired copies of the three session cookies to a response being built.
pub fn clear_session_cookies(builder: &mut HttpResponseBuilder, settings: CookieSettings) {
    let expired = OffsetDateTime::UNIX_EPOCH;
    for (name, http_only) in [
        (ACCESS_TOKEN_COOKIE, true),
        (REFRESH_TOKEN_COOKIE, true),
        (USER_COOKIE, false),
    ] {
        builder.cookie(
            Cookie::build(name, "")
                .path("/")
                .http_only(http_only)
                .secure(settings.secure)
                .same_site(SameSite::Lax)
                .expires(expired)
                .finish(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use chrono::Duration;

    #[test]
    fn test_access_token_prefers_cookie() {
        let req = TestRequest::default()
            .cookie(Cookie::new(ACCESS_TOKEN_COOKIE, "from-cookie"))
            .insert_header((header::AUTHORIZATION, "Bearer from-header"))
            .to_http_request();
        assert_eq!(read_access_token(&req).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_access_token_falls_back_to_header() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer from-header"))
            .to_http_request();
        assert_eq!(read_access_token(&req).as_deref(), Some("from-header"));

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic dXNlcjpwYXNz"))
            .to_http_request();
        assert_eq!(read_access_token(&req), None);
    }

    #[test]
    fn test_refresh_token_never_read_from_header() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer refresh-in-header"))
            .to_http_request();
        assert_eq!(read_refresh_token(&req), None);

        let req = TestRequest::default()
            .cookie(Cookie::new(REFRESH_TOKEN_COOKIE, "refresh"))
            .to_http_request();
        assert_eq!(read_refresh_token(&req).as_deref(), Some("refresh"));
    }

    #[test]
    fn test_cookie_attributes() {
        let expires_at = Utc::now() + Duration::hours(1);
        let settings = CookieSettings { secure: true };

        let token = token_cookie(ACCESS_TOKEN_COOKIE, "abc", expires_at, settings);
        assert_eq!(token.http_only(), Some(true));
        assert_eq!(token.path(), Some("/"));
        assert_eq!(token.secure(), Some(true));
        assert_eq!(
            token.expires_datetime().map(|at| at.unix_timestamp()),
            Some(expires_at.timestamp())
        );

        let user = user_cookie("Alice", expires_at, settings);
        assert_ne!(user.http_only(), Some(true));
        assert_eq!(user.value(), "Alice");
    }

    #[test]
    fn test_write_session_cookies() {
        let tokens = TokenService::new("access", "refresh");
        let session = issue_session(&tokens, "alice", "Alice").unwrap();
        let mut res = HttpResponse::Ok().finish();
        write_session_cookies(&mut res, &session, CookieSettings::default()).unwrap();

        let names: Vec<String> = res.cookies().map(|c| c.name().to_string()).collect();
        assert_eq!(names.len(), 3);
        assert!(names.contains(&ACCESS_TOKEN_COOKIE.to_string()));
        assert!(names.contains(&REFRESH_TOKEN_COOKIE.to_string()));
        assert!(names.contains(&USER_COOKIE.to_string()));
    }

    #[test]
    fn test_display_name_is_percent_encoded() {
        let tokens = TokenService::new("access", "refresh");
        let session = issue_session(&tokens, "carol", "Carol\nSmith; Max-Age=0").unwrap();
        let mut builder = HttpResponse::Ok();
        set_session_cookies(&mut builder, &session, CookieSettings::default()).unwrap();
        let res = builder.finish();

        let raw: Vec<&str> = res
            .headers()
            .get_all(header::SET_COOKIE)
            .map(|value| value.to_str().unwrap())
            .collect();
        assert_eq!(raw.len(), 3);
        let user = raw
            .iter()
            .find(|value| value.starts_with("user="))
            .expect("user cookie");
        assert!(user.starts_with("user=Carol%0ASmith%3B%20Max-Age%3D0;"));
        assert!(!user.contains("Max-Age=0"));

        let decoded = res
            .cookies()
            .find(|c| c.name() == USER_COOKIE)
            .map(|c| c.value().to_string());
        assert_eq!(decoded.as_deref(), Some("Carol\nSmith; Max-Age=0"));
    }

    #[test]
    fn test_display_name_read_back_decoded() {
        let req = TestRequest::default()
            .insert_header((header::COOKIE, "user=Alice%20Liddell"))
            .to_http_request();
        assert_eq!(read_display_name(&req).as_deref(), Some("Alice Liddell"));

        let req = TestRequest::default().to_http_request();
        assert_eq!(read_display_name(&req), None);
    }
}
