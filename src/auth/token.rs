use std::fmt;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Lifetime of an access token.
pub const ACCESS_TOKEN_TTL_MINUTES: i64 = 60;
/// Lifetime of a refresh token.
pub const REFRESH_TOKEN_TTL_HOURS: i64 = 24;

/// Represents the claims encoded within a session token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token: the user's (normalized) username.
    pub sub: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Time left before expiry; negative once expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at() - now
    }
}

/// Which secret a token is signed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn ttl(self) -> Duration {
        match self {
            TokenKind::Access => Duration::minutes(ACCESS_TOKEN_TTL_MINUTES),
            TokenKind::Refresh => Duration::hours(REFRESH_TOKEN_TTL_HOURS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Signed with a different secret (or tampered with).
    InvalidSignature,
    Expired,
    Malformed(String),
    /// The secret is unavailable or encoding failed.
    Signing(String),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenError::InvalidSignature => write!(f, "Invalid token: signature mismatch"),
            TokenError::Expired => write!(f, "Invalid token: expired"),
            TokenError::Malformed(msg) => write!(f, "Invalid token: {}", msg),
            TokenError::Signing(msg) => write!(f, "Token signing failed: {}", msg),
        }
    }
}

impl std::error::Error for TokenError {}

/// A freshly signed token together with its declared expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Mints and verifies HS256 session tokens.
///
/// Tokens are self-contained: validity is purely a function of signature and
/// declared expiry, nothing is persisted. Access and refresh tokens use
/// distinct secrets so neither can stand in for the other.
#[derive(Clone)]
pub struct TokenService {
    access_secret: String,
    refresh_secret: String,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenService { .. }")
    }
}

impl TokenService {
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
        }
    }

    fn secret(&self, kind: TokenKind) -> &str {
        match kind {
            TokenKind::Access => &self.access_secret,
            TokenKind::Refresh => &self.refresh_secret,
        }
    }

    /// Signs an access token for `username`, valid for one hour.
    pub fn issue_access(&self, username: &str) -> Result<IssuedToken, TokenError> {
        self.sign(
            TokenKind::Access,
            username,
            Utc::now() + TokenKind::Access.ttl(),
        )
    }

    /// Signs a refresh token for `username`, valid for 24 hours.
    pub fn issue_refresh(&self, username: &str) -> Result<IssuedToken, TokenError> {
        self.sign(
            TokenKind::Refresh,
            username,
            Utc::now() + TokenKind::Refresh.ttl(),
        )
    }

    /// Signs a token of `kind` with an explicit expiry.
    pub fn sign(
        &self,
        kind: TokenKind,
        username: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let secret = self.secret(kind);
        if secret.is_empty() {
            return Err(TokenError::Signing(format!("{:?} secret not set", kind)));
        }

        let claims = Claims {
            sub: username.to_string(),
            exp: expires_at.timestamp(),
            iat: Utc::now().timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verifies the signature first, then the expiry.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret(kind).as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed(e.to_string()),
        })
    }
}
