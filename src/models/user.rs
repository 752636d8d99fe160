use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::auth::password::{validate_password, validate_username};
use crate::models::truncate_chars;

/// Longest display name kept for a user.
pub const MAX_USER_NAME_CHARS: usize = 40;

/// A registered account. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub email: String,
    pub is_admin: bool,
    pub created_ts: DateTime<Utc>,
    pub last_login_ts: Option<DateTime<Utc>>,
}

impl User {
    /// The value shown to the browser in the display-only `user` cookie.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.username
        } else {
            &self.name
        }
    }
}

/// Body of `POST /users`.
#[derive(Debug, Deserialize, Validate)]
pub struct NewUserRequest {
    #[serde(default)]
    pub name: String,
    #[validate(custom = "validate_username")]
    pub username: String,
    #[validate(custom = "validate_password")]
    pub password: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl NewUserRequest {
    /// Trims and lower-cases username and email, and fills in the display
    /// name. Runs before validation so the policy sees the stored form.
    pub fn normalized(mut self) -> Self {
        self.username = self.username.trim().to_lowercase();
        self.email = self.email.trim().to_lowercase();
        let name = self.name.trim();
        let name = if name.is_empty() { self.username.as_str() } else { name };
        self.name = truncate_chars(name, MAX_USER_NAME_CHARS);
        self
    }

    pub fn into_user(self, password_hash: String, is_admin: bool) -> User {
        User {
            id: Uuid::new_v4(),
            name: self.name,
            username: self.username,
            password_hash,
            email: self.email,
            is_admin,
            created_ts: Utc::now(),
            last_login_ts: None,
        }
    }
}

/// Body of `PUT /users/{id}`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(custom = "validate_password")]
    pub password: Option<String>,
    pub is_admin: Option<bool>,
}

impl UpdateUserRequest {
    pub fn normalized(mut self) -> Self {
        self.email = self.email.map(|email| email.trim().to_lowercase());
        self.name = self
            .name
            .map(|name| truncate_chars(name.trim(), MAX_USER_NAME_CHARS));
        self
    }
}
