pub mod authorization;
pub mod extractors;
pub mod middleware;
pub mod password;
pub mod refresh;
pub mod session;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

// Re-export necessary items
pub use extractors::{CurrentUser, MaybeUser};
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use refresh::RefreshMiddleware;
pub use token::{Claims, TokenService};

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

impl LoginRequest {
    /// Usernames are stored lower-cased, so the lookup is too.
    pub fn normalized_username(&self) -> String {
        self.username.trim().to_lowercase()
    }
}

/// Body returned by a successful login. The same tokens are also set as cookies.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub refresh_token: String,
}
