use crate::error::AppError;
use bcrypt::{hash, verify};
use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

const BCRYPT_COST: u32 = 12;
const USERNAME_MIN_CHARS: usize = 4;
const USERNAME_MAX_CHARS: usize = 40;
const PASSWORD_MIN_CHARS: usize = 8;

lazy_static! {
    // Alphanumeric segments separated by single hyphens.
    static ref USERNAME_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9]+(?:-[a-zA-Z0-9]+)*$").unwrap();
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, BCRYPT_COST)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

/// A malformed stored hash counts as a mismatch, never as a server error,
/// so login cannot distinguish it from a wrong password.
pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    match verify(password, hashed_password) {
        Ok(matches) => matches,
        Err(e) => {
            log::warn!("Stored password hash could not be checked: {}", e);
            false
        }
    }
}

/// Runs `hash_password` on the blocking pool.
pub async fn hash_password_blocking(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::InternalServerError(format!("Task join error: {}", e)))?
}

/// Runs `verify_password` on the blocking pool.
pub async fn verify_password_blocking(password: String, hashed_password: String) -> bool {
    match tokio::task::spawn_blocking(move || verify_password(&password, &hashed_password)).await {
        Ok(matches) => matches,
        Err(e) => {
            log::error!("Password check task failed: {}", e);
            false
        }
    }
}

/// Username policy: 4-40 characters, starts with a letter, alphanumeric
/// segments separated by single hyphens. Expects the normalized form.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let length = username.chars().count();
    if !(USERNAME_MIN_CHARS..=USERNAME_MAX_CHARS).contains(&length) {
        return Err(policy_error("username_length", "username must be 4-40 characters"));
    }
    let starts_with_letter = username
        .chars()
        .next()
        .map(|c| c.is_alphabetic())
        .unwrap_or(false);
    if !starts_with_letter || !USERNAME_REGEX.is_match(username) {
        return Err(policy_error(
            "username_format",
            "username must start with a letter and contain letters, digits and single hyphens",
        ));
    }
    Ok(())
}

/// Password policy: at least 8 characters with a digit, an upper-case letter,
/// a lower-case letter and a symbol. `#` and `|` are never allowed.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let invalid = || {
        policy_error(
            "password_policy",
            "password needs 8+ characters with upper, lower, digit and symbol (no '#' or '|')",
        )
    };
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(invalid());
    }

    let (mut digit, mut upper, mut lower, mut symbol) = (false, false, false, false);
    for c in password.chars() {
        match c {
            '#' | '|' => return Err(invalid()),
            c if c.is_numeric() => digit = true,
            c if c.is_uppercase() => upper = true,
            c if c.is_lowercase() => lower = true,
            c if !c.is_alphanumeric() && !c.is_whitespace() && !c.is_control() => symbol = true,
            _ => {}
        }
    }

    if digit && upper && lower && symbol {
        Ok(())
    } else {
        Err(invalid())
    }
}

fn policy_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}
