use std::env;
use std::fmt;
use std::time::Duration;

/// Process-wide configuration, loaded once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret_key: String,
    pub jwt_refresh_secret_key: String,
    pub secure_cookies: bool,
    pub storage_timeout: Duration,
    pub cors_allowed_origin: Option<String>,
    pub admin: Option<AdminSeed>,
}

/// Credentials for the administrator created at startup when absent.
#[derive(Clone)]
pub struct AdminSeed {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSeed")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str, String),
    SharedSecrets,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(var) => write!(f, "{} must be set", var),
            ConfigError::Invalid(var, value) => write!(f, "{} has an invalid value: {}", var, value),
            ConfigError::SharedSecrets => write!(
                f,
                "JWT_SECRET_KEY and JWT_REFRESH_SECRET_KEY must be different"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

fn required(var: &'static str) -> Result<String, ConfigError> {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(var)),
    }
}

fn optional(var: &str) -> Option<String> {
    env::var(var).ok().filter(|value| !value.trim().is_empty())
}

fn parsed<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(var) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(var, raw)),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret_key = required("JWT_SECRET_KEY")?;
        let jwt_refresh_secret_key = required("JWT_REFRESH_SECRET_KEY")?;
        if jwt_secret_key == jwt_refresh_secret_key {
            return Err(ConfigError::SharedSecrets);
        }

        let admin = match (optional("ADMIN_USERNAME"), optional("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some(AdminSeed {
                email: optional("ADMIN_EMAIL")
                    .unwrap_or_else(|| format!("{}@localhost.localdomain", username)),
                username,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            database_url: optional("DATABASE_URL"),
            server_port: parsed("SERVER_PORT", 8080)?,
            server_host: optional("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            jwt_secret_key,
            jwt_refresh_secret_key,
            secure_cookies: parsed("SECURE_COOKIES", false)?,
            storage_timeout: Duration::from_secs(parsed("STORAGE_TIMEOUT_SECS", 5)?),
            cors_allowed_origin: optional("CORS_ALLOWED_ORIGIN"),
            admin,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
