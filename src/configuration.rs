use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("환경 변수 {0} 가 설정되어야 합니다")]
    Missing(&'static str),
    #[error("환경 변수 {name} 의 값이 올바르지 않습니다: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Process-wide settings, loaded once at startup and handed to every component.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub auth: AuthConfig,
    pub bootstrap_admin: Option<AdminCredentials>,
    pub seed_sample_data: bool,
    pub cors_allowed_origin: Option<String>,
}

/// Secrets used by the authorization gate.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub external_api_key: String,
    pub token_ttl_hours: i64,
}

// secrets stay out of logs
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"***")
            .field("external_api_key", &"***")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .finish()
    }
}

#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 8;

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds settings from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let port = match lookup("APP_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { name: "APP_PORT", value: raw })?,
            None => 3000,
        };

        let token_ttl_hours = match lookup("TOKEN_TTL_HOURS") {
            Some(raw) => match raw.parse::<i64>() {
                Ok(hours) if hours > 0 => hours,
                _ => return Err(ConfigError::Invalid { name: "TOKEN_TTL_HOURS", value: raw }),
            },
            None => DEFAULT_TOKEN_TTL_HOURS,
        };

        let seed_sample_data = match lookup("SEED_SAMPLE_DATA") {
            Some(raw) => parse_flag(&raw)
                .ok_or(ConfigError::Invalid { name: "SEED_SAMPLE_DATA", value: raw })?,
            None => false,
        };

        let bootstrap_admin = match (
            lookup("BOOTSTRAP_ADMIN_USERNAME"),
            lookup("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(AdminCredentials { username, password })
            }
            _ => None,
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://timesheet.db?mode=rwc".to_string()),
            host: lookup("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            auth: AuthConfig {
                jwt_secret: required("JWT_SECRET")?,
                external_api_key: required("EXTERNAL_API_KEY")?,
                token_ttl_hours,
            },
            bootstrap_admin,
            seed_sample_data,
            cors_allowed_origin: lookup("CORS_ALLOWED_ORIGIN").filter(|v| !v.is_empty()),
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
