use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub gate: GateConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres URL; `None` runs the server on the in-memory store
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub max_failed_login_attempts: u32,
    pub lockout_minutes: i64,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    pub onboarding_path: String,
    pub franchise_registration_path: String,
    pub franchisee_bypass_paths: Vec<String>,
    pub franchisor_bypass_paths: Vec<String>,
    /// Substring that lets any franchise registration page through
    pub franchise_registration_marker: String,
    pub franchise_creation_paths: Vec<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            onboarding_path: "/onboarding".to_string(),
            franchise_registration_path: "/franchisor/franchise-registration".to_string(),
            franchisee_bypass_paths: vec![
                "/onboarding/status".to_string(),
                "/onboarding/complete".to_string(),
                "/auth/logout".to_string(),
                "/auth/user".to_string(),
            ],
            franchisor_bypass_paths: vec!["/auth/logout".to_string(), "/auth/user".to_string()],
            franchise_registration_marker: "franchise-registration".to_string(),
            franchise_creation_paths: vec![
                "/franchises".to_string(),
                "/franchisor/franchises".to_string(),
            ],
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set in {0:?}")]
    MissingJwtSecret(Environment),
    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

/// One week
pub const MAX_LOCKOUT_MINUTES: i64 = 7 * 24 * 60;
/// One year
pub const MAX_JWT_EXPIRY_HOURS: u64 = 365 * 24;
pub const MAX_FAILED_LOGIN_ATTEMPTS: u32 = 100;

fn check_range(name: &'static str, value: i64, min: i64, max: i64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { name, value, min, max })
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    /// Refuse an empty signing key outside development and lockout or expiry
    /// settings that would disable the lock or overflow the clock
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environment != Environment::Development && self.security.jwt_secret.is_empty() {
            return Err(ConfigError::MissingJwtSecret(self.environment));
        }

        let security = &self.security;
        check_range("lockout_minutes", security.lockout_minutes, 1, MAX_LOCKOUT_MINUTES)?;
        check_range(
            "max_failed_login_attempts",
            i64::from(security.max_failed_login_attempts),
            1,
            i64::from(MAX_FAILED_LOGIN_ATTEMPTS),
        )?;
        check_range(
            "jwt_expiry_hours",
            i64::try_from(security.jwt_expiry_hours).unwrap_or(i64::MAX),
            1,
            MAX_JWT_EXPIRY_HOURS as i64,
        )?;
        Ok(())
    }

    fn with_env_overrides(mut self) -> Self {
        if let Some(port) = env::var("FRANCHISE_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|v| v.parse().ok())
        {
            self.server.port = port;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|url| !url.is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout_secs =
                v.parse().unwrap_or(self.database.connection_timeout_secs);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_MAX_FAILED_LOGIN_ATTEMPTS") {
            self.security.max_failed_login_attempts =
                v.parse().unwrap_or(self.security.max_failed_login_attempts);
        }
        if let Ok(v) = env::var("SECURITY_LOCKOUT_MINUTES") {
            self.security.lockout_minutes = v.parse().unwrap_or(self.security.lockout_minutes);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Gate overrides
        if let Ok(v) = env::var("GATE_ONBOARDING_PATH") {
            self.gate.onboarding_path = v;
        }
        if let Ok(v) = env::var("GATE_FRANCHISE_REGISTRATION_PATH") {
            self.gate.franchise_registration_path = v;
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 8000 },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout_secs: 30,
            },
            security: SecurityConfig {
                jwt_secret: "franchise-dev-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                max_failed_login_attempts: 5,
                lockout_minutes: 15,
                enable_cors: true,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
            gate: GateConfig::default(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 8000 },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout_secs: 10,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                max_failed_login_attempts: 5,
                lockout_minutes: 15,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            gate: GateConfig::default(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 8000 },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout_secs: 5,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 8,
                max_failed_login_attempts: 5,
                lockout_minutes: 15,
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            gate: GateConfig::default(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::development()
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
