use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Environment variable holding the token signing secret
pub const SECRET_KEY_VAR: &str = "JWT_SECRET_KEY";

/// Long-lived session default (7 days)
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 7;

/// Short-lived variant used by programmatic clients
pub const SHORT_TOKEN_TTL_MINUTES: i64 = 15;

/// Upper bound on any configured or requested token lifetime (one year)
pub const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    MissingSecret(&'static str),

    #[error("Missing configuration: {0}")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
}

/// Where the identity token travels on inbound requests.
/// A deployment picks exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialCarrier {
    Cookie { name: String },
    Bearer,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub carrier: CredentialCarrier,
    pub cookie_secure: bool,
    pub login_path: String,
    pub landing_path: String,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub enable_audit_logging: bool,
}

// Keep the secret out of Debug output
impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field("carrier", &self.carrier)
            .field("cookie_secure", &self.cookie_secure)
            .field("login_path", &self.login_path)
            .field("landing_path", &self.landing_path)
            .field("enable_cors", &self.enable_cors)
            .field("cors_origins", &self.cors_origins)
            .field("enable_audit_logging", &self.enable_audit_logging)
            .finish()
    }
}

impl SecurityConfig {
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.token_ttl_minutes.clamp(1, MAX_TOKEN_TTL_MINUTES))
    }

    /// Cookie name when the deployment uses cookie carriage
    pub fn cookie_name(&self) -> Option<&str> {
        match &self.carrier {
            CredentialCarrier::Cookie { name } => Some(name),
            CredentialCarrier::Bearer => None,
        }
    }
}

impl AppConfig {
    /// Build configuration from process environment. Fails when the signing
    /// secret is absent so the server never starts issuing unverifiable tokens.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let secret = lookup(SECRET_KEY_VAR)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingSecret(SECRET_KEY_VAR))?;

        Ok(Self::for_environment(environment, secret).with_overrides(&lookup))
    }

    /// Preset configuration for an environment with the given signing secret
    pub fn for_environment(environment: Environment, jwt_secret: impl Into<String>) -> Self {
        let mut config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        };
        config.security.jwt_secret = jwt_secret.into();
        config
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Database overrides
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Some(v) = lookup("PMS_PORT").or_else(|| lookup("PORT")) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Some(v) = lookup("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Security overrides
        if let Some(v) = lookup("SECURITY_TOKEN_TTL_MINUTES") {
            self.security.token_ttl_minutes = v
                .parse()
                .ok()
                .filter(|m: &i64| (1..=MAX_TOKEN_TTL_MINUTES).contains(m))
                .unwrap_or(self.security.token_ttl_minutes);
        }
        let cookie_name = lookup("SECURITY_COOKIE_NAME");
        match lookup("SECURITY_CREDENTIAL_CARRIER").as_deref() {
            Some("bearer") => self.security.carrier = CredentialCarrier::Bearer,
            Some("cookie") | None => {
                if let (CredentialCarrier::Cookie { name }, Some(v)) = (&mut self.security.carrier, cookie_name) {
                    *name = v;
                }
            }
            Some(other) => {
                tracing::warn!("Unknown credential carrier '{}', keeping {:?}", other, self.security.carrier);
            }
        }
        if let Some(v) = lookup("SECURITY_COOKIE_SECURE") {
            self.security.cookie_secure = v.parse().unwrap_or(self.security.cookie_secure);
        }
        if let Some(v) = lookup("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }
        if let Some(v) = lookup("SECURITY_ENABLE_AUDIT_LOGGING") {
            self.security.enable_audit_logging = v.parse().unwrap_or(self.security.enable_audit_logging);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                token_ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
                carrier: CredentialCarrier::Cookie { name: "access_token".to_string() },
                cookie_secure: false,
                login_path: "/login".to_string(),
                landing_path: "/dashboard".to_string(),
                enable_cors: false,
                cors_origins: vec!["http://localhost:3000".to_string()],
                enable_audit_logging: false,
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.security.cookie_secure = true;
        config.security.cors_origins = vec![];
        config.security.enable_audit_logging = true;
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.api.enable_request_logging = false;
        config.security.cookie_secure = true;
        config.security.cors_origins = vec![];
        config.security.enable_audit_logging = true;
        config
    }
}

impl DatabaseConfig {
    /// Database settings alone, for tooling that never touches tokens
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = AppConfig::development().database;
        config.url = env::var("DATABASE_URL").ok();
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            config.max_connections = v.parse().unwrap_or(config.max_connections);
        }
        if config.url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_secret_is_fatal() {
        let err = AppConfig::from_vars(vars(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret(SECRET_KEY_VAR)));

        let err = AppConfig::from_vars(vars(&[(SECRET_KEY_VAR, "   ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret(_)));
    }

    #[test]
    fn development_defaults() {
        let config = AppConfig::from_vars(vars(&[(SECRET_KEY_VAR, "s3cret")])).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.security.jwt_secret, "s3cret");
        assert_eq!(config.security.token_ttl_minutes, DEFAULT_TOKEN_TTL_MINUTES);
        assert_eq!(config.security.cookie_name(), Some("access_token"));
        assert!(!config.security.cookie_secure);
        assert_eq!(config.api.port, 3000);
    }

    #[test]
    fn production_preset_hardens_cookie() {
        let config = AppConfig::from_vars(vars(&[(SECRET_KEY_VAR, "x"), ("APP_ENV", "prod")])).unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert!(config.security.cookie_secure);
        assert!(config.security.enable_audit_logging);
    }

    #[test]
    fn overrides_apply_and_bad_values_fall_back() {
        let config = AppConfig::from_vars(vars(&[
            (SECRET_KEY_VAR, "x"),
            ("SECURITY_TOKEN_TTL_MINUTES", "15"),
            ("SECURITY_COOKIE_NAME", "pms_session"),
            ("PMS_PORT", "not-a-port"),
            ("SECURITY_CORS_ORIGINS", "https://a.example, https://b.example"),
        ]))
        .unwrap();
        assert_eq!(config.security.token_ttl_minutes, SHORT_TOKEN_TTL_MINUTES);
        assert_eq!(config.security.cookie_name(), Some("pms_session"));
        assert_eq!(config.api.port, 3000);
        assert_eq!(config.security.cors_origins.len(), 2);
    }

    #[test]
    fn out_of_range_ttl_keeps_preset() {
        for ttl in ["0", "-5", "1000000000000", "99999999999999999999"] {
            let config = AppConfig::from_vars(vars(&[(SECRET_KEY_VAR, "x"), ("SECURITY_TOKEN_TTL_MINUTES", ttl)])).unwrap();
            assert_eq!(config.security.token_ttl_minutes, DEFAULT_TOKEN_TTL_MINUTES, "{}", ttl);
        }

        let mut config = AppConfig::for_environment(Environment::Development, "x");
        config.security.token_ttl_minutes = i64::MAX;
        assert_eq!(config.security.token_ttl(), chrono::Duration::minutes(MAX_TOKEN_TTL_MINUTES));
    }

    #[test]
    fn bearer_carrier_has_no_cookie() {
        let config = AppConfig::from_vars(vars(&[(SECRET_KEY_VAR, "x"), ("SECURITY_CREDENTIAL_CARRIER", "bearer")])).unwrap();
        assert_eq!(config.security.carrier, CredentialCarrier::Bearer);
        assert_eq!(config.security.cookie_name(), None);
    }

    #[test]
    fn debug_output_redacts_secret() {
        let config = AppConfig::for_environment(Environment::Development, "top-secret");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("top-secret"));
    }
}
