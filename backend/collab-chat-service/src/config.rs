use crate::error::AppError;
use crate::services::conversation_service::{
    ServiceLimits, DEFAULT_MAX_MESSAGE_LENGTH, DEFAULT_PAGE_LIMIT_MAX,
};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            other => Err(AppError::Config(format!(
                "STORE_BACKEND must be 'postgres' or 'memory', got {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Key material for bearer token validation
#[derive(Clone)]
pub enum JwtKey {
    /// HS256 shared secret
    Secret(String),
    /// RS256 public key
    RsaPublicPem(String),
}

impl std::fmt::Debug for JwtKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtKey::Secret(_) => f.write_str("Secret(<redacted>)"),
            JwtKey::RsaPublicPem(_) => f.write_str("RsaPublicPem(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub service_name: String,
    pub environment: String,
    pub port: u16,
    pub store_backend: StoreBackend,
    /// Present whenever the Postgres backend is selected
    pub database: Option<DatabaseConfig>,
    pub jwt_key: JwtKey,
    pub limits: ServiceLimits,
    pub log_format: LogFormat,
}

fn parse_or<T: FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{key} has invalid value {raw:?}"))),
        _ => Ok(default),
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let store_backend = match non_empty("STORE_BACKEND") {
            Some(raw) => raw.parse()?,
            None => StoreBackend::Postgres,
        };

        let database = match store_backend {
            StoreBackend::Postgres => {
                let url = non_empty("DATABASE_URL")
                    .ok_or_else(|| AppError::Config("DATABASE_URL missing".into()))?;
                Some(DatabaseConfig {
                    url,
                    max_connections: parse_or("DB_MAX_CONNECTIONS", 20)?,
                    min_connections: parse_or("DB_MIN_CONNECTIONS", 2)?,
                    acquire_timeout_secs: parse_or("DB_ACQUIRE_TIMEOUT_SECS", 10)?,
                })
            }
            StoreBackend::Memory => None,
        };

        let jwt_key = match (non_empty("JWT_SECRET"), non_empty("JWT_PUBLIC_KEY_PEM")) {
            (_, Some(pem)) => JwtKey::RsaPublicPem(pem),
            (Some(secret), None) => JwtKey::Secret(secret),
            (None, None) => {
                return Err(AppError::Config(
                    "JWT_SECRET or JWT_PUBLIC_KEY_PEM must be set".into(),
                ))
            }
        };

        let limits = ServiceLimits {
            max_message_length: parse_or("MAX_MESSAGE_LENGTH", DEFAULT_MAX_MESSAGE_LENGTH)?,
            page_limit_max: parse_or("MESSAGE_PAGE_LIMIT_MAX", DEFAULT_PAGE_LIMIT_MAX)?,
        };
        if limits.max_message_length == 0 || limits.page_limit_max == 0 {
            return Err(AppError::Config(
                "MAX_MESSAGE_LENGTH and MESSAGE_PAGE_LIMIT_MAX must be positive".into(),
            ));
        }

        Ok(Self {
            service_name: non_empty("SERVICE_NAME")
                .unwrap_or_else(|| "collab-chat-service".to_string()),
            environment: non_empty("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            port: parse_or("PORT", 8080)?,
            store_backend,
            database,
            jwt_key,
            limits,
            log_format: non_empty("LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or_default(),
        })
    }

    /// In-memory configuration for tests
    pub fn test_defaults() -> Self {
        Self {
            service_name: "collab-chat-service".into(),
            environment: "test".into(),
            port: 8080,
            store_backend: StoreBackend::Memory,
            database: None,
            jwt_key: JwtKey::Secret("test-secret".into()),
            limits: ServiceLimits::default(),
            log_format: LogFormat::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "STORE_BACKEND",
        "DATABASE_URL",
        "DB_MAX_CONNECTIONS",
        "JWT_SECRET",
        "JWT_PUBLIC_KEY_PEM",
        "MAX_MESSAGE_LENGTH",
        "MESSAGE_PAGE_LIMIT_MAX",
        "PORT",
        "LOG_FORMAT",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_memory_backend_with_defaults() {
        clear_env();
        env::set_var("STORE_BACKEND", "memory");
        env::set_var("JWT_SECRET", "s3cret");

        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.store_backend, StoreBackend::Memory);
        assert!(cfg.database.is_none());
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.limits.max_message_length, 5000);
        assert_eq!(cfg.limits.page_limit_max, 100);
        assert!(matches!(cfg.jwt_key, JwtKey::Secret(_)));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_postgres_backend_requires_database_url() {
        clear_env();
        env::set_var("STORE_BACKEND", "postgres");
        env::set_var("JWT_SECRET", "s3cret");

        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("DATABASE_URL")));

        env::set_var("DATABASE_URL", "postgres://localhost/collab");
        env::set_var("DB_MAX_CONNECTIONS", "5");
        let cfg = Config::from_env().unwrap();
        let db = cfg.database.unwrap();
        assert_eq!(db.max_connections, 5);
        assert_eq!(db.min_connections, 2);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_jwt_key_required() {
        clear_env();
        env::set_var("STORE_BACKEND", "memory");
        assert!(matches!(Config::from_env(), Err(AppError::Config(_))));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_number_is_rejected() {
        clear_env();
        env::set_var("STORE_BACKEND", "memory");
        env::set_var("JWT_SECRET", "s3cret");
        env::set_var("MAX_MESSAGE_LENGTH", "lots");

        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("MAX_MESSAGE_LENGTH")));
        clear_env();
    }

    #[test]
    fn test_unknown_backend() {
        assert!("sqlite".parse::<StoreBackend>().is_err());
        assert_eq!("Memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
    }
}
