use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// Service Configuration - Environment variables, optionally from `.env`
// ============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    /// Server-side cap on every statement
    pub statement_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    /// Present whenever `storage` is `Postgres`
    pub database: Option<DatabaseConfig>,
    pub auth_service_url: String,
    /// Cart clearing is skipped when unset
    pub cart_service_url: Option<String>,
    /// Emails are skipped when unset
    pub notification_service_url: Option<String>,
    pub collaborator_timeout: Duration,
    pub shutdown_timeout: Duration,
    /// Empty allows any origin
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let storage = match get("STORAGE_BACKEND") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "STORAGE_BACKEND",
                value,
            })?,
            None => StorageBackend::Postgres,
        };

        let database = match storage {
            StorageBackend::Postgres => Some(DatabaseConfig {
                url: get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
                max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", 10)?,
                acquire_timeout: Duration::from_secs(parse_or(
                    &get,
                    "DATABASE_ACQUIRE_TIMEOUT_SECS",
                    3,
                )?),
                statement_timeout: Duration::from_secs(parse_or(
                    &get,
                    "DATABASE_STATEMENT_TIMEOUT_SECS",
                    5,
                )?),
            }),
            StorageBackend::Memory => None,
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&get, "PORT", 8080)?,
            storage,
            database,
            auth_service_url: get("AUTH_SERVICE_URL")
                .ok_or(ConfigError::Missing("AUTH_SERVICE_URL"))?,
            cart_service_url: get("CART_SERVICE_URL"),
            notification_service_url: get("NOTIFICATION_SERVICE_URL"),
            collaborator_timeout: Duration::from_secs(parse_or(
                &get,
                "COLLABORATOR_TIMEOUT_SECS",
                5,
            )?),
            shutdown_timeout: Duration::from_secs(parse_or(&get, "SHUTDOWN_TIMEOUT_SECS", 5)?),
            cors_allowed_origins: parse_origins(get("CORS_ALLOWED_ORIGINS"))?,
        })
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Comma-separated origins; `*` or nothing means any origin.
fn parse_origins(value: Option<String>) -> Result<Vec<String>, ConfigError> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };

    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty() && *origin != "*")
        .map(|origin| match reqwest::Url::parse(origin) {
            Ok(url) if url.has_host() => Ok(origin.trim_end_matches('/').to_string()),
            _ => Err(ConfigError::Invalid {
                name: "CORS_ALLOWED_ORIGINS",
                value: origin.to_string(),
            }),
        })
        .collect()
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
