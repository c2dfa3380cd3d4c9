//! Process configuration, read once at startup.

use std::net::SocketAddr;

use thiserror::Error;

use profiles_auth::HashingParams;
use profiles_observability::LogFormat;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SUPERUSER_NAME: &str = "admin";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is invalid: {message}")]
    Invalid { var: &'static str, message: String },

    #[error("{0} must be set together with BOOTSTRAP_SUPERUSER_EMAIL")]
    Incomplete(&'static str),
}

/// Superuser created at startup when no account uses `email` yet.
#[derive(Clone, PartialEq, Eq)]
pub struct BootstrapSuperuser {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl core::fmt::Debug for BootstrapSuperuser {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BootstrapSuperuser")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Postgres connection string; in-memory stores are used when absent.
    pub database_url: Option<String>,
    pub log_format: LogFormat,
    pub hashing: HashingParams,
    pub bootstrap_superuser: Option<BootstrapSuperuser>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_url: None,
            log_format: LogFormat::default(),
            hashing: HashingParams::default(),
            bootstrap_superuser: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                var: "BIND_ADDR",
                message: e.to_string(),
            })?;

        let log_format = match var("LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>().map_err(|e| ConfigError::Invalid {
                var: "LOG_FORMAT",
                message: e.to_string(),
            })?,
            None => LogFormat::default(),
        };

        let defaults = HashingParams::default();
        let hashing = HashingParams {
            memory_kib: parse_u32("ARGON2_MEMORY_KIB", var("ARGON2_MEMORY_KIB"), defaults.memory_kib)?,
            iterations: parse_u32("ARGON2_ITERATIONS", var("ARGON2_ITERATIONS"), defaults.iterations)?,
            parallelism: parse_u32("ARGON2_PARALLELISM", var("ARGON2_PARALLELISM"), defaults.parallelism)?,
        };

        let bootstrap_superuser = match var("BOOTSTRAP_SUPERUSER_EMAIL") {
            Some(email) => Some(BootstrapSuperuser {
                email,
                name: var("BOOTSTRAP_SUPERUSER_NAME")
                    .unwrap_or_else(|| DEFAULT_SUPERUSER_NAME.to_string()),
                password: var("BOOTSTRAP_SUPERUSER_PASSWORD")
                    .ok_or(ConfigError::Incomplete("BOOTSTRAP_SUPERUSER_PASSWORD"))?,
            }),
            None => None,
        };

        Ok(Self {
            bind_addr,
            database_url: var("DATABASE_URL"),
            log_format,
            hashing,
            bootstrap_superuser,
        })
    }
}

fn parse_u32(var: &'static str, raw: Option<String>, default: u32) -> Result<u32, ConfigError> {
    match raw {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var,
            message: format!("expected an unsigned integer, got '{raw}'"),
        }),
        None => Ok(default),
    }
}
