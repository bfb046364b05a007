use chrono::Duration;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::auth::password::{DEFAULT_COST, MIN_COST};

const DEFAULT_TOKEN_HOURS: i64 = 1;
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
const MAX_HASH_COST: u32 = 31;
const ENV_FILE: &str = ".env";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingVar(&'static str),

    #[error("API_SECRET must not be empty")]
    EmptySecret,

    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("BCRYPT_COST must be between {min} and {max}, got {value}")]
    HashCostOutOfRange { min: u32, max: u32, value: i64 },

    #[error("failed to read env file: {0}")]
    EnvFile(String),
}

/// Process-wide settings, read once at startup and passed to constructors.
#[derive(Clone)]
pub struct AppConfig {
    pub api_secret: String,
    pub token_ttl: Duration,
    pub password_hash_cost: u32,
    pub database_url: Option<String>,
    pub bind_address: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("password_hash_cost", &self.password_hash_cost)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("bind_address", &self.bind_address)
            .finish()
    }
}

impl AppConfig {
    /// Startup entry point: the process environment plus `./.env` if present.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_env_file(ENV_FILE)
    }

    /// Loads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the configuration from the process environment with `path` as a
    /// fallback source. Variables already set in the environment win, and a
    /// missing file is the same as an empty one.
    pub fn from_env_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file_vars = read_env_file(path.as_ref())?;
        Self::from_lookup(|name| {
            std::env::var(name)
                .ok()
                .or_else(|| file_vars.get(name).cloned())
        })
    }

    /// Builds the configuration from an arbitrary variable lookup so tests
    /// don't have to touch the real environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_secret = lookup("API_SECRET").ok_or(ConfigError::MissingVar("API_SECRET"))?;
        if api_secret.trim().is_empty() {
            return Err(ConfigError::EmptySecret);
        }

        // TOKEN_TTL_SECONDS wins over the hour-granular setting
        let token_ttl = match lookup("TOKEN_TTL_SECONDS") {
            Some(raw) => Duration::seconds(parse_positive("TOKEN_TTL_SECONDS", &raw)?),
            None => match lookup("TOKEN_HOUR_LIFESPAN") {
                Some(raw) => Duration::hours(parse_positive("TOKEN_HOUR_LIFESPAN", &raw)?),
                None => Duration::hours(DEFAULT_TOKEN_HOURS),
            },
        };

        let password_hash_cost = match lookup("BCRYPT_COST") {
            Some(raw) => {
                let value = parse_positive("BCRYPT_COST", &raw)?;
                u32::try_from(value)
                    .ok()
                    .filter(|cost| (MIN_COST..=MAX_HASH_COST).contains(cost))
                    .ok_or(ConfigError::HashCostOutOfRange {
                        min: MIN_COST,
                        max: MAX_HASH_COST,
                        value,
                    })?
            }
            None => DEFAULT_COST,
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let bind_address =
            lookup("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        Ok(Self {
            api_secret,
            token_ttl,
            password_hash_cost,
            database_url,
            bind_address,
        })
    }
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let entries = match dotenv::from_path_iter(path) {
        Ok(entries) => entries,
        Err(e) if e.not_found() => {
            debug!(path = %path.display(), "No env file found");
            return Ok(HashMap::new());
        }
        Err(e) => return Err(ConfigError::EnvFile(e.to_string())),
    };

    let vars = entries
        .collect::<Result<HashMap<_, _>, _>>()
        .map_err(|e| ConfigError::EnvFile(e.to_string()))?;
    debug!(path = %path.display(), count = vars.len(), "Loaded env file");
    Ok(vars)
}

fn parse_positive(name: &'static str, raw: &str) -> Result<i64, ConfigError> {
    match raw.trim().parse::<i64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidNumber {
            name,
            value: raw.to_string(),
        }),
    }
}
