//! Configuration loaded from environment variables.

use std::env;
use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::filtering::PaginationConfig;
use crate::store::RemovalPolicy;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Sea-ORM connection URL (default: `sqlite::memory:`).
    pub database_url: String,

    /// Address the HTTP server binds to (default: `0.0.0.0:3000`).
    pub bind_addr: String,

    /// Public origin used in HAL links (default: `http://localhost`).
    pub public_base_url: String,

    /// Default and maximum page sizes (defaults: 10 and 100).
    pub pagination: PaginationConfig,

    /// What removing a category with children does (default: cascade).
    pub removal_policy: RemovalPolicy,
}

/// An environment variable holding an unusable value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub variable: &'static str,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.variable, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            bind_addr: "0.0.0.0:3000".to_string(),
            public_base_url: "http://localhost".to_string(),
            pagination: PaginationConfig::default(),
            removal_policy: RemovalPolicy::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns the first variable that cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// Returns the first variable that cannot be parsed, or inconsistent page sizes.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let database_url = lookup("DATABASE_URL").unwrap_or(defaults.database_url);
        let bind_addr = lookup("BIND_ADDR").unwrap_or(defaults.bind_addr);

        let public_base_url = lookup("PUBLIC_BASE_URL").unwrap_or(defaults.public_base_url);
        Url::parse(&public_base_url).map_err(|err| ConfigError {
            variable: "PUBLIC_BASE_URL",
            message: err.to_string(),
        })?;

        let default_limit = parse_var(
            &lookup,
            "CATEGORY_DEFAULT_LIMIT",
            defaults.pagination.default_limit,
        )?;
        let max_limit = parse_var(&lookup, "CATEGORY_MAX_LIMIT", defaults.pagination.max_limit)?;
        if default_limit == 0 {
            return Err(ConfigError {
                variable: "CATEGORY_DEFAULT_LIMIT",
                message: "must be greater than zero".to_string(),
            });
        }
        if max_limit < default_limit {
            return Err(ConfigError {
                variable: "CATEGORY_MAX_LIMIT",
                message: format!("must be at least CATEGORY_DEFAULT_LIMIT ({default_limit})"),
            });
        }

        let removal_policy = parse_var(
            &lookup,
            "CATEGORY_REMOVAL_POLICY",
            defaults.removal_policy,
        )?;

        Ok(Self {
            database_url,
            bind_addr,
            public_base_url,
            pagination: PaginationConfig {
                default_limit,
                max_limit,
            },
            removal_policy,
        })
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    variable: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(variable) {
        Some(raw) => raw.trim().parse().map_err(|err: T::Err| ConfigError {
            variable,
            message: err.to_string(),
        }),
        None => Ok(default),
    }
}
