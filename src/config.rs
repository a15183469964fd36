// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read once from the environment at startup into an
//! immutable [`AppConfig`] and passed to constructors. A `.env` file in the
//! working directory is loaded first if present.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `JWT_SECRET_KEY` | HS256 signing secret for session tokens | Required |
//! | `DATABASE_PATH` | redb database file | `data/hospital.redb` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_TTL_SECONDS` | Session token lifetime (at most one year) | `86400` |
//! | `BCRYPT_COST` | bcrypt work factor (4-31) | `12` |
//! | `REQUEST_TIMEOUT_SECS` | Per-request timeout | `30` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::auth::password::{MAX_COST, MIN_COST};
use crate::auth::token::{DEFAULT_TOKEN_TTL_SECONDS, MAX_TOKEN_TTL_SECONDS};

/// Environment variable name for the token signing secret.
pub const JWT_SECRET_KEY_ENV: &str = "JWT_SECRET_KEY";

/// Environment variable name for the database file path.
pub const DATABASE_PATH_ENV: &str = "DATABASE_PATH";

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the session lifetime in seconds.
pub const JWT_TTL_SECONDS_ENV: &str = "JWT_TTL_SECONDS";

/// Environment variable name for the bcrypt cost.
///
/// Lower costs make hashing faster and weaker. Never go below the default
/// in production.
pub const BCRYPT_COST_ENV: &str = "BCRYPT_COST";

pub const REQUEST_TIMEOUT_SECS_ENV: &str = "REQUEST_TIMEOUT_SECS";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_DATABASE_PATH: &str = "data/hospital.redb";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BCRYPT_COST: u32 = 12;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

#[derive(Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub database_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub token_ttl: chrono::Duration,
    pub bcrypt_cost: u32,
    pub request_timeout: Duration,
    pub log_format: LogFormat,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("jwt_secret", &"<redacted>")
            .field("database_path", &self.database_path)
            .field("bind_addr", &self.bind_addr)
            .field("token_ttl", &self.token_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("request_timeout", &self.request_timeout)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup(JWT_SECRET_KEY_ENV)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing(JWT_SECRET_KEY_ENV))?;

        let database_path = lookup(DATABASE_PATH_ENV)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string())
            .into();

        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port: u16 = parse_or(&lookup, PORT_ENV, DEFAULT_PORT)?;
        let bind_addr = format!("{host}:{port}")
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: HOST_ENV,
                reason: e.to_string(),
            })?;

        let ttl_seconds: i64 = parse_or(&lookup, JWT_TTL_SECONDS_ENV, DEFAULT_TOKEN_TTL_SECONDS)?;
        let token_ttl = Some(ttl_seconds)
            .filter(|secs| (1..=MAX_TOKEN_TTL_SECONDS).contains(secs))
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| ConfigError::Invalid {
                name: JWT_TTL_SECONDS_ENV,
                reason: format!("must be between 1 and {MAX_TOKEN_TTL_SECONDS}"),
            })?;

        let bcrypt_cost: u32 = parse_or(&lookup, BCRYPT_COST_ENV, DEFAULT_BCRYPT_COST)?;
        if !(MIN_COST..=MAX_COST).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                name: BCRYPT_COST_ENV,
                reason: format!("must be between {MIN_COST} and {MAX_COST}"),
            });
        }

        let timeout_secs: u64 =
            parse_or(&lookup, REQUEST_TIMEOUT_SECS_ENV, DEFAULT_REQUEST_TIMEOUT_SECS)?;

        let log_format = match lookup(LOG_FORMAT_ENV).as_deref() {
            None | Some("") | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    reason: format!("expected json or pretty, got {other}"),
                })
            }
        };

        Ok(Self {
            jwt_secret,
            database_path,
            bind_addr,
            token_ttl,
            bcrypt_cost,
            request_timeout: Duration::from_secs(timeout_secs),
            log_format,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) if value.is_empty() => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
    }
}
