// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup and then injected into the components that need it.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `JWT_KEY` | Secret used to sign and verify identity tokens | Required |
//! | `DATA_DIR` | Directory holding the embedded database | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3000` |
//! | `TOKEN_TTL_SECONDS` | Token lifetime, `0` disables expiry, at most 10 years | `86400` |
//! | `PASSWORD_HASH_ITERATIONS` | Argon2 time cost (work factor) | Argon2 default |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;

/// Environment variable holding the token signing secret.
///
/// Absence is a fatal startup condition.
pub const JWT_KEY_ENV: &str = "JWT_KEY";

/// Environment variable name for the data directory path.
///
/// The redb database file `emargement.redb` is created inside it.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const TOKEN_TTL_ENV: &str = "TOKEN_TTL_SECONDS";
pub const HASH_ITERATIONS_ENV: &str = "PASSWORD_HASH_ITERATIONS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

/// Default token lifetime (24 hours).
pub const DEFAULT_TOKEN_TTL_SECONDS: u64 = 24 * 60 * 60;

/// Longest accepted token lifetime (10 years).
pub const MAX_TOKEN_TTL_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

/// Database file name inside `DATA_DIR`.
pub const DATABASE_FILE: &str = "emargement.redb";

/// Configuration errors. All of them abort startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Log output format selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Fully resolved process configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub data_dir: PathBuf,
    pub host: String,
    pub port: u16,
    /// Token lifetime in seconds. `None` means tokens never expire.
    pub token_ttl_seconds: Option<u64>,
    /// Argon2 time cost override.
    pub hash_iterations: Option<u32>,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup(JWT_KEY_ENV)
            .filter(|secret| !secret.trim().is_empty())
            .ok_or(ConfigError::Missing(JWT_KEY_ENV))?;

        let data_dir = lookup(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup(PORT_ENV) {
            Some(raw) => parse_var(PORT_ENV, &raw)?,
            None => DEFAULT_PORT,
        };

        let token_ttl_seconds = match lookup(TOKEN_TTL_ENV) {
            Some(raw) => match parse_var::<u64>(TOKEN_TTL_ENV, &raw)? {
                0 => None,
                ttl if ttl > MAX_TOKEN_TTL_SECONDS => {
                    return Err(ConfigError::Invalid {
                        name: TOKEN_TTL_ENV,
                        value: raw,
                    })
                }
                ttl => Some(ttl),
            },
            None => Some(DEFAULT_TOKEN_TTL_SECONDS),
        };

        let hash_iterations = lookup(HASH_ITERATIONS_ENV)
            .map(|raw| parse_var(HASH_ITERATIONS_ENV, &raw))
            .transpose()?;

        let log_format = match lookup(LOG_FORMAT_ENV).as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            jwt_secret,
            data_dir,
            host,
            port,
            token_ttl_seconds,
            hash_iterations,
            log_format,
        })
    }

    /// Path of the embedded database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn missing_secret_is_fatal() {
        let result = load(&[]);
        assert!(matches!(result, Err(ConfigError::Missing(JWT_KEY_ENV))));

        let result = load(&[(JWT_KEY_ENV, "   ")]);
        assert!(matches!(result, Err(ConfigError::Missing(JWT_KEY_ENV))));
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[(JWT_KEY_ENV, "secret")]).unwrap();
        assert_eq!(config.jwt_secret, "secret");
        assert_eq!(config.port, 3000);
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.token_ttl_seconds, Some(DEFAULT_TOKEN_TTL_SECONDS));
        assert_eq!(config.hash_iterations, None);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.database_path(), PathBuf::from("./data/emargement.redb"));
    }

    #[test]
    fn zero_ttl_disables_expiry() {
        let config = load(&[(JWT_KEY_ENV, "secret"), (TOKEN_TTL_ENV, "0")]).unwrap();
        assert_eq!(config.token_ttl_seconds, None);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let result = load(&[(JWT_KEY_ENV, "secret"), (PORT_ENV, "http")]);
        assert!(matches!(result, Err(ConfigError::Invalid { name: PORT_ENV, .. })));

        let result = load(&[(JWT_KEY_ENV, "secret"), (LOG_FORMAT_ENV, "xml")]);
        assert!(matches!(result, Err(ConfigError::Invalid { name: LOG_FORMAT_ENV, .. })));
    }

    #[test]
    fn token_ttl_is_bounded() {
        let max = MAX_TOKEN_TTL_SECONDS.to_string();
        let config = load(&[(JWT_KEY_ENV, "secret"), (TOKEN_TTL_ENV, max.as_str())]).unwrap();
        assert_eq!(config.token_ttl_seconds, Some(MAX_TOKEN_TTL_SECONDS));

        let too_long = (MAX_TOKEN_TTL_SECONDS + 1).to_string();
        for raw in [too_long, i64::MAX.to_string(), u64::MAX.to_string()] {
            let result = load(&[(JWT_KEY_ENV, "secret"), (TOKEN_TTL_ENV, raw.as_str())]);
            assert!(
                matches!(result, Err(ConfigError::Invalid { name: TOKEN_TTL_ENV, .. })),
                "TTL {raw} accepted"
            );
        }
    }

    #[test]
    fn json_log_format() {
        let config = load(&[(JWT_KEY_ENV, "secret"), (LOG_FORMAT_ENV, "json")]).unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
    }
}
