// Runtime configuration loaded from the environment
// A `.env` file is honoured when present (see main.rs)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while reading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Login lockout policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    /// Failed attempts at which the account becomes locked
    pub max_attempts: i32,
    /// How long a locked account stays locked after its last failure
    pub window: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Root directory for uploaded documents
    pub storage_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub lockout: LockoutPolicy,
    pub download_token_ttl: Duration,
    pub cleanup_interval: Duration,
    /// API key stored on startup when no key exists yet
    pub bootstrap_api_key: Option<String>,
}

impl AppConfig {
    /// Read the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through an arbitrary lookup function
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let defaults = LockoutPolicy::default();

        Ok(Self {
            database_url,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 8080)?,
            storage_dir: lookup("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("Public")),
            max_upload_bytes: positive_or(&lookup, "MAX_UPLOAD_BYTES", 512 * 1024 * 1024)?,
            lockout: LockoutPolicy {
                max_attempts: positive_or(&lookup, "LOCKOUT_MAX_ATTEMPTS", defaults.max_attempts)?,
                window: Duration::from_secs(parse_or(
                    &lookup,
                    "LOCKOUT_WINDOW_SECS",
                    defaults.window.as_secs(),
                )?),
            },
            download_token_ttl: Duration::from_secs(positive_or(&lookup, "DOWNLOAD_TOKEN_TTL_SECS", 3600)?),
            cleanup_interval: Duration::from_secs(positive_or(&lookup, "CLEANUP_INTERVAL_SECS", 3600)?),
            bootstrap_api_key: lookup("BOOTSTRAP_API_KEY").filter(|key| !key.is_empty()),
        })
    }

    /// Address the HTTP listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

/// Like `parse_or`, but zero and negative values are rejected
fn positive_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + PartialOrd + Default,
{
    let value = parse_or(lookup, name, default)?;
    if value > T::default() {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            name,
            value: lookup(name).unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://db/medscope")])).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.storage_dir, PathBuf::from("Public"));
        assert_eq!(config.lockout.max_attempts, 5);
        assert_eq!(config.lockout.window, Duration::from_secs(86_400));
        assert_eq!(config.download_token_ttl, Duration::from_secs(3600));
        assert!(config.bootstrap_api_key.is_none());
    }

    #[test]
    fn test_database_url_required() {
        let result = AppConfig::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(ConfigError::Missing("DATABASE_URL"))));
    }

    #[test]
    fn test_invalid_number_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/medscope"),
            ("PORT", "eighty"),
        ]));
        match result {
            Err(ConfigError::Invalid { name, value }) => {
                assert_eq!(name, "PORT");
                assert_eq!(value, "eighty");
            }
            other => panic!("Expected invalid PORT, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_and_negative_limits_rejected() {
        let cases = [
            ("CLEANUP_INTERVAL_SECS", "0"),
            ("DOWNLOAD_TOKEN_TTL_SECS", "0"),
            ("LOCKOUT_MAX_ATTEMPTS", "-1"),
            ("LOCKOUT_MAX_ATTEMPTS", "0"),
            ("MAX_UPLOAD_BYTES", "0"),
        ];
        for (key, raw) in cases {
            let result = AppConfig::from_lookup(lookup_from(&[
                ("DATABASE_URL", "postgres://db/medscope"),
                (key, raw),
            ]));
            match result {
                Err(ConfigError::Invalid { name, value }) => {
                    assert_eq!(name, key);
                    assert_eq!(value, raw);
                }
                other => panic!("Expected {}={} to be rejected, got {:?}", key, raw, other),
            }
        }
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/medscope"),
            ("PORT", "9000"),
            ("LOCKOUT_MAX_ATTEMPTS", "3"),
            ("LOCKOUT_WINDOW_SECS", "60"),
            ("BOOTSTRAP_API_KEY", "seed-key"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.lockout, LockoutPolicy { max_attempts: 3, window: Duration::from_secs(60) });
        assert_eq!(config.bootstrap_api_key.as_deref(), Some("seed-key"));
    }
}
