//! Configuration module for the BioPage backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Longest allowed standard session: one year.
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// Raised when an environment variable is set but cannot be parsed.
#[derive(Debug, Error)]
#[error("Invalid value for {key}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub reason: String,
}

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Plain or JSON log lines
    pub log_format: LogFormat,
    /// Directory uploaded avatars are written to and served from
    pub avatar_dir: PathBuf,
    /// Externally visible base URL, used to build avatar URLs
    pub public_url: String,
    /// Lifetime of a standard session
    pub session_ttl_hours: i64,
    /// Largest accepted avatar upload
    pub max_avatar_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let public_url = env::var("BIOPAGE_PUBLIC_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            db_path: env::var("BIOPAGE_DB_PATH")
                .unwrap_or_else(|_| "./data/biopage.sqlite".to_string())
                .into(),
            bind_addr: parse_var("BIOPAGE_BIND_ADDR", "127.0.0.1:8080")?,
            log_level: env::var("BIOPAGE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_format: parse_var("BIOPAGE_LOG_FORMAT", "pretty")?,
            avatar_dir: env::var("BIOPAGE_AVATAR_DIR")
                .unwrap_or_else(|_| "./data/avatars".to_string())
                .into(),
            public_url,
            session_ttl_hours: session_ttl(parse_var("BIOPAGE_SESSION_TTL_HOURS", "168")?)?,
            max_avatar_bytes: parse_var("BIOPAGE_MAX_AVATAR_BYTES", "2097152")?,
        })
    }
}

fn parse_var<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse().map_err(|e: T::Err| ConfigError {
        key,
        reason: e.to_string(),
    })
}

fn session_ttl(hours: i64) -> Result<i64, ConfigError> {
    if (1..=MAX_SESSION_TTL_HOURS).contains(&hours) {
        Ok(hours)
    } else {
        Err(ConfigError {
            key: "BIOPAGE_SESSION_TTL_HOURS",
            reason: format!("must be between 1 and {} hours, got {}", MAX_SESSION_TTL_HOURS, hours),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        for key in [
            "BIOPAGE_DB_PATH",
            "BIOPAGE_BIND_ADDR",
            "BIOPAGE_LOG_LEVEL",
            "BIOPAGE_LOG_FORMAT",
            "BIOPAGE_AVATAR_DIR",
            "BIOPAGE_PUBLIC_URL",
            "BIOPAGE_SESSION_TTL_HOURS",
            "BIOPAGE_MAX_AVATAR_BYTES",
        ] {
            env::remove_var(key);
        }

        let config = Config::from_env().unwrap();

        assert_eq!(config.db_path, PathBuf::from("./data/biopage.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.avatar_dir, PathBuf::from("./data/avatars"));
        assert_eq!(config.public_url, "http://127.0.0.1:8080");
        assert_eq!(config.session_ttl_hours, 168);
        assert_eq!(config.max_avatar_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn test_session_ttl_bounds() {
        assert_eq!(session_ttl(1).unwrap(), 1);
        assert_eq!(session_ttl(MAX_SESSION_TTL_HOURS).unwrap(), MAX_SESSION_TTL_HOURS);

        for bad in [0, -5, MAX_SESSION_TTL_HOURS + 1, i64::MAX] {
            let err = session_ttl(bad).unwrap_err();
            assert_eq!(err.key, "BIOPAGE_SESSION_TTL_HOURS");
        }
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("text".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
