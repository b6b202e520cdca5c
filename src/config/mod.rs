//! Configuration module for the Absensi backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// A configured user and the access token that identifies them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserToken {
    pub user: String,
    pub token: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Access tokens accepted by the session gate; empty disables authentication
    pub api_tokens: Vec<UserToken>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let api_tokens = api_tokens_from(env::var("ABSENSI_API_TOKENS").ok().as_deref())?;

        let db_path = env::var("ABSENSI_DB_PATH")
            .unwrap_or_else(|_| "./data/absensi.sqlite".to_string())
            .into();

        let raw_addr =
            env::var("ABSENSI_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let bind_addr = raw_addr
            .parse()
            .map_err(|e| format!("Invalid ABSENSI_BIND_ADDR {:?}: {}", raw_addr, e))?;

        let log_level = env::var("ABSENSI_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            api_tokens,
            db_path,
            bind_addr,
            log_level,
        })
    }
}

/// Unset or blank leaves authentication off. A non-blank value must yield at
/// least one entry.
fn api_tokens_from(raw: Option<&str>) -> Result<Vec<UserToken>, String> {
    let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
        return Ok(Vec::new());
    };
    let tokens = parse_tokens(raw);
    if tokens.is_empty() {
        return Err("ABSENSI_API_TOKENS is set but contains no valid user:token entries".to_string());
    }
    Ok(tokens)
}

/// Parse `user:token` pairs separated by commas. Malformed entries are skipped.
fn parse_tokens(raw: &str) -> Vec<UserToken> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let Some((user, token)) = entry.split_once(':') else {
                tracing::warn!("Ignoring ABSENSI_API_TOKENS entry without a ':' separator");
                return None;
            };
            let (user, token) = (user.trim(), token.trim());
            if user.is_empty() || token.is_empty() {
                tracing::warn!("Ignoring malformed entry in ABSENSI_API_TOKENS");
                return None;
            }
            Some(UserToken {
                user: user.to_string(),
                token: token.to_string(),
            })
        })
        .collect()
}
