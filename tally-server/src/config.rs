use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub summary_author_id: Option<String>, // only accept summaries posted by this account
    pub alias_refresh_seconds: u64,
    pub leaderboard_limit: u64,
    pub aliases_file: Option<String>,
}

fn var_or<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .with_context(|| format!("Invalid {}", key))
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl Config {
    /// Read configuration from the environment, falling back to defaults
    pub fn new() -> Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: var_or("PORT", "8080")?,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| tally_persistence::connection::DEFAULT_DATABASE_URL.to_string()),
            summary_author_id: optional_var("SUMMARY_AUTHOR_ID"),
            alias_refresh_seconds: var_or("ALIAS_REFRESH_SECONDS", "600")?,
            leaderboard_limit: var_or("LEADERBOARD_LIMIT", "10")?,
            aliases_file: optional_var("ALIASES_FILE"),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_url: tally_persistence::connection::DEFAULT_DATABASE_URL.to_string(),
            summary_author_id: None,
            alias_refresh_seconds: 600,
            leaderboard_limit: 10,
            aliases_file: None,
        }
    }
}
