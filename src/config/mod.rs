//! Application configuration management

use std::env;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// SQLite database URL (e.g. `sqlite://./data/rulebook.db?mode=rwc`)
    pub database_url: String,

    /// Page size applied when a search request omits `size`.
    ///
    /// Single source of truth for the default; the per-family criteria
    /// factories all read this value instead of hard-coding their own.
    pub default_page_size: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/rulebook.db?mode=rwc".to_string());

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3002".to_string())
                .parse()
                .context("Invalid PORT")?,

            database_url,

            default_page_size: env::var("DEFAULT_PAGE_SIZE")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .context("Invalid DEFAULT_PAGE_SIZE")?,
        })
    }
}
