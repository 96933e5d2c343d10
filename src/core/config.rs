//! # Configuration
//!
//! Environment-sourced configuration for the renewal reminder bot.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

use anyhow::{Context, Result};
use std::env;

/// Runtime configuration, read once at startup.
///
/// All values come from the environment (optionally via a `.env` file loaded
/// by the binary before this is constructed).
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord bot token (required).
    pub discord_token: String,
    /// Path of the JSON file holding the reminder records.
    pub data_file: String,
    /// How many days before the deadline reminders start firing.
    pub reminder_days_before: i64,
    /// When set, slash commands are registered for this guild only
    /// (instant updates, used during development).
    pub discord_guild_id: Option<String>,
    /// Default log filter passed to env_logger.
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Fails if `DISCORD_BOT_TOKEN` is missing or a numeric variable does
    /// not parse; everything else falls back to defaults.
    pub fn from_env() -> Result<Self> {
        let discord_token = env::var("DISCORD_BOT_TOKEN")
            .context("DISCORD_BOT_TOKEN environment variable must be set")?;

        let data_file =
            env::var("REMINDER_DATA_FILE").unwrap_or_else(|_| "reminders.json".to_string());

        let reminder_days_before = match env::var("REMINDER_DAYS_BEFORE") {
            Ok(raw) => raw
                .parse::<i64>()
                .with_context(|| format!("REMINDER_DAYS_BEFORE must be an integer, got '{raw}'"))?,
            Err(_) => 1,
        };

        let discord_guild_id = env::var("DISCORD_GUILD_ID").ok().filter(|s| !s.is_empty());

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Config {
            discord_token,
            data_file,
            reminder_days_before,
            discord_guild_id,
            log_level,
        })
    }
}
