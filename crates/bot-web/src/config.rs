//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Webhook server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// Gupshup API key.
    pub api_key: String,
    /// The bot's own number, E.164 digits without '+'.
    pub source: String,
    /// Registered gateway application name.
    pub app_name: String,
    /// Token for the webhook verification handshake.
    pub verify_token: String,
    /// Directory holding `registry.json` and the per-club folders.
    pub clubs_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `BOT_ADDR` | Server bind address | `0.0.0.0:5000` |
    /// | `GUPSHUP_API_KEY` | Gateway API key | (required) |
    /// | `GUPSHUP_SOURCE` | Bot number, E.164 digits without '+' | (required) |
    /// | `GUPSHUP_APP_NAME` | Gateway application name | `RolesClubBotToastmasters` |
    /// | `VERIFY_TOKEN` | Webhook verification token | `rolesclub-verify` |
    /// | `CLUBS_DIR` | Clubs data directory | `data/clubs` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("BOT_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:5000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let api_key = env::var("GUPSHUP_API_KEY").map_err(|_| ConfigError::MissingApiKey)?;
        let source = env::var("GUPSHUP_SOURCE").map_err(|_| ConfigError::MissingSource)?;

        let app_name = env::var("GUPSHUP_APP_NAME")
            .unwrap_or_else(|_| "RolesClubBotToastmasters".to_string());
        let verify_token =
            env::var("VERIFY_TOKEN").unwrap_or_else(|_| "rolesclub-verify".to_string());
        let clubs_dir = env::var("CLUBS_DIR")
            .unwrap_or_else(|_| "data/clubs".to_string())
            .into();

        Ok(Self {
            addr,
            api_key,
            source,
            app_name,
            verify_token,
            clubs_dir,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid BOT_ADDR format")]
    InvalidAddr,

    #[error("GUPSHUP_API_KEY environment variable is required")]
    MissingApiKey,

    #[error("GUPSHUP_SOURCE environment variable is required")]
    MissingSource,
}
