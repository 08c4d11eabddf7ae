//! Configuration types for the gateway client.

/// Default Gupshup message endpoint.
pub const DEFAULT_API_URL: &str = "https://api.gupshup.io/wa/api/v1/msg";

/// Configuration for the Gupshup WhatsApp gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Message endpoint URL.
    pub api_url: String,
    /// Gupshup API key, sent as the `apikey` header.
    pub api_key: String,
    /// Registered application name (`src.name` form field).
    pub app_name: String,
    /// The bot's own number: E.164 digits WITHOUT the leading '+'.
    pub source: String,
}

impl GatewayConfig {
    /// Create a configuration with the default endpoint and app name.
    pub fn new(api_key: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: api_key.into(),
            app_name: "RolesClubBot".to_string(),
            source: source.into(),
        }
    }

    /// Set the registered application name.
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    /// Point the client at a different endpoint (tests, staging).
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_gupshup() {
        let config = GatewayConfig::new("key", "5215550000000");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.app_name, "RolesClubBot");
        assert_eq!(config.source, "5215550000000");
    }

    #[test]
    fn builder_overrides() {
        let config = GatewayConfig::new("key", "5215550000000")
            .with_app_name("MiClub")
            .with_api_url("http://127.0.0.1:9999/msg");
        assert_eq!(config.app_name, "MiClub");
        assert_eq!(config.api_url, "http://127.0.0.1:9999/msg");
    }
}
