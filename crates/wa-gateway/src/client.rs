//! Gupshup message API HTTP client.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::GatewayConfig;
use crate::error::GatewayError;

/// Total wait budget per outbound send. State is already committed when a
/// send happens, so a slow gateway must not hold a worker for long.
const SEND_TIMEOUT: Duration = Duration::from_secs(15);

/// Receipt returned by the gateway on a submitted message.
#[derive(Debug, Clone, Deserialize)]
pub struct SendReceipt {
    /// Submission status as reported by the gateway (e.g. "submitted").
    #[serde(default)]
    pub status: Option<String>,
    /// Gateway-side message id, when provided.
    #[serde(default, rename = "messageId")]
    pub message_id: Option<String>,
}

/// Client for the Gupshup WhatsApp message API.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: Client,
    config: GatewayConfig,
}

impl GatewayClient {
    /// Build a client from a configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        if config.api_key.is_empty() {
            return Err(GatewayError::Config("empty API key".to_string()));
        }
        if config.source.is_empty() {
            return Err(GatewayError::Config("empty source number".to_string()));
        }
        let http = Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(GatewayError::Http)?;
        Ok(Self { http, config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Send a text message to one recipient.
    ///
    /// `destination` is E.164 digits without the leading '+'. The gateway
    /// does its own templating-free delivery; this client only concatenates
    /// form fields.
    pub async fn send_text(
        &self,
        destination: &str,
        text: &str,
    ) -> Result<SendReceipt, GatewayError> {
        debug!(destination = %destination, "Sending gateway message");

        let form = [
            ("channel", "whatsapp"),
            ("source", self.config.source.as_str()),
            ("destination", destination),
            ("message", text),
            ("src.name", self.config.app_name.as_str()),
        ];

        let response = self
            .http
            .post(&self.config.api_url)
            .header("apikey", &self.config.api_key)
            .form(&form)
            .send()
            .await
            .map_err(GatewayError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, destination = %destination, "Gateway rejected send");
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            });
        }

        // The gateway's receipt body is informative only; an unparseable
        // success response still counts as sent.
        Ok(response.json().await.unwrap_or(SendReceipt {
            status: None,
            message_id: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_credentials() {
        let err = GatewayClient::new(GatewayConfig::new("", "521555")).unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));

        let err = GatewayClient::new(GatewayConfig::new("key", "")).unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }

    #[test]
    fn receipt_decodes_gateway_shape() {
        let receipt: SendReceipt =
            serde_json::from_str(r#"{"status":"submitted","messageId":"abc-123"}"#).unwrap();
        assert_eq!(receipt.status.as_deref(), Some("submitted"));
        assert_eq!(receipt.message_id.as_deref(), Some("abc-123"));

        // Unknown or missing fields never fail the decode.
        let receipt: SendReceipt = serde_json::from_str(r#"{"other":1}"#).unwrap();
        assert!(receipt.status.is_none());
    }
}
