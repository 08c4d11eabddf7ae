//! Error types for the gateway client.

use thiserror::Error;

/// Errors that can occur when talking to the WhatsApp gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with a non-success status.
    #[error("gateway rejected send: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// Invalid client configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}
