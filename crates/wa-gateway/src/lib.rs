//! WhatsApp gateway client library.
//!
//! This crate provides a Rust client for the Gupshup WhatsApp message API.
//! The rest of the system treats it as an opaque send capability: give it a
//! destination (E.164 digits, no leading '+') and a text, get back ok or a
//! transport error.
//!
//! # Example
//!
//! ```no_run
//! use wa_gateway::{GatewayClient, GatewayConfig};
//!
//! # async fn example() -> Result<(), wa_gateway::GatewayError> {
//! let config = GatewayConfig::new("api-key", "5215550000000");
//! let client = GatewayClient::new(config)?;
//!
//! let receipt = client.send_text("5215551234567", "Hola!").await?;
//! println!("submitted: {:?}", receipt.message_id);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;

pub use client::{GatewayClient, SendReceipt};
pub use config::GatewayConfig;
pub use error::GatewayError;

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
