//! Adapter from the engine's sender seam to the WhatsApp gateway client.

use async_trait::async_trait;
use rounds_engine::{EngineError, OutboundSender};
use wa_gateway::GatewayClient;

/// Sends engine outbound messages through the Gupshup gateway.
#[derive(Debug, Clone)]
pub struct GatewaySender {
    client: GatewayClient,
}

impl GatewaySender {
    /// Wrap a gateway client.
    pub fn new(client: GatewayClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OutboundSender for GatewaySender {
    async fn send(&self, to: &str, text: &str) -> Result<(), EngineError> {
        self.client
            .send_text(to, text)
            .await
            .map(|_| ())
            .map_err(|err| EngineError::Transport(err.to_string()))
    }
}
