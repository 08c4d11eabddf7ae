//! Application state shared across handlers.

use std::sync::Arc;

use rounds_engine::Engine;

use crate::gateway::GatewaySender;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The assignment engine.
    pub engine: Arc<Engine>,
    /// Outbound sender backed by the WhatsApp gateway.
    pub sender: Arc<GatewaySender>,
    /// Gateway application name, reported by the health endpoint.
    pub app_name: String,
    /// Webhook verification token.
    pub verify_token: String,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        engine: Arc<Engine>,
        sender: Arc<GatewaySender>,
        app_name: String,
        verify_token: String,
    ) -> Self {
        Self {
            engine,
            sender,
            app_name,
            verify_token,
        }
    }
}
