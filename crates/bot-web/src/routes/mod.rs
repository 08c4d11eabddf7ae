//! HTTP routes.

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

pub mod health;
pub mod webhook;

/// Build the application router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health::health))
        .route("/webhook", get(webhook::verify).post(webhook::receive))
}
