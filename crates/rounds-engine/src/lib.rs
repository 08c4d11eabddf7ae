//! The assignment engine of the club roles bot.
//!
//! This crate owns everything between the normalized inbound event
//! `{sender_id, text}` and the outbound messages handed to the gateway:
//!
//! - [`selection`]: hierarchical, deterministic candidate choice.
//! - [`round`]: the per-club round state machine (start, accept, reject,
//!   defer, cancel, reset, status).
//! - [`registry`]: tenant contexts with per-club locks and sender-to-club
//!   disambiguation.
//! - [`session`] + [`router`]: per-sender menu state and the strict
//!   precedence dispatch of inbound text.
//! - [`admin`]: member management operations.
//!
//! Commands acquire their tenant's lock, mutate, persist, release; the
//! resulting [`Outbound`] batch is delivered by the caller only after the
//! lock is gone, so gateway latency never serializes a tenant.

pub mod admin;
pub mod error;
pub mod messages;
pub mod registry;
pub mod round;
pub mod router;
pub mod selection;
pub mod sender;
pub mod session;

pub use error::EngineError;
pub use registry::{Registry, TenantCell, TenantContext, TenantData, TenantResolution};
pub use router::Engine;
pub use selection::choose_candidate;
pub use sender::{deliver, DeliveryReport, LoggingSender, NoOpSender, Outbound, OutboundSender};
pub use session::{Awaiting, Session, SessionMode, SessionTable};
