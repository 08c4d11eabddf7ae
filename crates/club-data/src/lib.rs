//! Catalog, round state and persistence for the club roles bot.
//!
//! This crate holds the data layer shared by the engine and the webhook
//! server:
//!
//! - The club catalog: members, roles and each member's completion history.
//! - The round ledger: pending offers, accepted roles and per-member cycles.
//! - A per-club store that reads and writes both as atomic JSON files.
//!
//! # Example
//!
//! ```no_run
//! use club_data::{ClubStore, Member};
//!
//! # fn example() -> Result<(), club_data::DataError> {
//! let store = ClubStore::new("data/clubs/club_1");
//! let mut catalog = store.load_catalog()?;
//! catalog.add_member(Member::new("Daniel", "5219212671618"))?;
//! store.save_catalog(&catalog)?;
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod error;
pub mod state;
pub mod store;

pub use catalog::{Catalog, Member, Role};
pub use error::DataError;
pub use state::{AcceptedRole, PendingOffer, RoundState};
pub use store::ClubStore;
