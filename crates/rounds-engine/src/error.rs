//! Error types for engine operations.

use club_data::DataError;
use thiserror::Error;

/// Errors that can occur while applying a command.
///
/// `CorruptState` is fatal for its tenant: every command on that club is
/// refused until an operator intervenes. `Transport` is reported to the
/// originating path but never rolls back a committed state transition. The
/// remaining kinds are user-visible and render as a short explanation
/// followed by the root menu.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A member or role lookup found nothing.
    #[error("not found: {0}")]
    NotFound(String),

    /// A member with this id already exists in the club.
    #[error("duplicate member id: {0}")]
    DuplicateId(String),

    /// A non-admin attempted an admin command.
    #[error("unauthorized")]
    Unauthorized,

    /// A round with pending offers is still open.
    #[error("a round is already in progress")]
    RoundInProgress,

    /// The sender holds no pending offer.
    #[error("no pending offer")]
    NoPendingOffer,

    /// Selection found nobody to offer to.
    #[error("no candidate available: {0}")]
    NoCandidateAvailable(String),

    /// Removal attempted on a member who is a pending candidate or holds an
    /// accepted role this round.
    #[error("member busy: {0}")]
    MemberBusy(String),

    /// The tenant's persisted state did not decode; the club is out of
    /// service until an operator intervenes.
    #[error("corrupt state: {0}")]
    CorruptState(String),

    /// An outbound message could not be delivered.
    #[error("transport error: {0}")]
    Transport(String),

    /// Persistence failed for a reason other than corruption.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<DataError> for EngineError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::NotFound(what) => EngineError::NotFound(what),
            DataError::DuplicateId(id) => EngineError::DuplicateId(id),
            DataError::Corrupt { path, source } => {
                EngineError::CorruptState(format!("{path}: {source}"))
            }
            DataError::Io(err) => EngineError::Storage(err.to_string()),
        }
    }
}
