//! Error types
//!
//! `RotationError` values are advisory: the engine leaves state untouched and
//! the front end shows the message. `StorageError` comes from the key/value
//! substrate and is never fatal.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RotationError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RotationError {
    #[error("A draw is already spinning")]
    DrawInFlight,

    #[error("No draw is spinning")]
    NoDrawInFlight,

    #[error("Spin {0} is no longer in flight")]
    StaleSpin(u64),

    #[error("Two winners are waiting - save this month first")]
    PairPending,

    #[error("Everyone on the roster has already been drawn")]
    NoCandidates,

    #[error("Spin twice before saving (have {have} of 2 winners)")]
    NeedTwoWinners { have: usize },

    #[error("Names are locked until the rotation is reset")]
    RosterLocked,

    #[error("Roster slot {0} does not exist")]
    SlotOutOfRange(usize),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage unavailable")]
    Unavailable,

    #[error("Storage write rejected: {0}")]
    WriteRejected(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
