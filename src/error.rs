//! Error types for the seating engine.

use thiserror::Error;

use crate::data::GuestId;

/// Logic errors raised by the engine. Degenerate but valid input (no tables,
/// dangling relationships, malformed constraints) never produces one of these.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeatingError {
    #[error("snapshot references unknown guest '{0}'")]
    UnknownSnapshotGuest(GuestId),

    #[error("snapshot lists guest '{0}' more than once")]
    DuplicateSnapshotGuest(GuestId),
}
