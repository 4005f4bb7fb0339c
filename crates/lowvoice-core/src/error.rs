//! Error taxonomy for vault and resolver operations.
//!
//! Recoverable outcomes (`Denied`, resolver misses) are returned as values
//! and rendered by the caller. `VaultError` is reserved for conditions the
//! caller cannot recover from.

use std::time::Duration;

use thiserror::Error;

/// Why a reveal or expire request was refused.
///
/// Both variants must render identically to the requester. The distinction
/// exists for logging and for the caller's own bookkeeping only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Denied {
    /// Id was never issued, has expired, or was explicitly expired.
    #[error("whisper not found or expired")]
    NotFoundOrExpired,

    /// Whisper is live but the requester is neither sender nor recipient.
    #[error("requester is neither sender nor recipient")]
    Unauthorized,
}

/// Fatal vault failures.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Every generated id collided with a live whisper.
    #[error("id space exhausted after {attempts} attempts")]
    IdSpaceExhausted {
        /// Number of ids generated before giving up.
        attempts: u32,
    },

    /// Creation time plus TTL does not fit the monotonic clock.
    #[error("ttl {ttl:?} is out of range")]
    TtlOutOfRange {
        /// Requested lifetime.
        ttl: Duration,
    },
}

/// Rejected recipient handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandleError {
    /// Nothing left after stripping the leading marker.
    #[error("handle is empty")]
    Empty,

    /// Handle contains a character outside `[A-Za-z0-9_]`.
    #[error("invalid character {0:?} in handle")]
    InvalidCharacter(char),
}

/// Rejected textual whisper id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WhisperIdError {
    /// Id is empty or longer than the channel allows.
    #[error("whisper id length {0} out of range")]
    Length(usize),

    /// Id contains a character that does not survive deep links.
    #[error("invalid character {0:?} in whisper id")]
    InvalidCharacter(char),
}

/// Failure of a single profile lookup.
///
/// Never surfaces past the resolver; it is logged and cached as a miss.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// Platform has no public profile for the handle.
    #[error("profile not found")]
    NotFound,

    /// Request could not be completed.
    #[error("transport error: {0}")]
    Transport(String),

    /// Profile page did not contain a display name.
    #[error("parse error: {0}")]
    Parse(String),
}
