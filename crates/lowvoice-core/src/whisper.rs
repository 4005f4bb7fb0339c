//! Whisper records and the identity types they are keyed on.
//!
//! Authorization compares stable values only: the sender's numeric account
//! id and the recipient handle string stored at creation. Display names are
//! carried for rendering and never take part in a decision.

use std::{fmt, sync::Arc, time::Instant};

use serde::{Deserialize, Serialize};

use crate::{
    env::Environment,
    error::{HandleError, WhisperIdError},
};

/// Leading marker users type in front of a handle.
pub const HANDLE_MARKER: char = '@';

/// Longest id that still fits a deep-link payload after its prefix.
pub const MAX_WHISPER_ID_LEN: usize = 58;

const WHISPER_ID_PREFIX: &str = "WHISPER";

/// Stable platform account identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Platform-visible short name, stored without its leading marker.
///
/// Comparison is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Handle(String);

impl Handle {
    /// Parse user input, stripping one leading `@`.
    ///
    /// # Errors
    ///
    /// Returns `HandleError::Empty` if nothing remains and
    /// `HandleError::InvalidCharacter` for anything outside `[A-Za-z0-9_]`.
    pub fn parse(raw: &str) -> Result<Self, HandleError> {
        let bare = raw.strip_prefix(HANDLE_MARKER).unwrap_or(raw);
        if bare.is_empty() {
            return Err(HandleError::Empty);
        }
        if let Some(c) = bare.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
            return Err(HandleError::InvalidCharacter(c));
        }
        Ok(Self(bare.to_string()))
    }

    /// The bare handle.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Handle {
    type Error = HandleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Handle> for String {
    fn from(handle: Handle) -> Self {
        handle.0
    }
}

/// Full identity of a whisper's creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Account id, used for authorization.
    pub id: UserId,
    /// Public handle, absent for accounts without one.
    pub handle: Option<Handle>,
    /// Display name, used for rendering only.
    pub name: String,
}

impl Identity {
    /// The authorization-relevant part of this identity.
    pub fn actor(&self) -> Actor {
        Actor { id: self.id, handle: self.handle.clone() }
    }
}

/// Whoever is asking to reveal or expire a whisper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Account id of the requester.
    pub id: UserId,
    /// Requester's own handle, if they have one.
    pub handle: Option<Handle>,
}

/// Opaque whisper handle shared over the wire.
///
/// Format: `WHISPER-<unix secs, hex>-<64 random bits, 16 hex digits>`.
/// Only `[A-Za-z0-9_-]` is ever produced or accepted, so ids survive deep
/// links and callback payloads unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WhisperId(String);

impl WhisperId {
    /// Generate a fresh id from the environment's clock and RNG.
    pub fn generate<E: Environment>(env: &E) -> Self {
        Self(format!("{WHISPER_ID_PREFIX}-{:x}-{:016x}", env.unix_secs(), env.random_u64()))
    }

    /// Parse an id received over a text channel.
    ///
    /// Syntax only; whether the id is live is the vault's business.
    ///
    /// # Errors
    ///
    /// Returns `WhisperIdError` if the id is empty, too long, or contains a
    /// character outside `[A-Za-z0-9_-]`.
    pub fn parse(raw: &str) -> Result<Self, WhisperIdError> {
        if raw.is_empty() || raw.len() > MAX_WHISPER_ID_LEN {
            return Err(WhisperIdError::Length(raw.len()));
        }
        if let Some(c) = raw.chars().find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-')))
        {
            return Err(WhisperIdError::InvalidCharacter(c));
        }
        Ok(Self(raw.to_string()))
    }

    /// Textual form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WhisperId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for WhisperId {
    type Error = WhisperIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<WhisperId> for String {
    fn from(id: WhisperId) -> Self {
        id.0
    }
}

/// A live whisper.
///
/// Immutable once created; the vault hands out shared references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhisperRecord {
    /// Vault-assigned id.
    pub id: WhisperId,
    /// Creator.
    pub sender: Identity,
    /// Intended reader, as typed by the sender (marker stripped).
    pub recipient: Handle,
    /// Payload, stored verbatim.
    pub content: String,
    /// When the record entered the vault.
    pub created_at: Instant,
}

impl WhisperRecord {
    /// Whether `actor` may reveal or expire this whisper.
    ///
    /// True iff the actor is the sender (by account id) or the actor's own
    /// handle equals the stored recipient handle.
    pub fn is_visible_to(&self, actor: &Actor) -> bool {
        actor.id == self.sender.id || actor.handle.as_ref() == Some(&self.recipient)
    }
}

/// Shared, read-only view of a record.
pub type SharedRecord = Arc<WhisperRecord>;
