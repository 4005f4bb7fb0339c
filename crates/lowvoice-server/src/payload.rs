//! Text payloads that carry whisper ids through the chat platform.
//!
//! Two channels exist:
//!
//! - Button callbacks: `REVEAL|<id>` and `EXPIRE|<id>`
//! - Deep links (bot start parameter): `SAVE_<id>`
//!
//! Ids are validated on the way in, so anything reaching the vault is at
//! least well-formed.

use std::{fmt, str::FromStr};

use lowvoice_core::{WhisperId, WhisperIdError};
use thiserror::Error;

const CALLBACK_SEPARATOR: char = '|';
const SAVE_PREFIX: &str = "SAVE_";

/// Payload parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// No separator, or nothing after it.
    #[error("malformed payload")]
    Malformed,

    /// Well-formed, but the action is not one we handle.
    #[error("unsupported action {0:?}")]
    UnsupportedAction(String),

    /// The id part is not a valid whisper id.
    #[error("invalid whisper id: {0}")]
    InvalidId(#[from] WhisperIdError),
}

/// Button action on a posted whisper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    /// Show the content to the requester.
    Reveal,
    /// Delete the whisper.
    Expire,
}

impl CallbackAction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Reveal => "REVEAL",
            Self::Expire => "EXPIRE",
        }
    }
}

/// Decoded button callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callback {
    /// What the button does.
    pub action: CallbackAction,
    /// Target whisper.
    pub id: WhisperId,
}

impl Callback {
    /// Build a callback payload.
    pub fn new(action: CallbackAction, id: WhisperId) -> Self {
        Self { action, id }
    }
}

impl fmt::Display for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.action.as_str(), CALLBACK_SEPARATOR, self.id)
    }
}

impl FromStr for Callback {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (action, id) = s.split_once(CALLBACK_SEPARATOR).ok_or(PayloadError::Malformed)?;
        let action = match action {
            "REVEAL" => CallbackAction::Reveal,
            "EXPIRE" => CallbackAction::Expire,
            other => return Err(PayloadError::UnsupportedAction(other.to_string())),
        };
        if id.is_empty() {
            return Err(PayloadError::Malformed);
        }
        Ok(Self { action, id: WhisperId::parse(id)? })
    }
}

/// Decoded bot start parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeepLink {
    /// Re-post the whisper into the requester's private chat.
    Save(WhisperId),
}

impl fmt::Display for DeepLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Save(id) => write!(f, "{SAVE_PREFIX}{id}"),
        }
    }
}

impl FromStr for DeepLink {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.strip_prefix(SAVE_PREFIX).ok_or(PayloadError::Malformed)?;
        if id.is_empty() {
            return Err(PayloadError::Malformed);
        }
        Ok(Self::Save(WhisperId::parse(id)?))
    }
}
