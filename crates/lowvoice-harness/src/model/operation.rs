//! Operations for model-based testing.
//!
//! Operations represent every request a vault serves, plus the passage of
//! time. They are generated randomly by proptest and applied to both the
//! model and the real vault.

use arbitrary::Arbitrary;
use lowvoice_core::Denied;

/// Simulated user (mapped onto the roster).
pub type ActorId = u8;

/// Index into the whispers created so far (taken modulo their count).
pub type WhisperSlot = u8;

/// Requests that can be applied to the vault.
///
/// Operations refer to whispers by creation order, not by id, so a random
/// sequence keeps hitting live, expired and deleted whispers alike.
#[derive(Debug, Clone, Arbitrary)]
pub enum Operation {
    /// Sender whispers to recipient.
    Create {
        /// Creator.
        sender: ActorId,
        /// Addressee (mapped onto users with a handle).
        recipient: ActorId,
        /// Message body.
        content: SmallContent,
    },

    /// Actor asks to see a whisper.
    Reveal {
        /// Requester.
        actor: ActorId,
        /// Target whisper.
        whisper: WhisperSlot,
    },

    /// Actor asks to delete a whisper.
    Expire {
        /// Requester.
        actor: ActorId,
        /// Target whisper.
        whisper: WhisperSlot,
    },

    /// Advance simulated time.
    ///
    /// Timers fire in the real vault; the model compares deadlines.
    AdvanceTime {
        /// Milliseconds to advance.
        millis: u16,
    },
}

/// Small message body for testing.
#[derive(Debug, Clone, Arbitrary)]
pub struct SmallContent {
    /// Content seed.
    pub seed: u8,
    /// Length hint (0-3 maps to one/short/medium/long).
    pub size_class: u8,
}

impl SmallContent {
    /// Expand to message text.
    pub fn to_text(&self) -> String {
        let len = match self.size_class % 4 {
            0 => 1,
            1 => 8,
            2 => 64,
            _ => 200,
        };

        (0..len).map(|i| char::from(b'a' + self.seed.wrapping_add(i) % 26)).collect()
    }
}

/// Observable outcome of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    /// Whisper stored.
    Created,

    /// Content returned to the requester.
    Revealed(String),

    /// Whisper deleted.
    Expired,

    /// Request refused.
    Denied(Denied),

    /// Nothing to target yet, or time moved.
    Skipped,
}

impl OperationResult {
    /// Whether the vault said no.
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied(_))
    }
}
