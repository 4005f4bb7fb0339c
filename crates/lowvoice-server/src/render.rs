//! User-facing text.
//!
//! Everything the bot says lives here. Denials have exactly one rendering:
//! a requester must not be able to tell "never existed", "expired" and
//! "not yours" apart.

use lowvoice_core::{Identity, WhisperRecord};

pub(crate) const WELCOME: &str = "Low Voice Bot helps send private messages in public groups.";
pub(crate) const START_BUTTON: &str = "Start";

pub(crate) const DENIED: &str = "⏲️🔔/❌ The message is expired or non-existent.";
pub(crate) const EXPIRED_OK: &str = "✅ Successfully expired.";
pub(crate) const MALFORMED: &str = "❌ Malformed arguments";
pub(crate) const UNSUPPORTED: &str = "❌ Unsupported action";
pub(crate) const PONG: &str = "Pong";

pub(crate) const USAGE_TITLE: &str = "ℹ️ Show Usage";
pub(crate) const USAGE_ERROR_TITLE: &str = "❌ Usage Error";
pub(crate) const INVALID_USERNAME: &str = "❌ Invalid Username";

pub(crate) const WITH_SAVE_TITLE: &str = "With Save button";
pub(crate) const WITHOUT_SAVE_TITLE: &str = "Without Save button";
pub(crate) const REVEAL_BUTTON: &str = "🔎 Reveal";
pub(crate) const SAVE_BUTTON: &str = "💾 Save";
pub(crate) const EXPIRE_BUTTON: &str = "🛑 Expire";

/// `@handle` if the user has one, otherwise their display name.
pub(crate) fn mention(identity: &Identity) -> String {
    match &identity.handle {
        Some(handle) => format!("@{handle}"),
        None => identity.name.clone(),
    }
}

pub(crate) fn usage(bot: &str) -> String {
    format!("ℹ️ Usage: @{bot} @RECIPIENT message")
}

pub(crate) fn usage_error(bot: &str) -> String {
    format!("❌ Usage Error\nUsage: @{bot} @RECIPIENT message")
}

pub(crate) fn notice(name: &str, handle: &str, minutes: u64) -> String {
    format!("Private Message\nTo {name} (@{handle}),\nexpiring in {minutes} minutes.")
}

pub(crate) fn save_url(bot: &str, payload: &str) -> String {
    format!("https://t.me/{bot}?start={payload}")
}

/// Alert body for a reveal button.
pub(crate) fn revealed(record: &WhisperRecord) -> String {
    format!("From {} to @{}:\n\n{}", mention(&record.sender), record.recipient, record.content)
}

/// Chat message body for a saved whisper.
pub(crate) fn saved(record: &WhisperRecord) -> String {
    format!(
        "Message from {} to @{}:\n\n{}",
        mention(&record.sender),
        record.recipient,
        record.content
    )
}

#[cfg(test)]
mod tests {
    use lowvoice_core::{Handle, UserId};

    use super::*;

    #[test]
    fn mention_prefers_handle() {
        let with = Identity {
            id: UserId(1),
            handle: Some(Handle::parse("alice").unwrap()),
            name: "Alice A.".to_string(),
        };
        let without = Identity { id: UserId(1), handle: None, name: "Alice A.".to_string() };

        assert_eq!(mention(&with), "@alice");
        assert_eq!(mention(&without), "Alice A.");
    }

    #[test]
    fn notice_names_recipient() {
        assert_eq!(
            notice("Bob B.", "bob", 30),
            "Private Message\nTo Bob B. (@bob),\nexpiring in 30 minutes."
        );
    }
}
