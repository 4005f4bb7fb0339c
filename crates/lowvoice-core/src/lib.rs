//! Ephemeral whisper vault.
//!
//! Holds whisper content in memory, decides who may reveal or erase it, and
//! guarantees it disappears on schedule or on demand.
//!
//! ## Architecture
//!
//! ```text
//! lowvoice-core
//!   ├─ Vault             (sharded store + authorization)
//!   ├─ Scheduler         (per-whisper cancellable timers)
//!   ├─ IdentityResolver  (LRU-cached handle -> display name)
//!   └─ Environment       (clock, timers, RNG)
//! ```
//!
//! The crate performs no I/O of its own. The network lookup behind the
//! resolver is supplied through `ProfileLookup`, and timers run on whatever
//! Tokio runtime the caller provides.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod env;
pub mod error;
pub mod resolver;
pub mod scheduler;
pub mod vault;
pub mod whisper;

#[cfg(test)]
mod test_env;

pub use config::{MAX_TTL, VaultConfig};
pub use env::Environment;
pub use error::{Denied, HandleError, LookupError, VaultError, WhisperIdError};
pub use resolver::{DisplayName, IdentityResolver, ProfileLookup};
pub use scheduler::{Scheduler, TimerHandle};
pub use vault::Vault;
pub use whisper::{
    Actor, HANDLE_MARKER, Handle, Identity, MAX_WHISPER_ID_LEN, SharedRecord, UserId, WhisperId,
    WhisperRecord,
};
