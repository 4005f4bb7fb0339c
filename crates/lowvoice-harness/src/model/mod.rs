//! Reference model for model-based testing.
//!
//! The model is a simplified vault: a flat list of whispers, a millisecond
//! counter for time and index comparisons for authorization. It is the
//! oracle against which the real sharded, timer-driven vault is verified.
//!
//! # Design Principles
//!
//! - Simplicity: The model should be obviously correct
//! - Behaviour not mechanism: no locks, no timers, no ids
//! - Deterministic: Same inputs produce same outputs

pub mod operation;
pub mod roster;
mod vault;

pub use operation::{ActorId, Operation, OperationResult, SmallContent, WhisperSlot};
pub use vault::{MODEL_TTL, ModelVault};
