//! Deterministic simulation harness for Low Voice vault testing.
//!
//! `SimEnv` implements `Environment` on Tokio's paused clock with a seeded
//! ChaCha RNG, so whisper ids and expiry timing replay exactly from a seed.
//!
//! # Model-Based Testing
//!
//! The `model` module provides a reference implementation of the vault.
//! Operations are applied to both the model and the real vault, and their
//! results are compared step by step.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod model;
pub mod sim_env;

pub use model::{
    ActorId, MODEL_TTL, ModelVault, Operation, OperationResult, SmallContent, WhisperSlot,
    roster,
};
pub use sim_env::SimEnv;
