//! Fuzz target for text that arrives from the chat platform
//!
//! Button payloads, deep-link parameters and gateway lines are all
//! attacker-controlled.
//!
//! # Strategy
//!
//! - Raw strings through every parser
//! - Near-misses: valid prefixes glued to arbitrary ids
//!
//! # Invariants
//!
//! - NEVER panic on any input
//! - Accepted payloads re-render to exactly the input text
//! - Accepted whisper ids only contain `[A-Za-z0-9_-]` and fit the length cap

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use lowvoice_core::WhisperId;
use lowvoice_server::{
    Request,
    payload::{Callback, DeepLink},
};

#[derive(Debug, Arbitrary)]
enum Input {
    Callback(String),
    DeepLink(String),
    PrefixedId { action: u8, id: String },
    GatewayLine(String),
}

fn check_id(id: &WhisperId) {
    let id = id.as_str();
    assert!(!id.is_empty() && id.len() <= lowvoice_core::MAX_WHISPER_ID_LEN);
    assert!(id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-'));
}

fuzz_target!(|input: Input| {
    match input {
        Input::Callback(raw) => {
            if let Ok(callback) = raw.parse::<Callback>() {
                check_id(&callback.id);
                assert_eq!(callback.to_string(), raw);
            }
        },
        Input::DeepLink(raw) => {
            if let Ok(DeepLink::Save(id)) = raw.parse::<DeepLink>() {
                check_id(&id);
                assert_eq!(DeepLink::Save(id).to_string(), raw);
            }
        },
        Input::PrefixedId { action, id } => {
            let raw = match action % 3 {
                0 => format!("REVEAL|{id}"),
                1 => format!("EXPIRE|{id}"),
                _ => format!("SAVE_{id}"),
            };
            let accepted = if action % 3 == 2 {
                raw.parse::<DeepLink>().is_ok()
            } else {
                raw.parse::<Callback>().is_ok()
            };
            assert_eq!(accepted, WhisperId::parse(&id).is_ok());
        },
        Input::GatewayLine(line) => {
            let _ = serde_json::from_str::<Request>(&line);
        },
    }
});
