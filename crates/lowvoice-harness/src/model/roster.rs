//! Fixed cast of simulated users.
//!
//! Actors `0..HANDLED_ACTORS` have handles (`user0`, `user1`, ...) and can
//! receive whispers. The last actor has no handle, so it can only ever be
//! authorized as a sender.

use lowvoice_core::{Actor, Handle, Identity, UserId};

use super::operation::ActorId;

/// Number of simulated users.
pub const ACTOR_COUNT: u8 = 4;

/// Users with a public handle.
pub const HANDLED_ACTORS: u8 = 3;

/// Map an arbitrary index onto the cast.
pub fn actor_index(actor: ActorId) -> ActorId {
    actor % ACTOR_COUNT
}

/// Map an arbitrary index onto users that can be addressed.
pub fn recipient_index(actor: ActorId) -> ActorId {
    actor % HANDLED_ACTORS
}

/// Handle of an addressable user.
pub fn handle(actor: ActorId) -> Option<Handle> {
    let actor = actor_index(actor);
    (actor < HANDLED_ACTORS).then(|| Handle::parse(&format!("user{actor}")).ok()).flatten()
}

/// Full identity, as a sender presents it.
pub fn identity(actor: ActorId) -> Identity {
    let actor = actor_index(actor);
    Identity {
        id: UserId(u64::from(actor) + 1),
        handle: handle(actor),
        name: format!("User {actor}"),
    }
}

/// Requester view of a user.
pub fn actor(actor: ActorId) -> Actor {
    identity(actor).actor()
}
