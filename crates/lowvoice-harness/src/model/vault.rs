//! Model vault - the reference implementation.

use std::time::Duration;

use lowvoice_core::Denied;

use super::{
    operation::{ActorId, Operation, OperationResult, WhisperSlot},
    roster,
};

/// Lifetime of every whisper created through an `Operation`.
pub const MODEL_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
struct ModelWhisper {
    sender: ActorId,
    recipient: ActorId,
    content: String,
    deadline_ms: u64,
    deleted: bool,
}

/// Reference vault.
///
/// Whispers are never removed from the list, only marked, so slot indices
/// stay stable for the whole run.
#[derive(Debug, Clone, Default)]
pub struct ModelVault {
    whispers: Vec<ModelWhisper>,
    now_ms: u64,
}

impl ModelVault {
    /// Empty vault at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of whispers created so far, live or not.
    pub fn created(&self) -> usize {
        self.whispers.len()
    }

    /// Resolve a slot to a creation index, if anything was created.
    pub fn resolve(&self, slot: WhisperSlot) -> Option<usize> {
        (!self.whispers.is_empty()).then(|| usize::from(slot) % self.whispers.len())
    }

    /// Number of live whispers.
    pub fn live(&self) -> usize {
        (0..self.whispers.len()).filter(|&i| self.is_live(i)).count()
    }

    /// Apply an operation and return the result.
    ///
    /// The real vault must return the same result for the same sequence.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        match op {
            Operation::Create { sender, recipient, content } => {
                self.whispers.push(ModelWhisper {
                    sender: roster::actor_index(*sender),
                    recipient: roster::recipient_index(*recipient),
                    content: content.to_text(),
                    deadline_ms: self.now_ms + ttl_ms(),
                    deleted: false,
                });
                OperationResult::Created
            },
            Operation::Reveal { actor, whisper } => match self.authorize(*actor, *whisper) {
                Some(Ok(index)) => OperationResult::Revealed(self.whispers[index].content.clone()),
                Some(Err(denied)) => OperationResult::Denied(denied),
                None => OperationResult::Skipped,
            },
            Operation::Expire { actor, whisper } => match self.authorize(*actor, *whisper) {
                Some(Ok(index)) => {
                    self.whispers[index].deleted = true;
                    OperationResult::Expired
                },
                Some(Err(denied)) => OperationResult::Denied(denied),
                None => OperationResult::Skipped,
            },
            Operation::AdvanceTime { millis } => {
                self.now_ms += u64::from(*millis);
                OperationResult::Skipped
            },
        }
    }

    fn is_live(&self, index: usize) -> bool {
        let whisper = &self.whispers[index];
        !whisper.deleted && self.now_ms < whisper.deadline_ms
    }

    /// Existence first, then sender or recipient.
    fn authorize(&self, actor: ActorId, slot: WhisperSlot) -> Option<Result<usize, Denied>> {
        let index = self.resolve(slot)?;
        if !self.is_live(index) {
            return Some(Err(Denied::NotFoundOrExpired));
        }

        let actor = roster::actor_index(actor);
        let whisper = &self.whispers[index];
        if actor == whisper.sender || actor == whisper.recipient {
            Some(Ok(index))
        } else {
            Some(Err(Denied::Unauthorized))
        }
    }
}

fn ttl_ms() -> u64 {
    u64::try_from(MODEL_TTL.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SmallContent;

    fn create(sender: ActorId, recipient: ActorId) -> Operation {
        Operation::Create { sender, recipient, content: SmallContent { seed: 0, size_class: 1 } }
    }

    #[test]
    fn nothing_to_target_is_skipped() {
        let mut model = ModelVault::new();

        assert_eq!(model.apply(&Operation::Reveal { actor: 0, whisper: 9 }), OperationResult::Skipped);
    }

    #[test]
    fn only_parties_are_authorized() {
        let mut model = ModelVault::new();
        model.apply(&create(0, 1));

        assert!(!model.apply(&Operation::Reveal { actor: 0, whisper: 0 }).is_denied());
        assert!(!model.apply(&Operation::Reveal { actor: 1, whisper: 0 }).is_denied());
        assert_eq!(
            model.apply(&Operation::Reveal { actor: 2, whisper: 0 }),
            OperationResult::Denied(Denied::Unauthorized)
        );
    }

    #[test]
    fn deadline_is_exclusive() {
        let mut model = ModelVault::new();
        model.apply(&create(3, 0));

        model.apply(&Operation::AdvanceTime { millis: 4_999 });
        assert_eq!(model.live(), 1);
        model.apply(&Operation::AdvanceTime { millis: 1 });
        assert_eq!(model.live(), 0);
        assert_eq!(
            model.apply(&Operation::Expire { actor: 3, whisper: 0 }),
            OperationResult::Denied(Denied::NotFoundOrExpired)
        );
    }

    #[test]
    fn expire_is_one_shot() {
        let mut model = ModelVault::new();
        model.apply(&create(0, 1));

        assert_eq!(model.apply(&Operation::Expire { actor: 1, whisper: 0 }), OperationResult::Expired);
        assert_eq!(
            model.apply(&Operation::Expire { actor: 1, whisper: 0 }),
            OperationResult::Denied(Denied::NotFoundOrExpired)
        );
        assert_eq!(model.created(), 1);
        assert_eq!(model.live(), 0);
    }
}
