use std::collections::HashMap;

/// Where a lookup result lands: the single-player view or one comparison entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Slot {
    Single,
    Comparison(String),
}

impl Slot {
    /// Comparison slots are keyed case-insensitively.
    pub fn comparison(name: &str) -> Self {
        Self::Comparison(name.to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestToken {
    slot: Slot,
    generation: u64,
}

impl RequestToken {
    pub fn slot(&self) -> &Slot {
        &self.slot
    }
}

/// Latest issued generation per slot. A result carrying an older token is stale.
#[derive(Debug, Default)]
pub struct RequestTokens {
    current: HashMap<Slot, u64>,
    next: u64,
}

impl RequestTokens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supersedes any outstanding request for `slot`.
    pub fn issue(&mut self, slot: Slot) -> RequestToken {
        self.next += 1;
        self.current.insert(slot.clone(), self.next);
        RequestToken {
            slot,
            generation: self.next,
        }
    }

    pub fn is_current(&self, token: &RequestToken) -> bool {
        self.current.get(&token.slot) == Some(&token.generation)
    }

    /// Marks `token` finished. Returns whether it was still current.
    pub fn complete(&mut self, token: &RequestToken) -> bool {
        if !self.is_current(token) {
            return false;
        }
        self.current.remove(&token.slot);
        true
    }

    /// Drops the outstanding request for `slot`, if any.
    pub fn cancel(&mut self, slot: &Slot) {
        self.current.remove(slot);
    }

    pub fn is_pending(&self, slot: &Slot) -> bool {
        self.current.contains_key(slot)
    }
}
