//! What the player is carrying back to the dome.

use serde::{Deserialize, Serialize};

use crate::shared::*;

/// Carried resources, capped by `capacity` across all kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cargo {
    carried: Cost,
    capacity: u32,
}

impl Cargo {
    pub fn with_capacity(capacity: u32) -> Self {
        Self {
            carried: Cost::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn set_capacity(&mut self, capacity: u32) {
        self.capacity = capacity;
    }

    pub fn total(&self) -> u32 {
        self.carried.values().sum()
    }

    pub fn free(&self) -> u32 {
        self.capacity.saturating_sub(self.total())
    }

    pub fn is_full(&self) -> bool {
        self.free() == 0
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn count(&self, kind: ResourceKind) -> u32 {
        self.carried.get(&kind).copied().unwrap_or(0)
    }

    /// Add up to `amount`; whatever does not fit is dropped. Returns the
    /// number of units actually stored.
    pub fn add(&mut self, kind: ResourceKind, amount: u32) -> u32 {
        let accepted = amount.min(self.free());
        if accepted > 0 {
            *self.carried.entry(kind).or_insert(0) += accepted;
        }
        accepted
    }

    /// Empty the cargo hold, returning everything that was in it.
    pub fn take_all(&mut self) -> Cost {
        let mut taken = std::mem::take(&mut self.carried);
        taken.retain(|_, amount| *amount > 0);
        taken
    }
}
