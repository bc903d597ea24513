use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::mining::Cargo;
use crate::shared::*;

/// Banked resources. Only `deposit` adds to it and only `pay` takes from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLedger {
    banked: BTreeMap<ResourceKind, u64>,
}

impl ResourceLedger {
    pub fn balance(&self, kind: ResourceKind) -> u64 {
        self.banked.get(&kind).copied().unwrap_or(0)
    }

    pub fn can_afford(&self, cost: &Cost) -> bool {
        cost.iter()
            .all(|(kind, amount)| self.balance(*kind) >= u64::from(*amount))
    }

    /// What is still missing to cover `cost`. Empty when affordable.
    pub fn shortfall(&self, cost: &Cost) -> Cost {
        cost.iter()
            .filter_map(|(kind, amount)| {
                let have = self.balance(*kind);
                let need = u64::from(*amount);
                (have < need).then(|| (*kind, (need - have) as u32))
            })
            .collect()
    }

    /// Deduct every entry of `cost`, or nothing at all.
    pub fn pay(&mut self, cost: &Cost) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        for (kind, amount) in cost {
            if let Some(balance) = self.banked.get_mut(kind) {
                *balance -= u64::from(*amount);
            }
        }
        true
    }

    fn credit(&mut self, kind: ResourceKind, amount: u32) {
        let balance = self.banked.entry(kind).or_insert(0);
        *balance = balance.saturating_add(u64::from(amount));
    }
}

/// Move everything in `cargo` into `ledger`. Returns what was moved;
/// empty when the hold was empty. Proximity to the dome is the caller's check.
pub fn deposit(ledger: &mut ResourceLedger, cargo: &mut Cargo) -> Cost {
    let moved = cargo.take_all();
    for (kind, amount) in &moved {
        ledger.credit(*kind, *amount);
    }
    moved
}
