//! Upgrade shop at the dome: drill, cargo hold, dome shield, turret.
//!
//! Validates:
//!   - The upgrade track exists in config
//!   - The upgrade is not already at max level
//!   - The ledger covers the next level's full cost
//!
//! On success the cost is paid atomically and the level goes up by one.
//! Applying the stat bonus is the session's job.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::SessionConfig;
use crate::shared::*;
use super::ledger::ResourceLedger;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeLevels {
    levels: BTreeMap<UpgradeKind, u32>,
}

impl UpgradeLevels {
    pub fn level(&self, kind: UpgradeKind) -> u32 {
        self.levels.get(&kind).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Purchased { level: u32 },
    MaxLevel,
    CannotAfford { shortfall: Cost },
    /// No track configured for this upgrade.
    Unavailable,
}

/// Cost of the next level, or `None` when maxed or not configured.
pub fn next_cost<'a>(config: &'a SessionConfig, levels: &UpgradeLevels, kind: UpgradeKind) -> Option<&'a Cost> {
    config
        .upgrade_track(kind)
        .and_then(|track| track.costs.get(levels.level(kind) as usize))
}

pub fn purchase(
    config: &SessionConfig,
    ledger: &mut ResourceLedger,
    levels: &mut UpgradeLevels,
    kind: UpgradeKind,
) -> PurchaseOutcome {
    if config.upgrade_track(kind).is_none() {
        return PurchaseOutcome::Unavailable;
    }
    let Some(cost) = next_cost(config, levels, kind) else {
        return PurchaseOutcome::MaxLevel;
    };
    if !ledger.pay(cost) {
        return PurchaseOutcome::CannotAfford {
            shortfall: ledger.shortfall(cost),
        };
    }
    let level = levels.levels.entry(kind).or_insert(0);
    *level += 1;
    PurchaseOutcome::Purchased { level: *level }
}
