//! Economy domain: banking cargo at the dome and the upgrade shop.
//!
//! The ledger and upgrade levels live in `GameSession`. These systems react
//! to the interact and upgrade keys and report what happened as events.

use bevy::prelude::*;

use crate::session::{GameSession, TickSet};
use crate::shared::*;

pub mod ledger;
pub mod upgrades;

use upgrades::PurchaseOutcome;

// ─────────────────────────────────────────────────────────────────────────────
// Plugin
// ─────────────────────────────────────────────────────────────────────────────

pub struct EconomyPlugin;

impl Plugin for EconomyPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (handle_deposit, handle_upgrade_request)
                .chain()
                .in_set(TickSet::Economy),
        );
    }
}

fn handle_deposit(
    input: Res<PlayerInput>,
    mut session: ResMut<GameSession>,
    mut deposits: EventWriter<DepositEvent>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    if !input.interact {
        return;
    }
    if !session.near_home() {
        debug!("[Economy] Too far from the dome to deposit");
        return;
    }
    let moved = session.deposit();
    if moved.is_empty() {
        return;
    }
    info!(
        "[Economy] Deposited {} units ({} kinds)",
        moved.values().sum::<u32>(),
        moved.len()
    );
    deposits.send(DepositEvent {
        amounts: moved.into_iter().collect(),
    });
    sfx.send(PlaySfxEvent {
        sfx_id: "deposit".to_string(),
    });
}

fn handle_upgrade_request(
    input: Res<PlayerInput>,
    mut session: ResMut<GameSession>,
    mut purchased: EventWriter<UpgradePurchasedEvent>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    let Some(kind) = input.upgrade else {
        return;
    };
    if !session.near_home() {
        info!("[Economy] Upgrades are only sold at the dome");
        return;
    }
    match session.purchase(kind) {
        PurchaseOutcome::Purchased { level } => {
            info!("[Economy] Bought {:?} level {}", kind, level);
            purchased.send(UpgradePurchasedEvent { kind, level });
            sfx.send(PlaySfxEvent {
                sfx_id: "upgrade".to_string(),
            });
        }
        PurchaseOutcome::MaxLevel => {
            info!("[Economy] {:?} is already at max level", kind);
        }
        PurchaseOutcome::CannotAfford { shortfall } => {
            let missing: Vec<String> = shortfall
                .iter()
                .map(|(resource, amount)| format!("{} {}", amount, resource.key()))
                .collect();
            info!("[Economy] Cannot afford {:?}: need {}", kind, missing.join(", "));
        }
        PurchaseOutcome::Unavailable => {
            warn!("[Economy] No upgrade track configured for {:?}", kind);
        }
    }
}
