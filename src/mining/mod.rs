//! Mining domain plugin for Deepdome.
//!
//! Provides:
//! - Player movement through dug-out cells
//! - Drilling the cell the player faces, with persistent tile damage
//! - Cargo hold with a capacity limit
//!
//! All state lives in `GameSession`; these systems only translate
//! `PlayerInput` into session calls and session results into events.

mod cargo;
mod excavator;
mod movement;

pub use cargo::Cargo;
pub use excavator::*;
pub use movement::*;

use bevy::prelude::*;

use crate::session::{GameSession, TickSet};
use crate::shared::*;

pub struct MiningPlugin;

impl Plugin for MiningPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, steer_player.in_set(TickSet::Movement))
            .add_systems(Update, drill.in_set(TickSet::Dig));
    }
}

fn steer_player(time: Res<Time>, input: Res<PlayerInput>, mut session: ResMut<GameSession>) {
    if let Some(facing) = input.facing {
        session.face(facing);
    }
    session.move_player(input.move_axis, time.delta_secs());
}

/// Drill while the dig key is held; letting go drops the partial point.
fn drill(
    time: Res<Time>,
    input: Res<PlayerInput>,
    mut session: ResMut<GameSession>,
    mut depleted: EventWriter<TileDepletedEvent>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    if !input.dig {
        session.stop_digging();
        return;
    }

    match session.dig(time.delta_secs()) {
        DigResult::None | DigResult::Progress { .. } => {}
        DigResult::Depleted {
            cell,
            kind,
            payout,
            capacity_reached,
        } => {
            let accepted = payout.map(|p| p.accepted).unwrap_or(0);
            if let Some(p) = payout {
                if p.accepted < p.rolled {
                    info!(
                        "[Mining] Cargo full: discarded {} {}",
                        p.rolled - p.accepted,
                        p.resource.key()
                    );
                }
            }
            if capacity_reached {
                sfx.send(PlaySfxEvent {
                    sfx_id: "cargo_full".to_string(),
                });
            }
            debug!("[Mining] Cleared {:?} at ({}, {})", kind, cell.x, cell.y);
            depleted.send(TileDepletedEvent {
                x: cell.x,
                y: cell.y,
                kind,
                payout: accepted,
            });
            sfx.send(PlaySfxEvent {
                sfx_id: if kind.resource().is_some() {
                    "ore_break".to_string()
                } else {
                    "rock_break".to_string()
                },
            });
        }
    }
}
