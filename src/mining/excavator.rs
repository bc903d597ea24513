//! Dig resolution: the drill chews through the cell the player faces.
//!
//! Tile hit points persist between digs. `DigProgress` only carries the
//! fractional damage that has not yet removed a whole hit point, and it is
//! dropped whenever the target changes or the player stops drilling.

use bevy::prelude::*;
use rand::Rng;

use crate::config::WorldGenConfig;
use crate::shared::*;
use crate::world::TileWorld;
use super::cargo::Cargo;

/// Slack so that sums like `30 * (2.0 / 60.0)` still reach a whole point.
const PROGRESS_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DigProgress {
    target: Option<Cell>,
    accumulated: f32,
}

impl DigProgress {
    pub fn target(&self) -> Option<Cell> {
        self.target
    }

    pub fn accumulated(&self) -> f32 {
        self.accumulated
    }

    pub fn abandon(&mut self) {
        self.target = None;
        self.accumulated = 0.0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payout {
    pub resource: ResourceKind,
    /// Amount drawn from the yield range.
    pub rolled: u32,
    /// Amount that fit in the cargo hold.
    pub accepted: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DigResult {
    /// Nothing diggable, or no drilling force.
    None,
    Progress {
        cell: Cell,
        remaining_hp: u32,
    },
    Depleted {
        cell: Cell,
        kind: TileKind,
        payout: Option<Payout>,
        /// The hold is full after this payout, whether or not anything was
        /// discarded. Discarded units are `payout.rolled - payout.accepted`.
        capacity_reached: bool,
    },
}

impl DigResult {
    pub fn is_none(&self) -> bool {
        matches!(self, DigResult::None)
    }
}

/// The cell adjacent to the player's cell in `facing`.
pub fn dig_target(player_pos: Vec2, facing: Facing) -> Cell {
    let (dx, dy) = facing.delta();
    Cell::from_world(player_pos).offset(dx, dy)
}

/// Apply `drill_power * dt` to `target`.
pub fn try_dig<R: Rng + ?Sized>(
    world: &mut TileWorld,
    progress: &mut DigProgress,
    cargo: &mut Cargo,
    target: Cell,
    drill_power: f32,
    dt: f32,
    config: &WorldGenConfig,
    rng: &mut R,
) -> DigResult {
    let force = drill_power * dt;
    let diggable = world
        .kind_at(target)
        .is_some_and(TileKind::is_breakable);
    if !diggable || !(force > 0.0) {
        progress.abandon();
        return DigResult::None;
    }

    if progress.target != Some(target) {
        progress.target = Some(target);
        progress.accumulated = 0.0;
    }
    progress.accumulated += force;

    let whole = (progress.accumulated + PROGRESS_EPSILON).floor();
    progress.accumulated = (progress.accumulated - whole).max(0.0);

    let Some(tile) = world.get_mut(target) else {
        return DigResult::None;
    };
    tile.remaining_hp = tile.remaining_hp.saturating_sub(whole as u32);
    if tile.remaining_hp > 0 {
        return DigResult::Progress {
            cell: target,
            remaining_hp: tile.remaining_hp,
        };
    }

    let kind = tile.kind;
    *tile = Tile::EMPTY;
    progress.abandon();

    let payout = kind.resource().map(|resource| {
        let range = config.yield_range(resource);
        let rolled = if range.max > range.min {
            rng.gen_range(range.min..=range.max)
        } else {
            range.min
        };
        let accepted = cargo.add(resource, rolled);
        Payout {
            resource,
            rolled,
            accepted,
        }
    });

    DigResult::Depleted {
        cell: target,
        kind,
        capacity_reached: payout.is_some() && cargo.is_full(),
        payout,
    }
}
