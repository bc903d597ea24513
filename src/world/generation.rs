//! Procedural world generation.
//!
//! The grid is a sky band on top of depth-banded rock. Each underground cell
//! draws its kind from the band's weight table, then a post-pass tops up the
//! relic count so every world is winnable. Generation is deterministic for a
//! given seed.

use bevy::prelude::*;
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::config::WorldGenConfig;
use crate::shared::*;
use super::grid::{HomeRect, TileWorld};

const RELIC: TileKind = TileKind::Ore(ResourceKind::Relic);

/// Generate a complete world for `config` from `seed`.
pub fn generate(config: &WorldGenConfig, seed: u64) -> TileWorld {
    let mut rng = StdRng::seed_from_u64(seed);

    // --- Clamp to a playable size ---
    let width = config.width.max(MIN_WORLD_WIDTH);
    let height = config.height.max(MIN_WORLD_HEIGHT);
    let surface_depth = config.surface_depth.clamp(2, height - 3);

    // --- Dome sits on the last sky row, centred ---
    // Leave at least one interior column beside the dome for the spawn cell.
    let home_width = config.home_width.clamp(1, width - 3);
    let home_height = config.home_height.clamp(1, surface_depth - 1);
    let home = HomeRect {
        x: (width - home_width) / 2,
        y: surface_depth - home_height,
        width: home_width,
        height: home_height,
    };

    let mut world = TileWorld::blank(width, height, surface_depth, home);

    // --- Fill cells ---
    for y in 0..height {
        for x in 0..width {
            let cell = Cell::new(x, y);
            let tile = if world.is_border(cell) {
                Tile::new(TileKind::Unbreakable, 0)
            } else if home.contains(cell) {
                Tile::new(TileKind::HomeStructure, 0)
            } else if y < surface_depth {
                Tile::EMPTY
            } else {
                let kind = roll_kind(config, world.depth(cell), &mut rng);
                Tile::new(kind, config.max_hp(kind))
            };
            world.set(cell, tile);
        }
    }

    place_relics(&mut world, config, &mut rng);

    debug!(
        "[World] Generated {}x{} world (seed {}), {} relics",
        width,
        height,
        seed,
        world.count(RELIC)
    );
    world
}

/// Pick a tile kind for an underground cell at `depth`.
fn roll_kind(config: &WorldGenConfig, depth: i32, rng: &mut StdRng) -> TileKind {
    config
        .band_for_depth(depth)
        .and_then(|band| choose_weighted(&band.weights, rng))
        .copied()
        .unwrap_or(TileKind::Dirt)
}

/// A cell that may hold a forced relic.
fn is_relic_slot(world: &TileWorld, config: &WorldGenConfig, cell: Cell) -> bool {
    world.in_bounds(cell)
        && !world.is_border(cell)
        && !world.home().contains(cell)
        && world.depth(cell) >= relic_floor(world, config)
        && world.kind_at(cell) != Some(RELIC)
}

/// Shallowest depth a forced relic may sit at. Pulled up on grids too short
/// for the configured depth so the bottom rows still qualify.
fn relic_floor(world: &TileWorld, config: &WorldGenConfig) -> i32 {
    let deepest = world.height() - 2 - world.surface_depth();
    config.relic_min_depth.clamp(0, deepest.max(0))
}

/// Top up relics to `min_relics`. Random placement first, bounded by
/// `relic_placement_attempts`, then a deterministic bottom-up scan.
fn place_relics(world: &mut TileWorld, config: &WorldGenConfig, rng: &mut StdRng) {
    let mut missing = config.min_relics.saturating_sub(world.count(RELIC));
    if missing == 0 {
        return;
    }

    let relic_tile = Tile::new(RELIC, config.max_hp(RELIC));
    let top = world.surface_depth() + relic_floor(world, config);
    let bottom = world.height() - 1;

    let mut attempts = 0;
    while missing > 0 && attempts < config.relic_placement_attempts && top < bottom {
        attempts += 1;
        let cell = Cell::new(
            rng.gen_range(1..world.width() - 1),
            rng.gen_range(top..bottom),
        );
        if is_relic_slot(world, config, cell) {
            world.set(cell, relic_tile);
            missing -= 1;
        }
    }

    if missing == 0 {
        return;
    }

    warn!(
        "[World] Relic placement exhausted {} attempts with {} still missing; scanning",
        attempts, missing
    );
    'scan: for y in (1..world.height() - 1).rev() {
        for x in 1..world.width() - 1 {
            if missing == 0 {
                break 'scan;
            }
            let cell = Cell::new(x, y);
            if is_relic_slot(world, config, cell) {
                world.set(cell, relic_tile);
                missing -= 1;
            }
        }
    }

    if missing > 0 {
        warn!(
            "[World] Grid too small for {} relics; {} could not be placed",
            config.min_relics, missing
        );
    }
}
