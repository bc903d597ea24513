//! Player movement through dug-out space.
//!
//! The player is a point in world units. A move is split per axis so the
//! player slides along walls instead of sticking to them; each axis step is
//! rejected if it would put the player inside a solid cell.

use bevy::prelude::*;

use crate::shared::*;
use crate::world::TileWorld;

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub position: Vec2,
    pub facing: Facing,
    /// Hit points removed per second of drilling.
    pub drill_power: f32,
    /// World units per second.
    pub move_speed: f32,
}

impl Player {
    pub fn new(cell: Cell, drill_power: f32, move_speed: f32) -> Self {
        Self {
            position: cell.center(),
            facing: Facing::Down,
            drill_power,
            move_speed,
        }
    }

    pub fn cell(&self) -> Cell {
        Cell::from_world(self.position)
    }
}

/// Move `player` by `axis * move_speed * dt`, blocked by solid cells.
/// Facing follows the dominant axis of intent even when the move is blocked,
/// so the player can turn to face a wall and drill it.
pub fn move_player(player: &mut Player, world: &TileWorld, axis: Vec2, dt: f32) {
    if let Some(facing) = Facing::from_axis(axis) {
        player.facing = facing;
    }
    if axis == Vec2::ZERO || dt <= 0.0 {
        return;
    }

    let step = axis.normalize_or_zero() * player.move_speed * dt;
    // Never skip a whole cell in one frame.
    let step = step.clamp_length_max(TILE_SIZE * 0.5);

    let try_x = Vec2::new(player.position.x + step.x, player.position.y);
    if world.is_passable(Cell::from_world(try_x)) {
        player.position = try_x;
    }
    let try_y = Vec2::new(player.position.x, player.position.y + step.y);
    if world.is_passable(Cell::from_world(try_y)) {
        player.position = try_y;
    }
}
