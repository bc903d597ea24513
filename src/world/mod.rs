//! World domain plugin for Deepdome.
//!
//! Responsible for:
//! - The tile grid and its procedural generation
//! - Drawing the grid, player, enemies and dome as coloured sprites
//! - Keeping the camera on the player

use bevy::prelude::*;

mod generation;
mod grid;
pub mod render;

pub use generation::generate;
pub use grid::{HomeRect, TileWorld};

use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<render::TileSprites>()
            .add_systems(
                PostUpdate,
                (
                    render::rebuild_on_new_session,
                    render::repaint_depleted_tiles,
                    render::shade_dig_target,
                    render::sync_player_sprite,
                    render::sync_dome_sprite,
                    render::sync_enemy_sprites,
                    render::camera_follow_player,
                )
                    .chain()
                    .run_if(resource_exists::<crate::session::GameSession>)
                    .run_if(not(in_state(GameState::Loading))),
            );
    }
}
