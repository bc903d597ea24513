//! Coloured-sprite view of the session.
//!
//! Grid rows grow downward while Bevy's y axis grows upward, so every
//! world position is flipped on the way to a `Transform`.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::session::GameSession;
use crate::shared::*;

const SKY_COLOR: Color = Color::srgb(0.42, 0.30, 0.38);
const TUNNEL_COLOR: Color = Color::srgb(0.12, 0.09, 0.11);
const DIRT_COLOR: Color = Color::srgb(0.55, 0.38, 0.24);
const STONE_COLOR: Color = Color::srgb(0.45, 0.42, 0.40);
const BEDROCK_COLOR: Color = Color::srgb(0.26, 0.24, 0.26);
const WALL_COLOR: Color = Color::srgb(0.08, 0.06, 0.10);
const HOME_COLOR: Color = Color::srgb(0.55, 0.75, 0.85);
const IRON_COLOR: Color = Color::srgb(0.70, 0.52, 0.40);
const WATER_COLOR: Color = Color::srgb(0.25, 0.55, 0.85);
const COBALT_COLOR: Color = Color::srgb(0.20, 0.30, 0.80);
const GEM_COLOR: Color = Color::srgb(0.60, 0.20, 0.80);
const RELIC_COLOR: Color = Color::srgb(0.95, 0.82, 0.25);
const PLAYER_COLOR: Color = Color::srgb(0.95, 0.60, 0.20);
const CRAWLER_COLOR: Color = Color::srgb(0.20, 0.80, 0.25);
const SPITTER_COLOR: Color = Color::srgb(0.75, 0.85, 0.20);
const BRUTE_COLOR: Color = Color::srgb(0.80, 0.20, 0.20);

const TILE_Z: f32 = 0.0;
const DOME_Z: f32 = 1.0;
const ENEMY_Z: f32 = 2.0;
const PLAYER_Z: f32 = 3.0;

#[derive(Component, Debug)]
pub struct TileSprite;

#[derive(Component, Debug)]
pub struct PlayerSprite;

#[derive(Component, Debug)]
pub struct DomeSprite;

#[derive(Component, Debug)]
pub struct EnemySprite {
    pub id: u32,
}

/// Tile entities by cell, for the session generation they were built from.
#[derive(Resource, Debug, Default)]
pub struct TileSprites {
    generation: Option<u32>,
    by_cell: HashMap<Cell, Entity>,
}

pub fn world_to_screen(pos: Vec2, z: f32) -> Vec3 {
    Vec3::new(pos.x, -pos.y, z)
}

pub fn tile_color(kind: TileKind, depth: i32) -> Color {
    match kind {
        TileKind::Empty if depth < 0 => SKY_COLOR,
        TileKind::Empty => TUNNEL_COLOR,
        TileKind::Dirt => DIRT_COLOR,
        TileKind::Stone => STONE_COLOR,
        TileKind::Bedrock => BEDROCK_COLOR,
        TileKind::Unbreakable => WALL_COLOR,
        TileKind::HomeStructure => HOME_COLOR,
        TileKind::Ore(ResourceKind::Iron) => IRON_COLOR,
        TileKind::Ore(ResourceKind::Water) => WATER_COLOR,
        TileKind::Ore(ResourceKind::Cobalt) => COBALT_COLOR,
        TileKind::Ore(ResourceKind::Gem) => GEM_COLOR,
        TileKind::Ore(ResourceKind::Relic) => RELIC_COLOR,
    }
}

fn enemy_color(kind: EnemyKind) -> Color {
    match kind {
        EnemyKind::Crawler => CRAWLER_COLOR,
        EnemyKind::Spitter => SPITTER_COLOR,
        EnemyKind::Brute => BRUTE_COLOR,
    }
}

/// Rebuild every sprite when the session is new or was restarted.
pub fn rebuild_on_new_session(
    mut commands: Commands,
    session: Res<GameSession>,
    mut sprites: ResMut<TileSprites>,
    old: Query<Entity, Or<(With<TileSprite>, With<PlayerSprite>, With<DomeSprite>, With<EnemySprite>)>>,
) {
    if sprites.generation == Some(session.generation()) {
        return;
    }
    for entity in &old {
        commands.entity(entity).despawn_recursive();
    }
    sprites.by_cell.clear();

    let world = &session.world;
    for (cell, tile) in world.cells() {
        let entity = commands
            .spawn((
                Sprite {
                    color: tile_color(tile.kind, world.depth(cell)),
                    custom_size: Some(Vec2::new(TILE_SIZE, TILE_SIZE)),
                    ..default()
                },
                Transform::from_translation(world_to_screen(cell.center(), TILE_Z)),
                TileSprite,
            ))
            .id();
        sprites.by_cell.insert(cell, entity);
    }

    let home = world.home();
    commands.spawn((
        Sprite {
            color: HOME_COLOR,
            custom_size: Some(Vec2::splat(session.dome.radius * 2.0)),
            ..default()
        },
        Transform::from_translation(world_to_screen(session.dome.center, DOME_Z)),
        DomeSprite,
    ));
    commands.spawn((
        Sprite {
            color: PLAYER_COLOR,
            custom_size: Some(Vec2::new(TILE_SIZE - 4.0, TILE_SIZE - 4.0)),
            ..default()
        },
        Transform::from_translation(world_to_screen(session.player.position, PLAYER_Z)),
        PlayerSprite,
    ));

    sprites.generation = Some(session.generation());
    debug!(
        "[World] Built {} tile sprites, dome at ({}, {})",
        sprites.by_cell.len(),
        home.x,
        home.y
    );
}

pub fn repaint_depleted_tiles(
    mut events: EventReader<TileDepletedEvent>,
    session: Res<GameSession>,
    sprites: Res<TileSprites>,
    mut tiles: Query<&mut Sprite, With<TileSprite>>,
) {
    for event in events.read() {
        let cell = Cell::new(event.x, event.y);
        let Some(&entity) = sprites.by_cell.get(&cell) else {
            continue;
        };
        if let Ok(mut sprite) = tiles.get_mut(entity) {
            sprite.color = tile_color(TileKind::Empty, session.world.depth(cell));
        }
    }
}

/// Damaged tiles fade toward the tunnel colour as their hp drops.
pub fn shade_dig_target(
    session: Res<GameSession>,
    sprites: Res<TileSprites>,
    mut tiles: Query<&mut Sprite, With<TileSprite>>,
) {
    let Some(cell) = session.dig.target() else {
        return;
    };
    let (Some(tile), Some(&entity)) = (session.world.get(cell), sprites.by_cell.get(&cell)) else {
        return;
    };
    if tile.max_hp == 0 {
        return;
    }
    let Ok(mut sprite) = tiles.get_mut(entity) else {
        return;
    };
    let left = tile.remaining_hp as f32 / tile.max_hp as f32;
    let base = tile_color(tile.kind, session.world.depth(cell)).to_srgba();
    let dark = TUNNEL_COLOR.to_srgba();
    let t = (1.0 - left) * 0.6;
    sprite.color = Color::srgb(
        base.red + (dark.red - base.red) * t,
        base.green + (dark.green - base.green) * t,
        base.blue + (dark.blue - base.blue) * t,
    );
}

pub fn sync_player_sprite(
    session: Res<GameSession>,
    mut query: Query<&mut Transform, With<PlayerSprite>>,
) {
    for mut transform in &mut query {
        transform.translation = world_to_screen(session.player.position, PLAYER_Z);
    }
}

/// Dome brightness follows its remaining hull.
pub fn sync_dome_sprite(session: Res<GameSession>, mut query: Query<&mut Sprite, With<DomeSprite>>) {
    let health = if session.dome.max_hp > 0.0 {
        (session.dome.hp / session.dome.max_hp).clamp(0.0, 1.0)
    } else {
        0.0
    };
    for mut sprite in &mut query {
        sprite.color = HOME_COLOR.with_alpha(0.35 + 0.65 * health);
    }
}

/// One sprite per live enemy, matched by id.
pub fn sync_enemy_sprites(
    mut commands: Commands,
    session: Res<GameSession>,
    mut query: Query<(Entity, &EnemySprite, &mut Transform)>,
) {
    let mut seen = Vec::with_capacity(session.enemies.len());
    for (entity, marker, mut transform) in &mut query {
        match session.enemies.iter().find(|e| e.id == marker.id) {
            Some(enemy) => {
                transform.translation = world_to_screen(enemy.position, ENEMY_Z);
                seen.push(marker.id);
            }
            None => commands.entity(entity).despawn_recursive(),
        }
    }
    for enemy in session.enemies.iter().filter(|e| !seen.contains(&e.id)) {
        commands.spawn((
            Sprite {
                color: enemy_color(enemy.kind),
                custom_size: Some(Vec2::new(TILE_SIZE - 2.0, TILE_SIZE - 2.0)),
                ..default()
            },
            Transform::from_translation(world_to_screen(enemy.position, ENEMY_Z)),
            EnemySprite { id: enemy.id },
        ));
    }
}

/// Lerp the camera toward the player, clamped to the grid.
pub fn camera_follow_player(
    time: Res<Time>,
    session: Res<GameSession>,
    mut camera_query: Query<(&mut Transform, &OrthographicProjection), With<Camera2d>>,
) {
    let Ok((mut cam_tf, projection)) = camera_query.get_single_mut() else {
        return;
    };
    let target = world_to_screen(session.player.position, 0.0);

    let dx = (target.x - cam_tf.translation.x).abs();
    let dy = (target.y - cam_tf.translation.y).abs();
    let (x, y) = if dx > TILE_SIZE * 8.0 || dy > TILE_SIZE * 8.0 {
        (target.x, target.y)
    } else {
        let t = (5.0 * time.delta_secs()).min(1.0);
        (
            cam_tf.translation.x + (target.x - cam_tf.translation.x) * t,
            cam_tf.translation.y + (target.y - cam_tf.translation.y) * t,
        )
    };

    let map_w = session.world.width() as f32 * TILE_SIZE;
    let map_h = session.world.height() as f32 * TILE_SIZE;
    let half_vw = projection.area.width() / 2.0 * cam_tf.scale.x;
    let half_vh = projection.area.height() / 2.0 * cam_tf.scale.y;

    let max_x = (map_w - half_vw).max(half_vw);
    // Screen y is negative below the sky row.
    let min_y = (-map_h + half_vh).min(-half_vh);

    cam_tf.translation.x = x.round().clamp(half_vw, max_x);
    cam_tf.translation.y = y.round().clamp(min_y, -half_vh);
}
