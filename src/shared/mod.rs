//! Shared components, resources, events, and states for Deepdome.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain's systems directly; the
//! `GameSession` resource in `crate::session` is the only owner of
//! gameplay state.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod weighted;

pub use weighted::choose_weighted;

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE: top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
    /// Session reached Victory or Defeat; waiting for a restart.
    GameOver,
}

// ═══════════════════════════════════════════════════════════════════════
// RESOURCES & TILES
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Iron,
    Water,
    Cobalt,
    Gem,
    /// Win-condition resource.
    Relic,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Iron,
        ResourceKind::Water,
        ResourceKind::Cobalt,
        ResourceKind::Gem,
        ResourceKind::Relic,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ResourceKind::Iron => "iron",
            ResourceKind::Water => "water",
            ResourceKind::Cobalt => "cobalt",
            ResourceKind::Gem => "gem",
            ResourceKind::Relic => "relic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Empty,
    /// Soft filler, shallow bands.
    Dirt,
    /// Hard filler.
    Stone,
    /// Very hard filler, deep bands.
    Bedrock,
    Ore(ResourceKind),
    Unbreakable,
    HomeStructure,
}

impl TileKind {
    pub fn is_breakable(self) -> bool {
        !matches!(
            self,
            TileKind::Empty | TileKind::Unbreakable | TileKind::HomeStructure
        )
    }

    /// Whether the player and enemies can stand in a cell of this kind.
    pub fn is_passable(self) -> bool {
        matches!(self, TileKind::Empty)
    }

    pub fn resource(self) -> Option<ResourceKind> {
        match self {
            TileKind::Ore(kind) => Some(kind),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    pub remaining_hp: u32,
    pub max_hp: u32,
}

impl Tile {
    pub const EMPTY: Tile = Tile {
        kind: TileKind::Empty,
        remaining_hp: 0,
        max_hp: 0,
    };

    pub fn new(kind: TileKind, max_hp: u32) -> Self {
        if kind.is_breakable() {
            Self {
                kind,
                remaining_hp: max_hp,
                max_hp,
            }
        } else {
            Self {
                kind,
                remaining_hp: 0,
                max_hp: 0,
            }
        }
    }
}

/// Integer grid coordinate. `y` grows downward; row 0 is the sky.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Centre of this cell in world units.
    pub fn center(self) -> Vec2 {
        Vec2::new(
            (self.x as f32 + 0.5) * TILE_SIZE,
            (self.y as f32 + 0.5) * TILE_SIZE,
        )
    }

    pub fn from_world(pos: Vec2) -> Self {
        Self::new(
            (pos.x / TILE_SIZE).floor() as i32,
            (pos.y / TILE_SIZE).floor() as i32,
        )
    }
}

/// Resource amounts keyed by kind. Used for costs and deposits.
pub type Cost = BTreeMap<ResourceKind, u32>;

// ═══════════════════════════════════════════════════════════════════════
// ENEMIES
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Crawler,
    Spitter,
    Brute,
}

/// Movement/attack pattern. Each tag has one pure step function in
/// `crate::defense::enemies`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyBehavior {
    /// Walk straight at the target and hit on contact.
    Melee,
    /// Hold a preferred distance and shoot.
    Ranged,
    /// Wind up, then dash through the target.
    Charge,
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYER INPUT
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Facing {
    /// Grid step for this facing. Down is +y because rows grow downward.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Facing::Up => (0, -1),
            Facing::Down => (0, 1),
            Facing::Left => (-1, 0),
            Facing::Right => (1, 0),
        }
    }

    pub fn from_axis(axis: Vec2) -> Option<Self> {
        if axis == Vec2::ZERO {
            return None;
        }
        if axis.x.abs() > axis.y.abs() {
            Some(if axis.x < 0.0 { Facing::Left } else { Facing::Right })
        } else {
            Some(if axis.y < 0.0 { Facing::Up } else { Facing::Down })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UpgradeKind {
    Drill,
    Cargo,
    Shield,
    Turret,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 4] = [
        UpgradeKind::Drill,
        UpgradeKind::Cargo,
        UpgradeKind::Shield,
        UpgradeKind::Turret,
    ];
}

/// What the core consumes each tick. Filled by the input adapter.
/// `move_axis.y` is in grid orientation (positive = down).
#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerInput {
    pub move_axis: Vec2,
    pub facing: Option<Facing>,
    pub dig: bool,
    pub interact: bool,
    pub upgrade: Option<UpgradeKind>,
    pub restart: bool,
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS: cross-domain communication
// ═══════════════════════════════════════════════════════════════════════

#[derive(Event, Debug, Clone, PartialEq)]
pub struct TileDepletedEvent {
    pub x: i32,
    pub y: i32,
    pub kind: TileKind,
    /// Units that actually went into cargo.
    pub payout: u32,
}

#[derive(Event, Debug, Clone)]
pub struct DepositEvent {
    pub amounts: Vec<(ResourceKind, u32)>,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseChangedEvent {
    DefenseStarted { wave: u32, enemies: usize },
    MiningStarted { wave: u32 },
    Victory,
    Defeat,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct DomeDamagedEvent {
    pub amount: f32,
    pub hp_left: f32,
    pub shield_left: f32,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct UpgradePurchasedEvent {
    pub kind: UpgradeKind,
    pub level: u32,
}

#[derive(Event, Debug, Clone)]
pub struct PlaySfxEvent {
    pub sfx_id: String,
}

/// Requests a full world regeneration and ledger reset.
#[derive(Event, Debug, Clone, Copy)]
pub struct RestartEvent;

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const TILE_SIZE: f32 = 16.0;
pub const PIXEL_SCALE: f32 = 2.0;
pub const SCREEN_WIDTH: f32 = 960.0;
pub const SCREEN_HEIGHT: f32 = 540.0;

/// Smallest grid the generator will build.
pub const MIN_WORLD_WIDTH: i32 = 8;
pub const MIN_WORLD_HEIGHT: i32 = 8;
