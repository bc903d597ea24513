//! Session tuning loaded from RON.
//!
//! `SessionConfig::default()` is the shipped balance. The same values live in
//! `assets/config/session.ron` so designers can copy and tweak them; the
//! binary reads an override from the path in `DEEPDOME_CONFIG`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
#[cfg(not(target_arch = "wasm32"))]
use std::fs;

use crate::shared::*;

pub const CONFIG_ENV_VAR: &str = "DEEPDOME_CONFIG";
pub const SEED_ENV_VAR: &str = "DEEPDOME_SEED";

// ═══════════════════════════════════════════════════════════════════════
// TYPES
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub world: WorldGenConfig,
    pub dig: DigConfig,
    pub enemies: Vec<EnemyStats>,
    pub waves: WaveConfig,
    pub dome: DomeConfig,
    pub upgrades: Vec<UpgradeTrack>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldGenConfig {
    pub width: i32,
    pub height: i32,
    /// Rows `[0, surface_depth)` are open sky.
    pub surface_depth: i32,
    pub home_width: i32,
    pub home_height: i32,
    /// Ordered shallow to deep. A cell uses the first band whose
    /// `max_depth` exceeds its depth, or the last band.
    pub bands: Vec<DepthBand>,
    pub tile_hp: Vec<(TileKind, u32)>,
    pub yields: Vec<YieldRange>,
    pub min_relics: usize,
    pub relic_min_depth: i32,
    pub relic_placement_attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthBand {
    pub max_depth: i32,
    pub weights: Vec<(TileKind, f32)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldRange {
    pub resource: ResourceKind,
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigConfig {
    /// Hit points removed per second of drilling.
    pub drill_power: f32,
    pub carry_capacity: u32,
    /// World units per second.
    pub move_speed: f32,
    pub auto_advance_into_dug_cell: bool,
    /// Distance from the dome centre within which a deposit is allowed.
    pub deposit_radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    pub kind: EnemyKind,
    pub behavior: EnemyBehavior,
    pub hp: f32,
    pub speed: f32,
    pub damage: f32,
    /// Seconds between hits.
    pub attack_interval: f32,
    /// Contact distance for melee/charge, firing distance for ranged.
    pub range: f32,
    pub hp_per_wave: f32,
    pub damage_per_wave: f32,
    pub spawn_weight: f32,
    /// First wave index (0-based) this kind may appear in.
    pub first_wave: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    pub mining_time: f32,
    pub mining_time_shrink: f32,
    pub min_mining_time: f32,
    pub defense_time: f32,
    pub base_batch: u32,
    pub batch_per_wave: u32,
    /// Surviving this many waves wins the session.
    pub max_waves: u32,
    /// Banked relics needed to win.
    pub relic_target: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomeConfig {
    pub max_hp: f32,
    pub max_shield: f32,
    pub regen_hp: f32,
    pub regen_shield: f32,
    pub turret_dps: f32,
    pub turret_range: f32,
    /// Enemies strike the dome once within this distance of its centre.
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeTrack {
    pub kind: UpgradeKind,
    /// Added to the upgraded stat per level.
    pub bonus: f32,
    /// `costs[n]` buys level `n + 1`. Max level is `costs.len()`.
    pub costs: Vec<Cost>,
}

// ═══════════════════════════════════════════════════════════════════════
// LOOKUPS
// ═══════════════════════════════════════════════════════════════════════

impl WorldGenConfig {
    pub fn max_hp(&self, kind: TileKind) -> u32 {
        self.tile_hp
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, hp)| *hp)
            .unwrap_or(1)
    }

    pub fn yield_range(&self, resource: ResourceKind) -> YieldRange {
        self.yields
            .iter()
            .find(|y| y.resource == resource)
            .copied()
            .unwrap_or(YieldRange {
                resource,
                min: 1,
                max: 1,
            })
    }

    pub fn band_for_depth(&self, depth: i32) -> Option<&DepthBand> {
        self.bands
            .iter()
            .find(|band| depth < band.max_depth)
            .or_else(|| self.bands.last())
    }
}

impl SessionConfig {
    pub fn upgrade_track(&self, kind: UpgradeKind) -> Option<&UpgradeTrack> {
        self.upgrades.iter().find(|t| t.kind == kind)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// DEFAULT BALANCE
// ═══════════════════════════════════════════════════════════════════════

fn cost(entries: &[(ResourceKind, u32)]) -> Cost {
    entries.iter().copied().collect::<BTreeMap<_, _>>()
}

impl Default for SessionConfig {
    fn default() -> Self {
        use ResourceKind::*;
        Self {
            world: WorldGenConfig {
                width: 32,
                height: 48,
                surface_depth: 4,
                home_width: 4,
                home_height: 2,
                bands: vec![
                    DepthBand {
                        max_depth: 10,
                        weights: vec![
                            (TileKind::Dirt, 70.0),
                            (TileKind::Stone, 10.0),
                            (TileKind::Ore(Iron), 14.0),
                            (TileKind::Ore(Water), 6.0),
                        ],
                    },
                    DepthBand {
                        max_depth: 25,
                        weights: vec![
                            (TileKind::Dirt, 30.0),
                            (TileKind::Stone, 40.0),
                            (TileKind::Ore(Iron), 12.0),
                            (TileKind::Ore(Water), 8.0),
                            (TileKind::Ore(Cobalt), 8.0),
                            (TileKind::Ore(Gem), 2.0),
                        ],
                    },
                    DepthBand {
                        max_depth: 1000,
                        weights: vec![
                            (TileKind::Stone, 40.0),
                            (TileKind::Bedrock, 35.0),
                            (TileKind::Ore(Cobalt), 12.0),
                            (TileKind::Ore(Gem), 10.0),
                            (TileKind::Ore(Relic), 3.0),
                        ],
                    },
                ],
                tile_hp: vec![
                    (TileKind::Dirt, 2),
                    (TileKind::Stone, 4),
                    (TileKind::Bedrock, 8),
                    (TileKind::Ore(Iron), 3),
                    (TileKind::Ore(Water), 3),
                    (TileKind::Ore(Cobalt), 5),
                    (TileKind::Ore(Gem), 6),
                    (TileKind::Ore(Relic), 10),
                ],
                yields: vec![
                    YieldRange { resource: Iron, min: 1, max: 3 },
                    YieldRange { resource: Water, min: 1, max: 2 },
                    YieldRange { resource: Cobalt, min: 1, max: 2 },
                    YieldRange { resource: Gem, min: 1, max: 1 },
                    YieldRange { resource: Relic, min: 1, max: 1 },
                ],
                min_relics: 3,
                relic_min_depth: 25,
                relic_placement_attempts: 1000,
            },
            dig: DigConfig {
                drill_power: 2.0,
                carry_capacity: 8,
                move_speed: 64.0,
                auto_advance_into_dug_cell: false,
                deposit_radius: 48.0,
            },
            enemies: vec![
                EnemyStats {
                    kind: EnemyKind::Crawler,
                    behavior: EnemyBehavior::Melee,
                    hp: 12.0,
                    speed: 24.0,
                    damage: 4.0,
                    attack_interval: 1.0,
                    range: 4.0,
                    hp_per_wave: 3.0,
                    damage_per_wave: 1.0,
                    spawn_weight: 6.0,
                    first_wave: 0,
                },
                EnemyStats {
                    kind: EnemyKind::Spitter,
                    behavior: EnemyBehavior::Ranged,
                    hp: 8.0,
                    speed: 20.0,
                    damage: 3.0,
                    attack_interval: 1.5,
                    range: 72.0,
                    hp_per_wave: 2.0,
                    damage_per_wave: 1.0,
                    spawn_weight: 3.0,
                    first_wave: 1,
                },
                EnemyStats {
                    kind: EnemyKind::Brute,
                    behavior: EnemyBehavior::Charge,
                    hp: 30.0,
                    speed: 16.0,
                    damage: 10.0,
                    attack_interval: 2.5,
                    range: 6.0,
                    hp_per_wave: 6.0,
                    damage_per_wave: 2.0,
                    spawn_weight: 2.0,
                    first_wave: 3,
                },
            ],
            waves: WaveConfig {
                mining_time: 60.0,
                mining_time_shrink: 4.0,
                min_mining_time: 30.0,
                defense_time: 45.0,
                base_batch: 2,
                batch_per_wave: 1,
                max_waves: 10,
                relic_target: 3,
            },
            dome: DomeConfig {
                max_hp: 100.0,
                max_shield: 30.0,
                regen_hp: 5.0,
                regen_shield: 30.0,
                turret_dps: 8.0,
                turret_range: 160.0,
                radius: 24.0,
            },
            upgrades: vec![
                UpgradeTrack {
                    kind: UpgradeKind::Drill,
                    bonus: 1.0,
                    costs: vec![
                        cost(&[(Iron, 4)]),
                        cost(&[(Iron, 8), (Cobalt, 2)]),
                        cost(&[(Iron, 12), (Cobalt, 4), (Gem, 1)]),
                    ],
                },
                UpgradeTrack {
                    kind: UpgradeKind::Cargo,
                    bonus: 4.0,
                    costs: vec![
                        cost(&[(Iron, 3), (Water, 1)]),
                        cost(&[(Iron, 6), (Water, 3)]),
                        cost(&[(Iron, 10), (Water, 5), (Cobalt, 2)]),
                    ],
                },
                UpgradeTrack {
                    kind: UpgradeKind::Shield,
                    bonus: 15.0,
                    costs: vec![
                        cost(&[(Water, 3)]),
                        cost(&[(Water, 6), (Cobalt, 2)]),
                    ],
                },
                UpgradeTrack {
                    kind: UpgradeKind::Turret,
                    bonus: 4.0,
                    costs: vec![
                        cost(&[(Iron, 5), (Water, 2)]),
                        cost(&[(Iron, 8), (Cobalt, 3)]),
                        cost(&[(Cobalt, 6), (Gem, 2)]),
                    ],
                },
            ],
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// LOADING
// ═══════════════════════════════════════════════════════════════════════

pub fn parse_config(text: &str) -> Result<SessionConfig, String> {
    ron::from_str(text).map_err(|e| format!("Config parse failed: {}", e))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn load_config(path: &str) -> Result<SessionConfig, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("Read failed for {}: {}", path, e))?;
    parse_config(&text)
}

#[cfg(target_arch = "wasm32")]
pub fn load_config(_path: &str) -> Result<SessionConfig, String> {
    Err("Config files not available in browser".to_string())
}

/// Config override from the environment, or the shipped defaults.
pub fn resolve_config() -> SessionConfig {
    match std::env::var(CONFIG_ENV_VAR) {
        Ok(path) => match load_config(&path) {
            Ok(config) => {
                info!("[Config] Loaded session config from {}", path);
                config
            }
            Err(e) => {
                warn!("[Config] {}. Using defaults.", e);
                SessionConfig::default()
            }
        },
        Err(_) => SessionConfig::default(),
    }
}

/// Seed from `DEEPDOME_SEED`, or the clock.
pub fn resolve_seed() -> u64 {
    if let Some(seed) = std::env::var(SEED_ENV_VAR)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
    {
        return seed;
    }
    clock_seed()
}

#[cfg(not(target_arch = "wasm32"))]
fn clock_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

#[cfg(target_arch = "wasm32")]
fn clock_seed() -> u64 {
    rand::random()
}
