//! Enemy stats, wave batches, and per-behavior AI.
//!
//! Each behavior is one pure function from the current enemy and its target
//! to the enemy's next state plus any hits it lands this tick.

use bevy::prelude::*;
use rand::Rng;

use crate::config::{EnemyStats, SessionConfig};
use crate::shared::*;
use crate::world::TileWorld;

/// Ranged enemies back off when closer than this share of their range.
const RANGED_TOO_CLOSE: f32 = 0.5;
/// Chargers start winding up within this many tiles of striking distance.
const CHARGE_TRIGGER_TILES: f32 = 4.0;
const CHARGE_WIND_UP: f32 = 0.6;
const CHARGE_SPEED_MULTIPLIER: f32 = 4.0;
const CHARGE_MAX_DASH: f32 = 1.5;
/// Slack on reach checks so an enemy parked exactly at range still strikes.
const REACH_EPSILON: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChargeState {
    Approach,
    WindUp { remaining: f32 },
    Dashing { direction: Vec2, remaining: f32 },
    Recover { remaining: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub behavior: EnemyBehavior,
    pub position: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub speed: f32,
    pub damage_per_hit: f32,
    pub attack_interval: f32,
    pub range: f32,
    /// Seconds until the next hit is allowed.
    pub cooldown: f32,
    pub charge: ChargeState,
}

impl Enemy {
    /// Build an enemy for `wave` (0-based) from its base stats.
    pub fn from_stats(id: u32, stats: &EnemyStats, wave: u32, position: Vec2) -> Self {
        let w = wave as f32;
        let hp = (stats.hp + stats.hp_per_wave * w).max(1.0);
        Self {
            id,
            kind: stats.kind,
            behavior: stats.behavior,
            position,
            hp,
            max_hp: hp,
            speed: stats.speed,
            damage_per_hit: stats.damage + stats.damage_per_wave * w,
            attack_interval: stats.attack_interval.max(0.1),
            range: stats.range,
            cooldown: 0.0,
            charge: ChargeState::Approach,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }
}

/// What enemies are trying to hit: a circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrikeTarget {
    pub position: Vec2,
    pub radius: f32,
}

impl StrikeTarget {
    /// Distance from `pos` to the edge of the target.
    fn gap(&self, pos: Vec2) -> f32 {
        (pos.distance(self.position) - self.radius).max(0.0)
    }

    fn in_reach(&self, pos: Vec2, range: f32) -> bool {
        self.gap(pos) <= range + REACH_EPSILON
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageEvent {
    pub enemy_id: u32,
    pub amount: f32,
}

/// Advance one enemy by `dt`. Pure: returns the next state and its hits.
pub fn step(enemy: &Enemy, target: &StrikeTarget, dt: f32) -> (Enemy, Vec<DamageEvent>) {
    match enemy.behavior {
        EnemyBehavior::Melee => step_melee(enemy, target, dt),
        EnemyBehavior::Ranged => step_ranged(enemy, target, dt),
        EnemyBehavior::Charge => step_charge(enemy, target, dt),
    }
}

/// Move toward the target until within `range` of its edge.
fn approach(position: Vec2, target: &StrikeTarget, range: f32, distance: f32) -> Vec2 {
    let gap = target.gap(position);
    if target.in_reach(position, range) {
        return position;
    }
    let travel = distance.min(gap - range);
    position + (target.position - position).normalize_or_zero() * travel
}

fn strike(next: &mut Enemy, hits: &mut Vec<DamageEvent>) {
    if next.cooldown <= 0.0 {
        hits.push(DamageEvent {
            enemy_id: next.id,
            amount: next.damage_per_hit,
        });
        next.cooldown = next.attack_interval;
    }
}

fn step_melee(enemy: &Enemy, target: &StrikeTarget, dt: f32) -> (Enemy, Vec<DamageEvent>) {
    let mut next = enemy.clone();
    let mut hits = Vec::new();
    next.cooldown = (next.cooldown - dt).max(0.0);
    next.position = approach(enemy.position, target, enemy.range, enemy.speed * dt);
    if target.in_reach(next.position, enemy.range) {
        strike(&mut next, &mut hits);
    }
    (next, hits)
}

fn step_ranged(enemy: &Enemy, target: &StrikeTarget, dt: f32) -> (Enemy, Vec<DamageEvent>) {
    let mut next = enemy.clone();
    let mut hits = Vec::new();
    next.cooldown = (next.cooldown - dt).max(0.0);

    let gap = target.gap(enemy.position);
    if gap > enemy.range {
        next.position = approach(enemy.position, target, enemy.range, enemy.speed * dt);
    } else if gap < enemy.range * RANGED_TOO_CLOSE {
        let away = (enemy.position - target.position).normalize_or_zero();
        next.position = enemy.position + away * enemy.speed * dt;
    }
    if target.in_reach(next.position, enemy.range) {
        strike(&mut next, &mut hits);
    }
    (next, hits)
}

fn step_charge(enemy: &Enemy, target: &StrikeTarget, dt: f32) -> (Enemy, Vec<DamageEvent>) {
    let mut next = enemy.clone();
    let mut hits = Vec::new();
    next.cooldown = (next.cooldown - dt).max(0.0);

    match enemy.charge {
        ChargeState::Approach => {
            let trigger = enemy.range + CHARGE_TRIGGER_TILES * TILE_SIZE;
            next.position = approach(enemy.position, target, trigger, enemy.speed * dt);
            if target.in_reach(next.position, trigger) {
                next.charge = ChargeState::WindUp {
                    remaining: CHARGE_WIND_UP,
                };
            }
        }
        ChargeState::WindUp { remaining } => {
            let remaining = remaining - dt;
            next.charge = if remaining <= 0.0 {
                ChargeState::Dashing {
                    direction: (target.position - enemy.position).normalize_or_zero(),
                    remaining: CHARGE_MAX_DASH,
                }
            } else {
                ChargeState::WindUp { remaining }
            };
        }
        ChargeState::Dashing {
            direction,
            remaining,
        } => {
            let travel = enemy.speed * CHARGE_SPEED_MULTIPLIER * dt;
            let gap = target.gap(enemy.position);
            next.position = enemy.position + direction * travel.min((gap - enemy.range).max(0.0));
            let remaining = remaining - dt;
            if target.in_reach(next.position, enemy.range) {
                hits.push(DamageEvent {
                    enemy_id: enemy.id,
                    amount: enemy.damage_per_hit,
                });
                next.cooldown = enemy.attack_interval;
                next.charge = ChargeState::Recover {
                    remaining: enemy.attack_interval,
                };
            } else if remaining <= 0.0 {
                next.charge = ChargeState::Recover {
                    remaining: enemy.attack_interval,
                };
            } else {
                next.charge = ChargeState::Dashing {
                    direction,
                    remaining,
                };
            }
        }
        ChargeState::Recover { remaining } => {
            let remaining = remaining - dt;
            next.charge = if remaining <= 0.0 {
                ChargeState::Approach
            } else {
                ChargeState::Recover { remaining }
            };
        }
    }
    (next, hits)
}

// ═══════════════════════════════════════════════════════════════════════
// WAVE BATCHES
// ═══════════════════════════════════════════════════════════════════════

/// Used when the config has no enemy entries at all.
fn fallback_stats() -> EnemyStats {
    EnemyStats {
        kind: EnemyKind::Crawler,
        behavior: EnemyBehavior::Melee,
        hp: 10.0,
        speed: 24.0,
        damage: 4.0,
        attack_interval: 1.0,
        range: 4.0,
        hp_per_wave: 2.0,
        damage_per_wave: 1.0,
        spawn_weight: 1.0,
        first_wave: 0,
    }
}

/// Pick an enemy kind unlocked by `wave`.
fn pick_stats<'a, R: Rng + ?Sized>(config: &'a SessionConfig, wave: u32, rng: &mut R) -> Option<&'a EnemyStats> {
    let eligible: Vec<(&EnemyStats, f32)> = config
        .enemies
        .iter()
        .filter(|stats| stats.first_wave <= wave)
        .map(|stats| (stats, stats.spawn_weight))
        .collect();
    choose_weighted(&eligible, rng)
        .copied()
        .or_else(|| config.enemies.first())
}

/// Spawn points on the left and right edges of the sky band.
fn spawn_point<R: Rng + ?Sized>(world: &TileWorld, rng: &mut R) -> Vec2 {
    let x = if rng.gen_bool(0.5) { 1 } else { world.width() - 2 };
    let top = 1;
    let bottom = (world.surface_depth() - 1).max(top);
    let y = rng.gen_range(top..=bottom);
    Cell::new(x, y).center()
}

/// Build `size` enemies for `wave`. Ids start at `first_id`.
pub fn spawn_batch<R: Rng + ?Sized>(
    config: &SessionConfig,
    world: &TileWorld,
    wave: u32,
    size: u32,
    first_id: u32,
    rng: &mut R,
) -> Vec<Enemy> {
    let fallback = fallback_stats();
    (0..size)
        .map(|i| {
            let stats = pick_stats(config, wave, rng).unwrap_or(&fallback);
            let position = spawn_point(world, rng);
            Enemy::from_stats(first_id + i, stats, wave, position)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::generate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn stats(behavior: EnemyBehavior) -> EnemyStats {
        let config = SessionConfig::default();
        config
            .enemies
            .iter()
            .find(|e| e.behavior == behavior)
            .cloned()
            .unwrap_or_else(fallback_stats)
    }

    fn target() -> StrikeTarget {
        StrikeTarget {
            position: Vec2::ZERO,
            radius: 20.0,
        }
    }

    fn run(enemy: &Enemy, seconds: f32) -> (Enemy, Vec<DamageEvent>) {
        let dt = 1.0 / 30.0;
        let mut current = enemy.clone();
        let mut all_hits = Vec::new();
        let steps = (seconds / dt).round() as usize;
        for _ in 0..steps {
            let (next, hits) = step(&current, &target(), dt);
            current = next;
            all_hits.extend(hits);
        }
        (current, all_hits)
    }

    #[test]
    fn melee_walks_in_then_hits_on_cooldown() {
        let enemy = Enemy::from_stats(1, &stats(EnemyBehavior::Melee), 0, Vec2::new(200.0, 0.0));
        let (first, hits) = step(&enemy, &target(), 0.1);
        assert!(first.position.x < 200.0);
        assert!(hits.is_empty());

        let (arrived, hits) = run(&enemy, 20.0);
        assert!(target().in_reach(arrived.position, arrived.range));
        assert!(!hits.is_empty());
        // Hits are spaced by the attack interval.
        let max_hits = (20.0 / enemy.attack_interval).ceil() as usize + 1;
        assert!(hits.len() <= max_hits);
        assert!(hits.iter().all(|h| h.enemy_id == 1 && h.amount == enemy.damage_per_hit));
    }

    #[test]
    fn melee_step_is_pure() {
        let enemy = Enemy::from_stats(1, &stats(EnemyBehavior::Melee), 0, Vec2::new(50.0, 0.0));
        let snapshot = enemy.clone();
        let a = step(&enemy, &target(), 0.2);
        let b = step(&enemy, &target(), 0.2);
        assert_eq!(enemy, snapshot);
        assert_eq!(a.0, b.0);
        assert_eq!(a.1, b.1);
    }

    #[test]
    fn ranged_holds_distance_and_fires() {
        let enemy = Enemy::from_stats(2, &stats(EnemyBehavior::Ranged), 0, Vec2::new(300.0, 0.0));
        let (settled, hits) = run(&enemy, 30.0);
        let gap = target().gap(settled.position);
        assert!(gap <= enemy.range + 1e-3, "gap {gap}");
        assert!(gap >= enemy.range * RANGED_TOO_CLOSE - 1e-3, "gap {gap}");
        assert!(!hits.is_empty());
    }

    #[test]
    fn ranged_backs_off_when_too_close() {
        let enemy = Enemy::from_stats(2, &stats(EnemyBehavior::Ranged), 0, Vec2::new(25.0, 0.0));
        let (next, _) = step(&enemy, &target(), 0.1);
        assert!(next.position.x > enemy.position.x);
    }

    #[test]
    fn charger_winds_up_dashes_and_recovers() {
        let enemy = Enemy::from_stats(3, &stats(EnemyBehavior::Charge), 0, Vec2::new(400.0, 0.0));
        let mut current = enemy.clone();
        let mut saw = (false, false, false);
        let mut hit_count = 0;
        for _ in 0..(60 * 30) {
            let (next, hits) = step(&current, &target(), 1.0 / 60.0);
            match next.charge {
                ChargeState::WindUp { .. } => saw.0 = true,
                ChargeState::Dashing { .. } => saw.1 = true,
                ChargeState::Recover { .. } => saw.2 = true,
                ChargeState::Approach => {}
            }
            hit_count += hits.len();
            current = next;
        }
        assert!(saw.0 && saw.1 && saw.2, "states seen: {:?}", saw);
        assert!(hit_count > 0);
    }

    #[test]
    fn batch_has_requested_size_and_unique_ids() {
        let config = SessionConfig::default();
        let world = generate(&config.world, 4);
        let mut rng = StdRng::seed_from_u64(8);
        let batch = spawn_batch(&config, &world, 5, 7, 100, &mut rng);
        assert_eq!(batch.len(), 7);
        let ids: Vec<u32> = batch.iter().map(|e| e.id).collect();
        assert_eq!(ids, (100..107).collect::<Vec<_>>());
        for enemy in &batch {
            let cell = Cell::from_world(enemy.position);
            assert!(cell.y < world.surface_depth());
            assert!(world.is_passable(cell), "spawned inside {:?}", cell);
        }
    }

    #[test]
    fn early_waves_only_use_unlocked_kinds() {
        let config = SessionConfig::default();
        let world = generate(&config.world, 4);
        let mut rng = StdRng::seed_from_u64(1);
        let batch = spawn_batch(&config, &world, 0, 50, 0, &mut rng);
        assert!(batch.iter().all(|e| e.kind == EnemyKind::Crawler));
    }

    #[test]
    fn stats_scale_with_wave() {
        let base = stats(EnemyBehavior::Melee);
        let early = Enemy::from_stats(0, &base, 0, Vec2::ZERO);
        let late = Enemy::from_stats(0, &base, 6, Vec2::ZERO);
        assert!(late.max_hp > early.max_hp);
        assert!(late.damage_per_hit > early.damage_per_hit);
    }

    #[test]
    fn empty_roster_still_spawns() {
        let mut config = SessionConfig::default();
        config.enemies.clear();
        let world = generate(&config.world, 4);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(spawn_batch(&config, &world, 0, 3, 0, &mut rng).len(), 3);
    }
}
