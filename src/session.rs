//! The game session: one owner for every piece of run state.
//!
//! Domain plugins borrow `GameSession` mutably in their systems and turn the
//! returned reports into events. `GameSession::tick` runs the same steps in
//! the same order for callers that drive a session without an `App`.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{resolve_config, resolve_seed, SessionConfig};
use crate::defense::dome::Dome;
use crate::defense::enemies::{self, Enemy, StrikeTarget};
use crate::defense::orchestrator::{FieldStatus, Phase, Transition, WaveOrchestrator};
use crate::economy::ledger::{self, ResourceLedger};
use crate::economy::upgrades::{self, PurchaseOutcome, UpgradeLevels};
use crate::mining::{dig_target, move_player, try_dig, Cargo, DigProgress, DigResult, Player};
use crate::shared::*;
use crate::world::{generate, TileWorld};

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

/// Per-frame ordering of everything that touches the session.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSet {
    Movement,
    Dig,
    Economy,
    Combat,
    Phase,
}

pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerInput>()
            .add_event::<TileDepletedEvent>()
            .add_event::<DepositEvent>()
            .add_event::<PhaseChangedEvent>()
            .add_event::<DomeDamagedEvent>()
            .add_event::<UpgradePurchasedEvent>()
            .add_event::<PlaySfxEvent>()
            .add_event::<RestartEvent>()
            .configure_sets(
                Update,
                (
                    TickSet::Movement,
                    TickSet::Dig,
                    TickSet::Economy,
                    TickSet::Combat,
                    TickSet::Phase,
                )
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(Startup, init_session)
            .add_systems(Update, enter_game_over.after(TickSet::Phase))
            .add_systems(
                Update,
                request_restart.run_if(in_state(GameState::GameOver)),
            )
            .add_systems(Update, handle_restart.after(request_restart));
    }
}

/// Builds the session from the environment unless one was inserted already.
fn init_session(
    mut commands: Commands,
    existing: Option<Res<GameSession>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if existing.is_none() {
        let session = GameSession::new(resolve_config(), resolve_seed());
        commands.insert_resource(session);
    }
    next_state.set(GameState::Playing);
}

fn enter_game_over(
    session: Option<Res<GameSession>>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let Some(session) = session else {
        return;
    };
    if session.is_over() && *state.get() == GameState::Playing {
        next_state.set(GameState::GameOver);
    }
}

fn request_restart(input: Res<PlayerInput>, mut restarts: EventWriter<RestartEvent>) {
    if input.restart {
        restarts.send(RestartEvent);
    }
}

fn handle_restart(
    mut events: EventReader<RestartEvent>,
    session: Option<ResMut<GameSession>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if events.read().count() == 0 {
        return;
    }
    let Some(mut session) = session else {
        return;
    };
    session.restart();
    next_state.set(GameState::Playing);
}

// ═══════════════════════════════════════════════════════════════════════
// SESSION
// ═══════════════════════════════════════════════════════════════════════

/// Counters for the profile summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub tiles_dug: u32,
    /// The hold was full at least once.
    pub cargo_filled: bool,
    /// Total banked over the run, per resource.
    pub banked: Cost,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombatReport {
    pub dome_damage: f32,
    pub hp_lost: f32,
    pub killed: usize,
}

/// Everything one `tick` did.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub dig: DigResult,
    pub deposited: Cost,
    pub purchase: Option<(UpgradeKind, PurchaseOutcome)>,
    pub combat: CombatReport,
    pub transition: Option<Transition>,
}

#[derive(Resource, Debug, Clone)]
pub struct GameSession {
    pub config: SessionConfig,
    seed: u64,
    pub world: TileWorld,
    pub player: Player,
    pub dig: DigProgress,
    pub cargo: Cargo,
    pub ledger: ResourceLedger,
    pub upgrades: UpgradeLevels,
    pub enemies: Vec<Enemy>,
    pub dome: Dome,
    pub orchestrator: WaveOrchestrator,
    pub stats: RunStats,
    rng: StdRng,
    next_enemy_id: u32,
    /// Bumped on every restart so adapters know to rebuild.
    generation: u32,
}

impl GameSession {
    pub fn new(config: SessionConfig, seed: u64) -> Self {
        let world = generate(&config.world, seed);
        let player = Player::new(world.spawn_cell(), config.dig.drill_power, config.dig.move_speed);
        let dome = Dome::new(&config.dome, world.home().center());
        info!(
            "[World] New session: seed {}, {}x{} grid",
            seed,
            world.width(),
            world.height()
        );
        Self {
            cargo: Cargo::with_capacity(config.dig.carry_capacity),
            orchestrator: WaveOrchestrator::new(config.waves.clone()),
            // Offset so gameplay rolls don't replay the generator's stream.
            rng: StdRng::seed_from_u64(seed.wrapping_add(0x9E37_79B9_7F4A_7C15)),
            world,
            player,
            dome,
            config,
            seed,
            dig: DigProgress::default(),
            ledger: ResourceLedger::default(),
            upgrades: UpgradeLevels::default(),
            enemies: Vec::new(),
            stats: RunStats::default(),
            next_enemy_id: 0,
            generation: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn phase(&self) -> Phase {
        self.orchestrator.phase()
    }

    pub fn is_over(&self) -> bool {
        self.orchestrator.is_over()
    }

    /// Regenerate everything with a fresh seed drawn from this run.
    pub fn restart(&mut self) {
        let seed = self.rng.gen();
        let generation = self.generation + 1;
        *self = GameSession::new(self.config.clone(), seed);
        self.generation = generation;
    }

    /// Within deposit range of the dome.
    pub fn near_home(&self) -> bool {
        self.player.position.distance(self.dome.center) <= self.config.dig.deposit_radius
    }

    pub fn move_player(&mut self, axis: Vec2, dt: f32) {
        if self.is_over() {
            return;
        }
        move_player(&mut self.player, &self.world, axis, dt);
    }

    pub fn face(&mut self, facing: Facing) {
        if !self.is_over() {
            self.player.facing = facing;
        }
    }

    /// Drill the cell in front of the player for `dt` seconds.
    pub fn dig(&mut self, dt: f32) -> DigResult {
        if self.is_over() {
            return DigResult::None;
        }
        let target = dig_target(self.player.position, self.player.facing);
        let result = try_dig(
            &mut self.world,
            &mut self.dig,
            &mut self.cargo,
            target,
            self.player.drill_power,
            dt,
            &self.config.world,
            &mut self.rng,
        );
        if let DigResult::Depleted {
            cell,
            capacity_reached,
            ..
        } = result
        {
            self.stats.tiles_dug += 1;
            self.stats.cargo_filled |= capacity_reached;
            if self.config.dig.auto_advance_into_dug_cell {
                self.player.position = cell.center();
            }
        }
        result
    }

    pub fn stop_digging(&mut self) {
        self.dig.abandon();
    }

    /// Bank the whole hold if the player is at the dome.
    pub fn deposit(&mut self) -> Cost {
        if self.is_over() || !self.near_home() {
            return Cost::new();
        }
        let moved = ledger::deposit(&mut self.ledger, &mut self.cargo);
        for (&kind, &amount) in &moved {
            *self.stats.banked.entry(kind).or_insert(0) += amount;
        }
        moved
    }

    /// Buy the next level of `kind` and apply its bonus.
    pub fn purchase(&mut self, kind: UpgradeKind) -> PurchaseOutcome {
        if self.is_over() {
            return PurchaseOutcome::Unavailable;
        }
        let outcome = upgrades::purchase(&self.config, &mut self.ledger, &mut self.upgrades, kind);
        if let PurchaseOutcome::Purchased { .. } = outcome {
            let bonus = self
                .config
                .upgrade_track(kind)
                .map(|track| track.bonus)
                .unwrap_or(0.0);
            match kind {
                UpgradeKind::Drill => self.player.drill_power += bonus,
                UpgradeKind::Cargo => {
                    let capacity = self.cargo.capacity().saturating_add(bonus.max(0.0) as u32);
                    self.cargo.set_capacity(capacity);
                }
                UpgradeKind::Shield => {
                    self.dome.max_shield += bonus;
                    self.dome.shield += bonus;
                }
                UpgradeKind::Turret => self.dome.turret_dps += bonus,
            }
        }
        outcome
    }

    /// Enemies step against the dome, then the turret fires. Dead enemies
    /// are removed.
    pub fn combat(&mut self, dt: f32) -> CombatReport {
        let mut report = CombatReport::default();
        if self.is_over() || self.enemies.is_empty() {
            return report;
        }
        let target = StrikeTarget {
            position: self.dome.center,
            radius: self.dome.radius,
        };
        for enemy in self.enemies.iter_mut() {
            let (next, hits) = enemies::step(enemy, &target, dt);
            *enemy = next;
            for hit in hits {
                report.dome_damage += hit.amount;
                report.hp_lost += self.dome.take_damage(hit.amount);
            }
        }

        let center = self.dome.center;
        let range = self.dome.turret_range;
        let nearest = self
            .enemies
            .iter_mut()
            .filter(|e| !e.is_dead() && e.position.distance(center) <= range)
            .min_by(|a, b| {
                a.position
                    .distance_squared(center)
                    .total_cmp(&b.position.distance_squared(center))
            });
        if let Some(enemy) = nearest {
            enemy.hp -= self.dome.turret_dps * dt.max(0.0);
        }

        let before = self.enemies.len();
        self.enemies.retain(|e| !e.is_dead());
        report.killed = before - self.enemies.len();
        report
    }

    /// Run the phase machine and carry out whatever it decided.
    pub fn advance_phase(&mut self, dt: f32) -> Option<Transition> {
        let status = FieldStatus {
            enemies_alive: self.enemies.len(),
            dome_hp: self.dome.hp,
            relics_banked: self.ledger.balance(ResourceKind::Relic),
        };
        let transition = self.orchestrator.advance(dt, status)?;
        match transition {
            Transition::DefenseStarted { wave, batch } => {
                let spawned = enemies::spawn_batch(
                    &self.config,
                    &self.world,
                    wave,
                    batch,
                    self.next_enemy_id,
                    &mut self.rng,
                );
                self.next_enemy_id = self.next_enemy_id.wrapping_add(batch);
                self.enemies = spawned;
            }
            Transition::MiningStarted { .. } => {
                self.enemies.clear();
                self.dome
                    .regenerate(self.config.dome.regen_hp, self.config.dome.regen_shield);
            }
            Transition::Victory | Transition::Defeat => {}
        }
        Some(transition)
    }

    /// One full frame: input, dig and movement, combat, phase.
    pub fn tick(&mut self, input: &PlayerInput, dt: f32) -> TickReport {
        if let Some(facing) = input.facing {
            self.face(facing);
        }
        self.move_player(input.move_axis, dt);
        let dig = if input.dig {
            self.dig(dt)
        } else {
            self.stop_digging();
            DigResult::None
        };
        let deposited = if input.interact {
            self.deposit()
        } else {
            Cost::new()
        };
        let purchase = input.upgrade.map(|kind| (kind, self.purchase(kind)));
        let combat = self.combat(dt);
        let transition = self.advance_phase(dt);
        TickReport {
            dig,
            deposited,
            purchase,
            combat,
            transition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> GameSession {
        GameSession::new(SessionConfig::default(), 7)
    }

    fn idle() -> PlayerInput {
        PlayerInput::default()
    }

    #[test]
    fn new_session_starts_in_mining_at_the_dome() {
        let s = session();
        assert!(matches!(s.phase(), Phase::Mining { .. }));
        assert!(s.near_home());
        assert!(s.cargo.is_empty());
        assert!(s.enemies.is_empty());
    }

    #[test]
    fn same_seed_same_world() {
        assert_eq!(session().world, session().world);
    }

    #[test]
    fn digging_down_from_spawn_clears_the_cell() {
        let mut s = session();
        let input = PlayerInput {
            facing: Some(Facing::Down),
            dig: true,
            ..idle()
        };
        let below = s.player.cell().offset(0, 1);
        let mut depleted = false;
        for _ in 0..600 {
            if let DigResult::Depleted { cell, .. } = s.tick(&input, 1.0 / 60.0).dig {
                assert_eq!(cell, below);
                depleted = true;
                break;
            }
        }
        assert!(depleted);
        assert_eq!(s.world.kind_at(below), Some(TileKind::Empty));
        assert_eq!(s.stats.tiles_dug, 1);
    }

    fn dig_down_until_cleared(s: &mut GameSession) -> Cell {
        let input = PlayerInput {
            facing: Some(Facing::Down),
            dig: true,
            ..idle()
        };
        for _ in 0..600 {
            if let DigResult::Depleted { cell, .. } = s.tick(&input, 1.0 / 60.0).dig {
                return cell;
            }
        }
        panic!("cell below spawn never cleared");
    }

    #[test]
    fn auto_advance_moves_player_into_cleared_cell() {
        let mut config = SessionConfig::default();
        config.dig.auto_advance_into_dug_cell = true;
        let mut s = GameSession::new(config, 7);
        let below = s.player.cell().offset(0, 1);

        let cleared = dig_down_until_cleared(&mut s);
        assert_eq!(cleared, below);
        assert_eq!(s.player.cell(), below);
        assert_eq!(s.player.position, below.center());
    }

    #[test]
    fn player_stays_put_without_auto_advance() {
        let mut s = session();
        assert!(!s.config.dig.auto_advance_into_dug_cell);
        let start = s.player.cell();

        let cleared = dig_down_until_cleared(&mut s);
        assert_eq!(cleared, start.offset(0, 1));
        assert_eq!(s.player.cell(), start);
    }

    #[test]
    fn deposit_needs_the_dome() {
        let mut s = session();
        s.cargo.add(ResourceKind::Iron, 3);
        s.player.position = Cell::new(1, s.world.height() - 2).center();
        assert!(s.deposit().is_empty());
        assert_eq!(s.cargo.total(), 3);

        s.player.position = s.world.spawn_cell().center();
        let moved = s.deposit();
        assert_eq!(moved.get(&ResourceKind::Iron), Some(&3));
        assert_eq!(s.ledger.balance(ResourceKind::Iron), 3);
        assert_eq!(s.stats.banked.get(&ResourceKind::Iron), Some(&3));
        assert!(s.cargo.is_empty());
    }

    #[test]
    fn purchase_applies_bonus() {
        let mut s = session();
        s.cargo.set_capacity(1_000);
        s.cargo.add(ResourceKind::Iron, 50);
        s.cargo.add(ResourceKind::Water, 50);
        s.deposit();
        let drill = s.player.drill_power;
        let capacity = s.cargo.capacity();

        assert_eq!(s.purchase(UpgradeKind::Drill), PurchaseOutcome::Purchased { level: 1 });
        assert!(s.player.drill_power > drill);
        assert_eq!(s.purchase(UpgradeKind::Cargo), PurchaseOutcome::Purchased { level: 1 });
        assert!(s.cargo.capacity() > capacity);
    }

    #[test]
    fn mining_timeout_spawns_a_wave() {
        let mut s = session();
        let mining = s.config.waves.mining_time;
        let report = s.tick(&idle(), mining + 0.1);
        assert!(matches!(
            report.transition,
            Some(Transition::DefenseStarted { wave: 0, .. })
        ));
        assert!(!s.enemies.is_empty());
        assert!(matches!(s.phase(), Phase::Defense { .. }));
    }

    #[test]
    fn turret_kills_enemies_in_range() {
        let mut s = session();
        s.tick(&idle(), s.config.waves.mining_time + 0.1);
        for enemy in s.enemies.iter_mut() {
            enemy.position = s.dome.center + Vec2::new(40.0, 0.0);
            enemy.hp = 1.0;
            enemy.speed = 0.0;
        }
        let count = s.enemies.len();
        let mut killed = 0;
        for _ in 0..count * 10 {
            killed += s.combat(0.5).killed;
        }
        assert_eq!(killed, count);
        assert!(s.enemies.is_empty());
    }

    #[test]
    fn defeat_freezes_the_session() {
        let mut s = session();
        s.dome.take_damage(10_000.0);
        assert_eq!(s.tick(&idle(), 0.1).transition, Some(Transition::Defeat));
        assert!(s.is_over());

        let world = s.world.clone();
        let position = s.player.position;
        s.cargo.add(ResourceKind::Iron, 2);
        let input = PlayerInput {
            move_axis: Vec2::new(1.0, 0.0),
            dig: true,
            interact: true,
            upgrade: Some(UpgradeKind::Drill),
            ..idle()
        };
        let report = s.tick(&input, 1.0);
        assert!(report.dig.is_none());
        assert!(report.deposited.is_empty());
        assert_eq!(
            report.purchase,
            Some((UpgradeKind::Drill, PurchaseOutcome::Unavailable))
        );
        assert_eq!(report.transition, None);
        assert_eq!(s.world, world);
        assert_eq!(s.player.position, position);
        assert_eq!(s.ledger.balance(ResourceKind::Iron), 0);
    }

    #[test]
    fn restart_regenerates() {
        let mut s = session();
        s.dome.take_damage(10_000.0);
        s.tick(&idle(), 0.1);
        s.restart();
        assert!(!s.is_over());
        assert_eq!(s.generation(), 1);
        assert_ne!(s.seed(), 7);
        assert_eq!(s.dome.hp, s.config.dome.max_hp);
    }
}
