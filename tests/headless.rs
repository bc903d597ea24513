//! Headless integration tests for Deepdome.
//!
//! These tests exercise the game's ECS wiring without a window or GPU.
//! They use Bevy's `MinimalPlugins` with a fixed frame time, register the
//! session and domain plugins (skipping rendering, keyboard input and
//! profile writes), and drive them by setting `PlayerInput` directly.
//!
//! Run with: `cargo test --test headless`

use std::time::Duration;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use deepdome::config::SessionConfig;
use deepdome::defense::orchestrator::Phase;
use deepdome::defense::DefensePlugin;
use deepdome::economy::EconomyPlugin;
use deepdome::mining::MiningPlugin;
use deepdome::session::{GameSession, SessionPlugin};
use deepdome::shared::*;

const FRAME: Duration = Duration::from_millis(100);

// ─────────────────────────────────────────────────────────────────────────────
// Test App Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Every event of type `E` seen so far.
#[derive(Resource)]
struct Seen<E: Event + Clone>(Vec<E>);

fn collect<E: Event + Clone>(mut reader: EventReader<E>, mut seen: ResMut<Seen<E>>) {
    seen.0.extend(reader.read().cloned());
}

fn watch<E: Event + Clone>(app: &mut App) {
    app.insert_resource(Seen::<E>(Vec::new()));
    app.add_systems(Last, collect::<E>);
}

fn seen<E: Event + Clone>(app: &App) -> Vec<E> {
    app.world().resource::<Seen<E>>().0.clone()
}

/// Short phases so wave tests finish in a few dozen frames.
fn quick_config() -> SessionConfig {
    let mut config = SessionConfig::default();
    config.waves.mining_time = 1.0;
    config.waves.min_mining_time = 0.5;
    config.waves.defense_time = 2.0;
    config
}

/// Minimal app with the session and gameplay plugins, a fixed 100 ms frame,
/// and a pre-seeded session so no environment lookup happens.
fn build_test_app(config: SessionConfig) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(FRAME));

    app.init_state::<GameState>();
    app.insert_resource(GameSession::new(config, 42));

    app.add_plugins(SessionPlugin)
        .add_plugins(MiningPlugin)
        .add_plugins(EconomyPlugin)
        .add_plugins(DefensePlugin);

    watch::<TileDepletedEvent>(&mut app);
    watch::<DepositEvent>(&mut app);
    watch::<PhaseChangedEvent>(&mut app);
    watch::<UpgradePurchasedEvent>(&mut app);
    watch::<DomeDamagedEvent>(&mut app);
    app
}

/// Ticks until the startup transition has landed in Playing.
fn boot(app: &mut App) {
    app.update();
    app.update();
    assert_eq!(
        app.world().resource::<State<GameState>>().get(),
        &GameState::Playing,
        "Expected Playing after boot"
    );
}

fn set_input(app: &mut App, input: PlayerInput) {
    *app.world_mut().resource_mut::<PlayerInput>() = input;
}

fn session(app: &App) -> &GameSession {
    app.world().resource::<GameSession>()
}

fn session_mut(app: &mut App) -> Mut<'_, GameSession> {
    app.world_mut().resource_mut::<GameSession>()
}

fn state(app: &App) -> GameState {
    *app.world().resource::<State<GameState>>().get()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_headless_boot_keeps_the_seeded_session() {
    let mut app = build_test_app(SessionConfig::default());
    boot(&mut app);
    assert_eq!(session(&app).seed(), 42);
    assert!(matches!(session(&app).phase(), Phase::Mining { .. }));

    // Smoke: a second of idle frames changes nothing but the timer.
    for _ in 0..10 {
        app.update();
    }
    assert_eq!(state(&app), GameState::Playing);
    assert!(seen::<PhaseChangedEvent>(&app).is_empty());
}

#[test]
fn test_holding_dig_clears_the_cell_below() {
    let mut app = build_test_app(SessionConfig::default());
    boot(&mut app);
    let below = session(&app).player.cell().offset(0, 1);

    set_input(
        &mut app,
        PlayerInput {
            facing: Some(Facing::Down),
            dig: true,
            ..default()
        },
    );
    // Toughest tile is 10 hp at 2 hp/s: 50 frames at most.
    for _ in 0..60 {
        app.update();
        if !seen::<TileDepletedEvent>(&app).is_empty() {
            break;
        }
    }

    let depleted = seen::<TileDepletedEvent>(&app);
    assert_eq!(depleted.len(), 1, "Expected exactly one cleared cell");
    assert_eq!((depleted[0].x, depleted[0].y), (below.x, below.y));
    assert_eq!(session(&app).world.kind_at(below), Some(TileKind::Empty));
}

#[test]
fn test_interact_at_dome_banks_the_hold() {
    let mut app = build_test_app(SessionConfig::default());
    boot(&mut app);
    session_mut(&mut app).cargo.add(ResourceKind::Water, 2);

    set_input(
        &mut app,
        PlayerInput {
            interact: true,
            ..default()
        },
    );
    app.update();
    set_input(&mut app, PlayerInput::default());
    app.update();

    assert_eq!(session(&app).ledger.balance(ResourceKind::Water), 2);
    assert!(session(&app).cargo.is_empty());
    let deposits = seen::<DepositEvent>(&app);
    assert_eq!(deposits.len(), 1);
    assert_eq!(deposits[0].amounts, vec![(ResourceKind::Water, 2)]);
}

#[test]
fn test_upgrade_key_buys_one_level() {
    let mut app = build_test_app(SessionConfig::default());
    boot(&mut app);
    {
        let mut s = session_mut(&mut app);
        s.cargo.set_capacity(100);
        s.cargo.add(ResourceKind::Iron, 20);
        s.deposit();
    }
    let drill_before = session(&app).player.drill_power;

    set_input(
        &mut app,
        PlayerInput {
            upgrade: Some(UpgradeKind::Drill),
            ..default()
        },
    );
    app.update();
    set_input(&mut app, PlayerInput::default());
    app.update();

    let bought = seen::<UpgradePurchasedEvent>(&app);
    assert_eq!(bought.len(), 1);
    assert_eq!(bought[0].level, 1);
    assert!(session(&app).player.drill_power > drill_before);
    assert_eq!(session(&app).ledger.balance(ResourceKind::Iron), 16);
}

#[test]
fn test_mining_timer_starts_a_wave() {
    let mut app = build_test_app(quick_config());
    boot(&mut app);
    for _ in 0..15 {
        app.update();
    }

    let phases = seen::<PhaseChangedEvent>(&app);
    let Some(PhaseChangedEvent::DefenseStarted { wave, enemies }) = phases.first().copied() else {
        panic!("Expected DefenseStarted first, got {:?}", phases);
    };
    assert_eq!(wave, 0);
    assert!(enemies >= 1);
}

#[test]
fn test_cleared_wave_returns_to_mining() {
    let mut config = quick_config();
    config.dome.turret_range = 10_000.0;
    config.dome.turret_dps = 10_000.0;
    let mut app = build_test_app(config);
    boot(&mut app);
    for _ in 0..40 {
        app.update();
    }

    let phases = seen::<PhaseChangedEvent>(&app);
    assert!(
        phases.contains(&PhaseChangedEvent::MiningStarted { wave: 1 }),
        "Expected wave 1 mining after a cleared wave, got {:?}",
        phases
    );
    assert_eq!(state(&app), GameState::Playing);
}

#[test]
fn test_defeat_enters_game_over_and_freezes() {
    let mut app = build_test_app(SessionConfig::default());
    boot(&mut app);
    session_mut(&mut app).dome.take_damage(10_000.0);
    app.update();
    app.update();

    assert_eq!(state(&app), GameState::GameOver);
    assert!(seen::<PhaseChangedEvent>(&app).contains(&PhaseChangedEvent::Defeat));

    let world_before = session(&app).world.clone();
    set_input(
        &mut app,
        PlayerInput {
            facing: Some(Facing::Down),
            dig: true,
            move_axis: Vec2::new(1.0, 0.0),
            ..default()
        },
    );
    for _ in 0..30 {
        app.update();
    }
    assert_eq!(session(&app).world, world_before);
    assert_eq!(session(&app).phase(), Phase::Defeat);
}

#[test]
fn test_restart_after_defeat_regenerates() {
    let mut app = build_test_app(SessionConfig::default());
    boot(&mut app);
    session_mut(&mut app).dome.take_damage(10_000.0);
    app.update();
    app.update();
    assert_eq!(state(&app), GameState::GameOver);

    set_input(
        &mut app,
        PlayerInput {
            restart: true,
            ..default()
        },
    );
    app.update();
    set_input(&mut app, PlayerInput::default());
    app.update();

    assert_eq!(state(&app), GameState::Playing);
    let s = session(&app);
    assert_eq!(s.generation(), 1);
    assert!(!s.is_over());
    assert_eq!(s.dome.hp, s.config.dome.max_hp);
}
