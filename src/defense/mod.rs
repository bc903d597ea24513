//! Defense domain plugin for Deepdome.
//!
//! Provides:
//! - Enemy stepping against the dome (melee, ranged, charge)
//! - Dome shield and hull damage, turret fire at the nearest enemy
//! - The mining/defense phase machine, including victory and defeat

pub mod dome;
pub mod enemies;
pub mod orchestrator;

use bevy::prelude::*;

use crate::session::{GameSession, TickSet};
use crate::shared::*;
use orchestrator::Transition;

pub struct DefensePlugin;

impl Plugin for DefensePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, run_combat.in_set(TickSet::Combat))
            .add_systems(Update, advance_phase.in_set(TickSet::Phase));
    }
}

fn run_combat(
    time: Res<Time>,
    mut session: ResMut<GameSession>,
    mut damaged: EventWriter<DomeDamagedEvent>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    let report = session.combat(time.delta_secs());
    if report.dome_damage > 0.0 {
        damaged.send(DomeDamagedEvent {
            amount: report.dome_damage,
            hp_left: session.dome.hp,
            shield_left: session.dome.shield,
        });
    }
    if report.killed > 0 {
        debug!("[Defense] {} enemies destroyed", report.killed);
        sfx.send(PlaySfxEvent {
            sfx_id: "enemy_down".to_string(),
        });
    }
}

fn advance_phase(
    time: Res<Time>,
    mut session: ResMut<GameSession>,
    mut phases: EventWriter<PhaseChangedEvent>,
) {
    let Some(transition) = session.advance_phase(time.delta_secs()) else {
        return;
    };
    let event = match transition {
        Transition::DefenseStarted { wave, .. } => {
            info!(
                "[Defense] Wave {} incoming: {} enemies",
                wave + 1,
                session.enemies.len()
            );
            PhaseChangedEvent::DefenseStarted {
                wave,
                enemies: session.enemies.len(),
            }
        }
        Transition::MiningStarted { wave } => {
            info!(
                "[Defense] Wave {} survived, dome at {:.0}/{:.0}",
                wave, session.dome.hp, session.dome.max_hp
            );
            PhaseChangedEvent::MiningStarted { wave }
        }
        Transition::Victory => {
            info!("[Defense] Victory after {} waves", session.orchestrator.wave());
            PhaseChangedEvent::Victory
        }
        Transition::Defeat => {
            info!("[Defense] The dome has fallen on wave {}", session.orchestrator.wave() + 1);
            PhaseChangedEvent::Defeat
        }
    };
    phases.send(event);
}
