//! Mining/defense phase machine.
//!
//! ```text
//! Mining(t) --timer--> Defense(t) --cleared or timer--> Mining(t') ...
//!     any --dome hp <= 0--> Defeat
//!     any --relic target banked, or max waves survived--> Victory
//! ```
//!
//! Victory and Defeat are absorbing. The orchestrator only decides; the
//! session spawns enemies, repairs the dome, and clears the field.

use crate::config::WaveConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Mining { remaining: f32 },
    Defense { remaining: f32 },
    Victory,
    Defeat,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Victory | Phase::Defeat)
    }
}

/// What the session needs to report each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldStatus {
    pub enemies_alive: usize,
    pub dome_hp: f32,
    pub relics_banked: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Spawn `batch` enemies for `wave`.
    DefenseStarted { wave: u32, batch: u32 },
    /// Wave `wave` is next; clear the field and repair the dome.
    MiningStarted { wave: u32 },
    Victory,
    Defeat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaveOrchestrator {
    phase: Phase,
    /// Waves survived so far, which is also the index of the next wave.
    wave: u32,
    config: WaveConfig,
}

impl WaveOrchestrator {
    pub fn new(config: WaveConfig) -> Self {
        Self {
            phase: Phase::Mining {
                remaining: mining_time(&config, 0),
            },
            wave: 0,
            config,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Enemies in the batch for `wave`. Always at least one.
    pub fn batch_size(&self, wave: u32) -> u32 {
        self.config
            .base_batch
            .saturating_add(self.config.batch_per_wave.saturating_mul(wave))
            .max(1)
    }

    /// Advance by `dt` seconds. Returns the transition taken, if any.
    pub fn advance(&mut self, dt: f32, status: FieldStatus) -> Option<Transition> {
        if self.is_over() {
            return None;
        }
        if status.dome_hp <= 0.0 {
            self.phase = Phase::Defeat;
            return Some(Transition::Defeat);
        }
        if self.config.relic_target > 0 && status.relics_banked >= u64::from(self.config.relic_target) {
            self.phase = Phase::Victory;
            return Some(Transition::Victory);
        }

        let dt = dt.max(0.0);
        match self.phase {
            Phase::Mining { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.phase = Phase::Mining { remaining };
                    return None;
                }
                self.phase = Phase::Defense {
                    remaining: self.config.defense_time,
                };
                Some(Transition::DefenseStarted {
                    wave: self.wave,
                    batch: self.batch_size(self.wave),
                })
            }
            Phase::Defense { remaining } => {
                let remaining = remaining - dt;
                if status.enemies_alive > 0 && remaining > 0.0 {
                    self.phase = Phase::Defense { remaining };
                    return None;
                }
                self.wave += 1;
                if self.wave >= self.config.max_waves {
                    self.phase = Phase::Victory;
                    return Some(Transition::Victory);
                }
                self.phase = Phase::Mining {
                    remaining: mining_time(&self.config, self.wave),
                };
                Some(Transition::MiningStarted { wave: self.wave })
            }
            Phase::Victory | Phase::Defeat => None,
        }
    }
}

/// Mining window before `wave`: shrinks each wave down to the floor.
pub fn mining_time(config: &WaveConfig, wave: u32) -> f32 {
    (config.mining_time - config.mining_time_shrink * wave as f32).max(config.min_mining_time)
}
