//! The dome: the structure the player defends.

use bevy::prelude::*;

use crate::config::DomeConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct Dome {
    pub center: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub shield: f32,
    pub max_shield: f32,
    pub turret_dps: f32,
    pub turret_range: f32,
    pub radius: f32,
}

impl Dome {
    pub fn new(config: &DomeConfig, center: Vec2) -> Self {
        Self {
            center,
            hp: config.max_hp,
            max_hp: config.max_hp,
            shield: config.max_shield,
            max_shield: config.max_shield,
            turret_dps: config.turret_dps,
            turret_range: config.turret_range,
            radius: config.radius,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.hp <= 0.0
    }

    /// Shield soaks damage first, the rest comes off hp. Returns the hp lost.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        if amount <= 0.0 {
            return 0.0;
        }
        let absorbed = amount.min(self.shield);
        self.shield -= absorbed;
        let through = amount - absorbed;
        let before = self.hp;
        self.hp = (self.hp - through).max(0.0);
        before - self.hp
    }

    /// Between-wave repair, capped at the maximums.
    pub fn regenerate(&mut self, hp: f32, shield: f32) {
        if self.is_destroyed() {
            return;
        }
        self.hp = (self.hp + hp.max(0.0)).min(self.max_hp);
        self.shield = (self.shield + shield.max(0.0)).min(self.max_shield);
    }
}
