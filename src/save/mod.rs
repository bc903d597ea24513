//! Player profile persistence.
//!
//! The profile is one flat JSON object: run counters, lifetime banked
//! totals and achievement flags. Missing keys load as their defaults, so
//! older files keep working as fields are added.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
#[cfg(not(target_arch = "wasm32"))]
use std::fs;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

use crate::defense::orchestrator::Phase;
use crate::session::GameSession;
use crate::shared::*;

#[cfg(target_arch = "wasm32")]
const STORAGE_KEY: &str = "deepdome.profile";

/// Wave count that unlocks `survived_wave_5`.
const VETERAN_WAVES: u32 = 5;

#[derive(Resource, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub runs: u32,
    pub victories: u32,
    pub defeats: u32,
    pub best_wave: u32,
    pub tiles_dug: u64,
    pub lifetime_iron: u64,
    pub lifetime_water: u64,
    pub lifetime_cobalt: u64,
    pub lifetime_gem: u64,
    pub lifetime_relic: u64,
    pub first_relic: bool,
    pub survived_wave_5: bool,
    pub full_cargo: bool,
}

impl Profile {
    fn lifetime_mut(&mut self, kind: ResourceKind) -> &mut u64 {
        match kind {
            ResourceKind::Iron => &mut self.lifetime_iron,
            ResourceKind::Water => &mut self.lifetime_water,
            ResourceKind::Cobalt => &mut self.lifetime_cobalt,
            ResourceKind::Gem => &mut self.lifetime_gem,
            ResourceKind::Relic => &mut self.lifetime_relic,
        }
    }

    /// Fold a finished session into the profile.
    pub fn record_run(&mut self, session: &GameSession) {
        let waves = session.orchestrator.wave();
        self.runs += 1;
        match session.phase() {
            Phase::Victory => self.victories += 1,
            Phase::Defeat => self.defeats += 1,
            Phase::Mining { .. } | Phase::Defense { .. } => {}
        }
        self.best_wave = self.best_wave.max(waves);
        self.tiles_dug += u64::from(session.stats.tiles_dug);
        for (&kind, &amount) in &session.stats.banked {
            *self.lifetime_mut(kind) += u64::from(amount);
        }

        self.first_relic |= self.lifetime_relic > 0;
        self.survived_wave_5 |= waves >= VETERAN_WAVES;
        self.full_cargo |= session.stats.cargo_filled;
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Profile>()
            .add_systems(Startup, load_profile)
            .add_systems(OnEnter(GameState::GameOver), record_finished_run);
    }
}

fn load_profile(mut profile: ResMut<Profile>) {
    match read_profile() {
        Ok(Some(loaded)) => {
            info!(
                "[Save] Profile loaded: {} runs, {} victories",
                loaded.runs, loaded.victories
            );
            *profile = loaded;
        }
        Ok(None) => info!("[Save] No profile yet, starting fresh"),
        Err(e) => warn!("[Save] Profile load FAILED: {}. Starting fresh.", e),
    }
}

fn record_finished_run(session: Option<Res<GameSession>>, mut profile: ResMut<Profile>) {
    let Some(session) = session else {
        return;
    };
    profile.record_run(&session);
    match write_profile(&profile) {
        Ok(()) => info!(
            "[Save] Run recorded: {} runs, best wave {}",
            profile.runs, profile.best_wave
        ),
        Err(e) => warn!("[Save] Profile write FAILED: {}", e),
    }
}

pub fn parse_profile(json: &str) -> Result<Profile, String> {
    serde_json::from_str(json).map_err(|e| format!("Deserialization failed: {}", e))
}

pub fn profile_to_json(profile: &Profile) -> Result<String, String> {
    serde_json::to_string_pretty(profile).map_err(|e| format!("Serialization failed: {}", e))
}

// ═══════════════════════════════════════════════════════════════════════
// STORAGE
// ═══════════════════════════════════════════════════════════════════════

#[cfg(not(target_arch = "wasm32"))]
fn saves_directory() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));
    exe_dir.join("saves")
}

#[cfg(not(target_arch = "wasm32"))]
fn profile_path() -> PathBuf {
    saves_directory().join("profile.json")
}

#[cfg(not(target_arch = "wasm32"))]
fn read_profile() -> Result<Option<Profile>, String> {
    let path = profile_path();
    if !path.exists() {
        return Ok(None);
    }
    let json = fs::read_to_string(&path)
        .map_err(|e| format!("Read failed for {}: {}", path.display(), e))?;
    parse_profile(&json).map(Some)
}

#[cfg(not(target_arch = "wasm32"))]
fn write_profile(profile: &Profile) -> Result<(), String> {
    let dir = saves_directory();
    fs::create_dir_all(&dir).map_err(|e| format!("Could not create saves directory: {}", e))?;
    let json = profile_to_json(profile)?;

    let path = profile_path();
    // Write to a temp file first, then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, &json)
        .map_err(|e| format!("Write failed for {}: {}", tmp_path.display(), e))?;
    fs::rename(&tmp_path, &path).map_err(|e| format!("Rename failed: {}", e))?;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Result<web_sys::Storage, String> {
    web_sys::window()
        .ok_or_else(|| "No browser window".to_string())?
        .local_storage()
        .map_err(|_| "localStorage access denied".to_string())?
        .ok_or_else(|| "localStorage unavailable".to_string())
}

#[cfg(target_arch = "wasm32")]
fn read_profile() -> Result<Option<Profile>, String> {
    let storage = local_storage()?;
    match storage
        .get_item(STORAGE_KEY)
        .map_err(|_| "localStorage read failed".to_string())?
    {
        Some(json) => parse_profile(&json).map(Some),
        None => Ok(None),
    }
}

#[cfg(target_arch = "wasm32")]
fn write_profile(profile: &Profile) -> Result<(), String> {
    let json = profile_to_json(profile)?;
    local_storage()?
        .set_item(STORAGE_KEY, &json)
        .map_err(|_| "localStorage write failed".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;

    #[test]
    fn missing_keys_default() {
        let profile = parse_profile(r#"{ "runs": 4, "first_relic": true }"#).expect("parses");
        assert_eq!(profile.runs, 4);
        assert!(profile.first_relic);
        assert_eq!(profile.best_wave, 0);
        assert!(!profile.full_cargo);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let profile = parse_profile(r#"{ "runs": 1, "retired_field": 9 }"#).expect("parses");
        assert_eq!(profile.runs, 1);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_profile("not json").is_err());
    }

    #[test]
    fn profile_is_a_flat_object() {
        let json = profile_to_json(&Profile::default()).expect("serializes");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        let object = value.as_object().expect("object");
        assert!(object.values().all(|v| v.is_number() || v.is_boolean()));
        assert!(object.contains_key("survived_wave_5"));
    }

    #[test]
    fn record_run_counts_defeat_and_banked() {
        let mut session = GameSession::new(SessionConfig::default(), 3);
        session.cargo.add(ResourceKind::Relic, 1);
        session.cargo.add(ResourceKind::Iron, 2);
        session.deposit();
        session.dome.take_damage(10_000.0);
        session.advance_phase(0.1);

        let mut profile = Profile::default();
        profile.record_run(&session);
        assert_eq!(profile.runs, 1);
        assert_eq!(profile.defeats, 1);
        assert_eq!(profile.victories, 0);
        assert_eq!(profile.lifetime_relic, 1);
        assert_eq!(profile.lifetime_iron, 2);
        assert!(profile.first_relic);
        assert!(!profile.survived_wave_5);
    }
}
