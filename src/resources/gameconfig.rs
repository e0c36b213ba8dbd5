//! Game configuration resource.
//!
//! Manages simulation settings loaded from an INI configuration file. Provides
//! defaults for safe startup and methods to load/save configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [simulation]
//! tick_rate = 60
//! time_scale = 1.0
//! ticks = 900
//!
//! [pursuit]
//! max_speed = 4.0
//! sight_range = 30.0
//! attack_range = 3.0
//! attack_cooldown = 3.0
//! attack_damage = 15.0
//! steer_rate = 1.0
//! max_lookahead = 2.0
//! target_tag = player
//!
//! [vitals]
//! oxygen_drain = 0.5
//! sanity_drain = 0.2
//! suffocation_damage = 5.0
//! death_linger = 1.0
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

use crate::components::pursuit::{DEFAULT_TARGET_TAG, PursuitParams};

/// Default safe values for startup
const DEFAULT_TICK_RATE: u32 = 60;
const DEFAULT_TIME_SCALE: f32 = 1.0;
const DEFAULT_TICKS: u32 = 900;
const DEFAULT_OXYGEN_DRAIN: f32 = 0.5;
const DEFAULT_SANITY_DRAIN: f32 = 0.2;
const DEFAULT_SUFFOCATION_DAMAGE: f32 = 5.0;
const DEFAULT_DEATH_LINGER: f32 = 1.0;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Game configuration resource.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Ticks per simulated second when the driver uses a fixed step.
    pub tick_rate: u32,
    /// Multiplier applied to every tick's elapsed time.
    pub time_scale: f32,
    /// Number of ticks the headless runner advances.
    pub ticks: u32,
    /// Defaults for every spawned pursuit agent.
    pub pursuit: PursuitParams,
    /// Tag agents search when they have no explicit target.
    pub target_tag: String,
    /// Oxygen lost per second by entities that breathe.
    pub oxygen_drain: f32,
    /// Sanity lost per second.
    pub sanity_drain: f32,
    /// Health lost per second with an empty oxygen meter.
    pub suffocation_damage: f32,
    /// Seconds a dead entity lingers before despawn.
    pub death_linger: f32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn get_f32(config: &Ini, section: &str, key: &str) -> Option<f32> {
    config
        .getfloat(section, key)
        .ok()
        .flatten()
        .map(|v| v as f32)
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            time_scale: DEFAULT_TIME_SCALE,
            ticks: DEFAULT_TICKS,
            pursuit: PursuitParams::default(),
            target_tag: DEFAULT_TARGET_TAG.to_string(),
            oxygen_drain: DEFAULT_OXYGEN_DRAIN,
            sanity_drain: DEFAULT_SANITY_DRAIN,
            suffocation_damage: DEFAULT_SUFFOCATION_DAMAGE,
            death_linger: DEFAULT_DEATH_LINGER,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Fixed tick duration derived from `tick_rate`.
    pub fn fixed_dt(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [simulation] section
        if let Some(rate) = config.getuint("simulation", "tick_rate").ok().flatten() {
            self.tick_rate = rate.max(1) as u32;
        }
        if let Some(scale) = get_f32(&config, "simulation", "time_scale") {
            self.time_scale = scale;
        }
        if let Some(ticks) = config.getuint("simulation", "ticks").ok().flatten() {
            self.ticks = ticks as u32;
        }

        // [pursuit] section
        let p = &mut self.pursuit;
        for (key, slot) in [
            ("max_speed", &mut p.max_speed),
            ("sight_range", &mut p.sight_range),
            ("attack_range", &mut p.attack_range),
            ("attack_cooldown", &mut p.attack_cooldown),
            ("attack_damage", &mut p.attack_damage),
            ("steer_rate", &mut p.steer_rate),
            ("max_lookahead", &mut p.max_lookahead),
        ] {
            if let Some(value) = get_f32(&config, "pursuit", key) {
                *slot = value;
            }
        }
        if let Some(tag) = config.get("pursuit", "target_tag") {
            self.target_tag = tag;
        }

        // [vitals] section
        for (key, slot) in [
            ("oxygen_drain", &mut self.oxygen_drain),
            ("sanity_drain", &mut self.sanity_drain),
            ("suffocation_damage", &mut self.suffocation_damage),
            ("death_linger", &mut self.death_linger),
        ] {
            if let Some(value) = get_f32(&config, "vitals", key) {
                *slot = value;
            }
        }

        info!(
            "Loaded config: tick_rate={}, time_scale={}, ticks={}, pursuit={:?}, target_tag={}",
            self.tick_rate, self.time_scale, self.ticks, self.pursuit, self.target_tag
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        // [simulation] section
        config.set("simulation", "tick_rate", Some(self.tick_rate.to_string()));
        config.set("simulation", "time_scale", Some(self.time_scale.to_string()));
        config.set("simulation", "ticks", Some(self.ticks.to_string()));

        // [pursuit] section
        let p = &self.pursuit;
        for (key, value) in [
            ("max_speed", p.max_speed),
            ("sight_range", p.sight_range),
            ("attack_range", p.attack_range),
            ("attack_cooldown", p.attack_cooldown),
            ("attack_damage", p.attack_damage),
            ("steer_rate", p.steer_rate),
            ("max_lookahead", p.max_lookahead),
        ] {
            config.set("pursuit", key, Some(value.to_string()));
        }
        config.set("pursuit", "target_tag", Some(self.target_tag.clone()));

        // [vitals] section
        for (key, value) in [
            ("oxygen_drain", self.oxygen_drain),
            ("sanity_drain", self.sanity_drain),
            ("suffocation_damage", self.suffocation_damage),
            ("death_linger", self.death_linger),
        ] {
            config.set("vitals", key, Some(value.to_string()));
        }

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("hollowdeep-{}-{}.ini", name, std::process::id()))
    }

    #[test]
    fn test_defaults() {
        let config = GameConfig::new();
        assert_eq!(config.tick_rate, 60);
        assert_eq!(config.target_tag, "player");
        assert_eq!(config.pursuit, PursuitParams::default());
        assert!((config.fixed_dt() - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_file_is_error() {
        let mut config = GameConfig::with_path(temp_path("missing"));
        assert!(config.load_from_file().is_err());
        assert_eq!(config.tick_rate, 60);
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let path = temp_path("partial");
        std::fs::write(
            &path,
            "[pursuit]\nattack_damage = 20.5\ntarget_tag = survivor\n\n[simulation]\ntick_rate = 30\n",
        )
        .unwrap();

        let mut config = GameConfig::with_path(&path);
        config.load_from_file().unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.tick_rate, 30);
        assert!((config.pursuit.attack_damage - 20.5).abs() < 1e-6);
        assert_eq!(config.target_tag, "survivor");
        assert!((config.pursuit.sight_range - 30.0).abs() < 1e-6);
        assert!((config.death_linger - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("save");
        let mut saved = GameConfig::with_path(&path);
        saved.pursuit.attack_cooldown = 1.5;
        saved.oxygen_drain = 2.0;
        saved.save_to_file().unwrap();

        let mut loaded = GameConfig::with_path(&path);
        loaded.load_from_file().unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, saved);
    }
}
