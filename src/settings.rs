//! Runtime settings
//!
//! Loaded from a JSON file next to the binary; any problem reading it falls
//! back to defaults so a bad settings file never stops the game.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seed for the simulation RNG (drops, bobbing phases)
    pub seed: u64,
    /// Directory holding `levels/level{N}.json` and `enemy_stats.json`
    pub data_dir: PathBuf,
    /// Viewport size in world pixels, used to clamp the camera
    pub viewport_width: f32,
    pub viewport_height: f32,

    // === Visual feedback ===
    /// Camera shake on hits
    pub screen_shake: bool,
    /// Particle effects
    pub particles: bool,
    /// Particle budget when particles are on
    pub particle_cap: usize,
    /// Floating damage numbers
    pub damage_numbers: bool,

    // === HUD ===
    /// Start with the debug overlay visible
    pub debug_overlay: bool,

    // === Accessibility ===
    /// Reduced motion (disables shake)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            data_dir: PathBuf::from("data"),
            viewport_width: 1280.0,
            viewport_height: 720.0,

            screen_shake: true,
            particles: true,
            particle_cap: 600,
            damage_numbers: true,

            debug_overlay: false,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles { 0 } else { self.particle_cap }
    }

    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load settings from `path`, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring malformed settings {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("No settings at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Path of the enemy stats table
    pub fn stats_path(&self) -> PathBuf {
        self.data_dir.join("enemy_stats.json")
    }

    /// Directory of level files
    pub fn levels_dir(&self) -> PathBuf {
        self.data_dir.join("levels")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "seed": 7, "reduced_motion": true }"#)
            .expect("valid json");
        assert_eq!(settings.seed, 7);
        assert!(settings.reduced_motion);
        assert!(!settings.effective_screen_shake());
        assert_eq!(settings.particle_cap, Settings::default().particle_cap);
    }

    #[test]
    fn test_particles_off_means_zero_cap() {
        let settings = Settings {
            particles: false,
            ..Settings::default()
        };
        assert_eq!(settings.max_particles(), 0);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let settings = Settings::load(Path::new("/definitely/not/here/settings.json"));
        assert_eq!(settings, Settings::default());
    }
}
