//! Game settings with persistence
//!
//! Settings are saved to `~/.config/tempora/settings.toml`

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempora_game::{HudSettings, SpawnerSettings};
use tempora_timeline::TimelineSettings;
use tracing::{info, warn};

/// All game settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub timeline: TimelineSettings,
    pub spawner: SpawnerSettings,
    pub hud: HudSettings,
}

impl GameSettings {
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tempora"))
    }

    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load settings from `path`. Never fails: problems are logged and the
    /// defaults are used instead.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let Some(path) = Self::settings_path() else {
            anyhow::bail!("Could not determine config directory");
        };
        self.save_to(&path)
    }

    /// Write settings to `path`, creating its directory if needed
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempora_core::Dimension;

    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("tempora-settings-{}-{name}", std::process::id()))
            .join("settings.toml")
    }

    #[test]
    fn missing_file_gives_defaults() {
        let settings = GameSettings::load_from(&scratch("missing"));
        assert_eq!(settings.spawner.max_spawned, 3);
        assert!(settings.timeline.enforce_gate);
    }

    #[test]
    fn save_then_load() {
        let path = scratch("roundtrip");
        let mut settings = GameSettings::default();
        settings.timeline.starting_dimension = Dimension::Past;
        settings.spawner.max_spawned = 5;
        settings.save_to(&path).unwrap();

        let loaded = GameSettings::load_from(&path);
        assert_eq!(loaded.timeline.starting_dimension, Dimension::Past);
        assert_eq!(loaded.spawner.max_spawned, 5);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let settings: GameSettings = toml::from_str("[spawner]\nrise_height = 2.5\n").unwrap();
        assert_eq!(settings.spawner.rise_height, 2.5);
        assert_eq!(settings.spawner.max_spawned, 3);
        assert_eq!(settings.hud.icon_rotation_speed, 10.0);
        assert_eq!(settings.timeline.starting_dimension, Dimension::Present);
    }

    #[test]
    fn malformed_file_gives_defaults() {
        let path = scratch("malformed");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "timeline = 7").unwrap();

        let settings = GameSettings::load_from(&path);
        assert_eq!(settings.spawner.sink_offset, 0.5);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
