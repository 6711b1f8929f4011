//! Game configuration. Defaults reproduce the classic 80x50 layout; any
//! field can be overridden from a JSON file.

use anyhow::Context;
use dungeon::{FovAlgorithm, GeneratorConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub screen_width: u16,
    pub screen_height: u16,
    pub bar_width: u16,
    pub panel_height: u16,
    pub message_width: usize,
    pub message_height: usize,
    pub map: GeneratorConfig,
    pub fov_algorithm: FovAlgorithm,
    pub fov_light_walls: bool,
    pub fov_radius: i32,
    pub save_directory: PathBuf,
    pub player: PlayerTemplate,
}

/// Starting stats and kit for a new character.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTemplate {
    pub hp: i32,
    pub defense: i32,
    pub power: i32,
    pub inventory_capacity: usize,
    pub level_up_base: u32,
    pub level_up_factor: u32,
    pub dagger_power_bonus: i32,
}

impl Default for PlayerTemplate {
    fn default() -> Self {
        Self {
            hp: 100,
            defense: 1,
            power: 2,
            inventory_capacity: 26,
            level_up_base: 200,
            level_up_factor: 150,
            dagger_power_bonus: 2,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        let screen_width = 80;
        let bar_width = 20;
        Self {
            screen_width,
            screen_height: 50,
            bar_width,
            panel_height: 7,
            message_width: (screen_width - bar_width - 2) as usize,
            message_height: 6,
            map: GeneratorConfig::default(),
            fov_algorithm: FovAlgorithm::Shadowcasting,
            fov_light_walls: true,
            fov_radius: 10,
            save_directory: PathBuf::from("saves"),
            player: PlayerTemplate::default(),
        }
    }
}

impl GameConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
