use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::quiz::options::{Difficulty, Direction, QuantityMode, RoundOptions};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_set_id")]
    pub set_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: QuantityMode,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_base_fall_ms")]
    pub base_fall_ms: u64,
    #[serde(default = "default_lives_max")]
    pub lives_max: u32,
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
    #[serde(default = "default_sets_dir")]
    pub sets_dir: String,
    #[serde(default)]
    pub sets_url: Option<String>,
}

fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_set_id() -> String {
    "1nen".to_string()
}
fn default_quantity() -> QuantityMode {
    QuantityMode::Fixed(10)
}
fn default_base_fall_ms() -> u64 {
    3000
}
fn default_lives_max() -> u32 {
    3
}
fn default_settle_delay_ms() -> u64 {
    400
}
fn default_frame_ms() -> u64 {
    33
}
fn default_sets_dir() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("yomifall")
        .join("sets")
        .to_string_lossy()
        .to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            set_id: default_set_id(),
            quantity: default_quantity(),
            direction: Direction::default(),
            difficulty: Difficulty::default(),
            base_fall_ms: default_base_fall_ms(),
            lives_max: default_lives_max(),
            settle_delay_ms: default_settle_delay_ms(),
            frame_ms: default_frame_ms(),
            sets_dir: default_sets_dir(),
            sets_url: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("yomifall")
            .join("config.toml")
    }

    /// Clamp hand-edited values back into playable ranges.
    pub fn validate(&mut self) {
        self.base_fall_ms = self.base_fall_ms.clamp(500, 20_000);
        self.lives_max = self.lives_max.clamp(1, 9);
        self.settle_delay_ms = self.settle_delay_ms.min(5_000);
        self.frame_ms = self.frame_ms.clamp(8, 250);
        if let QuantityMode::Fixed(0) = self.quantity {
            self.quantity = default_quantity();
        }
        if self.set_id.trim().is_empty() {
            self.set_id = default_set_id();
        }
        if self.sets_url.as_deref().is_some_and(|u| u.trim().is_empty()) {
            self.sets_url = None;
        }
    }

    /// Snapshot of everything a round reads at start.
    pub fn round_options(&self) -> RoundOptions {
        RoundOptions {
            set_id: self.set_id.clone(),
            quantity: self.quantity,
            direction: self.direction,
            difficulty: self.difficulty,
            base_fall_ms: self.base_fall_ms,
            lives_max: self.lives_max,
            settle_delay_ms: self.settle_delay_ms,
        }
    }
}
