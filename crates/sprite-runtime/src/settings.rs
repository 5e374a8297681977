// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Runtime settings, read from a TOML file.

use anyhow::{Context, Result};
use serde::Deserialize;
use sprite_cache::CacheConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Everything the runtime can be configured with.
///
/// Every section and field is optional; missing values keep their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Asset cache configuration.
    pub cache: CacheConfig,
    /// Logical screen size.
    pub window: WindowSettings,
    /// Player physics and drawing.
    pub player: PlayerSettings,
    /// Frame delays of the animations.
    pub animation: AnimationSettings,
    /// Where assets come from.
    pub assets: AssetSettings,
}

/// Logical screen size in pixels.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    /// Screen width.
    pub width: f32,
    /// Screen height.
    pub height: f32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

/// Player movement and drawing parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Horizontal movement per frame.
    pub speed: f32,
    /// Scale applied to frame textures when drawing.
    pub scale: f32,
    /// Downward acceleration per frame.
    pub gravity: f32,
    /// Vertical velocity applied on jump. Negative is up.
    pub jump_force: f32,
    /// Distance between the ground line and the bottom of the screen.
    pub ground_offset: f32,
    /// Horizontal start position.
    pub start_x: f32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            speed: 5.0,
            scale: 0.12,
            gravity: 0.5,
            jump_force: -12.0,
            ground_offset: 120.0,
            start_x: 10.0,
        }
    }
}

/// Frame delays in milliseconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    /// Idle loop.
    pub stand_delay_ms: u64,
    /// Walk loop.
    pub move_delay_ms: u64,
    /// Attack swing.
    pub hit_delay_ms: u64,
    /// Background GIF.
    pub background_delay_ms: u64,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            stand_delay_ms: 150,
            move_delay_ms: 50,
            hit_delay_ms: 80,
            background_delay_ms: 100,
        }
    }
}

/// Asset locations.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AssetSettings {
    /// Directory the texture loader reads from.
    pub dir: PathBuf,
    /// Every character frame is resized to a square of this size. 0 keeps the
    /// decoded size.
    pub frame_size: u32,
    /// Animated GIF drawn behind the player, relative to `dir`.
    pub background: Option<String>,
    /// Identifiers loaded at medium priority by the UI group.
    pub ui: Vec<String>,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("assets/images"),
            frame_size: 1024,
            background: Some("a.gif".to_string()),
            ui: Vec::new(),
        }
    }
}

impl Settings {
    /// Loads settings from `path`, or returns the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            log::info!("Settings: No settings file given, using defaults");
            return Ok(Self::default());
        };

        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file at '{}'", path.display()))?;
        let settings = Self::parse(&text)
            .with_context(|| format!("Failed to parse TOML from '{}'", path.display()))?;
        log::info!("Settings: Loaded '{}'", path.display());
        Ok(settings)
    }

    /// Parses settings from TOML text.
    pub fn parse(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text)?;
        settings.cache.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn empty_file_gives_defaults() {
        let settings = Settings::parse("").unwrap();
        assert_eq!(settings.player, PlayerSettings::default());
        assert_eq!(settings.cache, CacheConfig::default());
        assert_eq!(settings.assets.frame_size, 1024);
    }

    #[test]
    fn sections_override_fields() {
        let settings = Settings::parse(
            r#"
            [cache]
            memory_limit = 1048576
            debounce_ms = 500

            [player]
            speed = 8.0

            [assets]
            dir = "content"
            background = "sky.gif"
            ui = ["hud", "cursor"]
            "#,
        )
        .unwrap();

        assert_eq!(settings.cache.memory_limit, 1_048_576);
        assert_eq!(settings.cache.debounce(), Duration::from_millis(500));
        assert_eq!(settings.player.speed, 8.0);
        assert_eq!(settings.player.gravity, 0.5);
        assert_eq!(settings.assets.dir, PathBuf::from("content"));
        assert_eq!(settings.assets.ui, vec!["hud", "cursor"]);
    }

    #[test]
    fn invalid_cache_section_is_rejected() {
        assert!(Settings::parse("[cache]\ntarget_fraction = 2.0").is_err());
        assert!(Settings::parse("[player]\nspeed = \"fast\"").is_err());
    }

    #[test]
    fn missing_file_reports_its_path() {
        let err = Settings::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
