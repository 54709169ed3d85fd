//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (optional, user overrides)
//! 3. Environment variables (`FURNISH_SECTION__KEY`)

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{color::Color, gfx::scene::Room};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    /// Room dimensions and shell colors
    #[serde(default)]
    pub room: Room,
    #[serde(default)]
    pub assets: AssetConfig,
    #[serde(default)]
    pub rendering: RenderingConfig,
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from the `config` directory
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // FURNISH_ROOM__WIDTH=30 -> room.width = 30
        figment = figment.merge(Env::prefixed("FURNISH_").split("__"));

        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let room = &self.room;
        let valid = |size: f32| size.is_finite() && size > 0.0;
        if !(valid(room.width) && valid(room.height) && valid(room.depth)) {
            return Err(ConfigError::InvalidRoom {
                width: room.width,
                height: room.height,
                depth: room.depth,
            });
        }
        if self.assets.spawn_radius < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "assets.spawn_radius must not be negative (got {})",
                self.assets.spawn_radius
            )));
        }
        Ok(())
    }
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Furnish".to_string(),
            width: 1600,
            height: 1000,
            vsync: true,
        }
    }
}

/// Orbit camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Distance from the orbit target
    pub distance: f32,
    /// Pitch in radians, positive looks down on the room
    pub pitch: f32,
    /// Yaw in radians around the vertical axis
    pub yaw: f32,
    /// Field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Radians per pixel of mouse motion
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    /// Pan per pixel, scaled by the orbit distance
    pub pan_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 18.0,
            pitch: 0.6,
            yaw: 0.0,
            fov: 45.0,
            near: 0.1,
            far: 200.0,
            rotate_speed: 0.005,
            zoom_speed: 1.0,
            pan_speed: 0.01,
        }
    }
}

/// Model loading configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory holding `<kind>.obj` files
    pub model_dir: PathBuf,
    /// New items spawn at a random x/z within this distance of the center
    pub spawn_radius: f32,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("assets/models"),
            spawn_radius: 2.0,
        }
    }
}

/// Rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingConfig {
    pub background_color: Color,
    /// Direction the light travels toward the scene
    pub light_direction: [f32; 3],
    pub ambient_strength: f32,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            background_color: Color::rgb(0xF0, 0xF0, 0xF0),
            light_direction: [-0.4, -1.0, -0.3],
            ambient_strength: 0.35,
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Figment(#[from] figment::Error),
    #[error("room dimensions must be positive and finite (got {width} x {height} x {depth})")]
    InvalidRoom { width: f32, height: f32, depth: f32 },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.window.width, 1600);
        assert_eq!(config.room.width, 16.0);
        assert_eq!(config.assets.spawn_radius, 2.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml = toml::to_string(&config).unwrap();
        assert!(toml.contains("title"));
        assert!(toml.contains("floor_color = \"#F5F5F5\""));
        assert!(toml.contains("spawn_radius"));
    }

    #[test]
    fn test_partial_room_section_keeps_defaults() {
        let config: AppConfig = Figment::new()
            .merge(Toml::string("[room]\nwidth = 30.0\nwall_color = \"#102030\""))
            .extract()
            .unwrap();
        assert_eq!(config.room.width, 30.0);
        assert_eq!(config.room.depth, 16.0);
        assert_eq!(config.room.wall_color, Color::rgb(0x10, 0x20, 0x30));
    }

    #[test]
    fn test_rejects_flat_room() {
        let mut config = AppConfig::default();
        config.room.height = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRoom { .. })));
    }

    #[test]
    fn test_rejects_unbounded_room() {
        let mut config = AppConfig::default();
        config.room.width = f32::INFINITY;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRoom { .. })));
    }
}
