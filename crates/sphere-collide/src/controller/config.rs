//! Tunable platformer constants.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Movement constants for [`Platformer`](super::Platformer).
///
/// Velocities are in units per second. `gravity` and `jump_decay` are applied
/// once per update regardless of the time step, so their effect scales with
/// the update rate.
///
/// Missing TOML keys fall back to [`Default`]:
///
/// ```toml
/// jump_height = 600.0
/// horizontal_speed = 200.0
/// air_horizontal_speed = 300.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformerConfig {
    /// Whether the jump input is honoured at all.
    pub jump_enabled: bool,
    /// Jump energy granted on take-off.
    pub jump_height: f32,
    /// Jump energy lost per airborne update.
    pub jump_decay: f32,
    /// Vertical speed lost per airborne update.
    pub gravity: f32,
    /// Cap on downward speed.
    pub max_fall_speed: f32,
    /// Lateral speed on the ground.
    pub horizontal_speed: f32,
    /// Lateral speed in the air.
    pub air_horizontal_speed: f32,
    /// Radius of the collision sphere.
    pub collision_radius: f32,
    /// Spin rate of the visual roll angle, in degrees per second.
    pub angular_velocity: f32,
    /// Minimum upward normal component that counts as ground.
    pub ground_slope: f32,
    /// Downward displacement per update while grounded, keeping the sphere seated.
    pub ground_stick: f32,
    /// Largest displacement per update, as a fraction of `collision_radius`.
    pub max_step_fraction: f32,
    /// Resolution pass budget per selector.
    pub max_iterations: usize,
}

impl Default for PlatformerConfig {
    fn default() -> Self {
        Self {
            jump_enabled: true,
            jump_height: 800.0,
            jump_decay: 100.0,
            gravity: 100.0,
            max_fall_speed: 1000.0,
            horizontal_speed: 100.0,
            air_horizontal_speed: 400.0,
            collision_radius: 7.0,
            angular_velocity: -180.0,
            ground_slope: 0.45,
            ground_stick: -2.0,
            max_step_fraction: 0.9,
            max_iterations: crate::DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl PlatformerConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Loads a configuration from a `.toml` file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !is_toml(path) {
            return Err(ConfigError::UnsupportedFormat(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Serializes the configuration to TOML text.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Writes the configuration to a `.toml` file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if !is_toml(path) {
            return Err(ConfigError::UnsupportedFormat(path.display().to_string()));
        }

        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Largest displacement allowed in a single update.
    #[inline]
    pub fn max_step(&self) -> f32 {
        self.collision_radius * self.max_step_fraction
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "toml")
}
