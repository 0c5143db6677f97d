//! Environment configuration
//!
//! Set once before the first episode. Persisted as JSON so training runs and
//! the demo binary can share a config file.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DuetError, Result};

/// Observation encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ObservationMode {
    /// Downsampled RGB frame
    #[default]
    Pixel,
    /// Ball and nearest-gate coordinates
    Coord,
}

impl ObservationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObservationMode::Pixel => "pixel",
            ObservationMode::Coord => "coord",
        }
    }
}

impl FromStr for ObservationMode {
    type Err = DuetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pixel" | "pixels" => Ok(ObservationMode::Pixel),
            "coord" | "coords" => Ok(ObservationMode::Coord),
            _ => Err(DuetError::UnknownMode {
                kind: "observation mode",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ObservationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the per-tick action comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    /// Action passed to `step` by an agent or script
    #[default]
    #[serde(alias = "ai")]
    External,
    /// Arrow keys held by a human player
    #[serde(alias = "man")]
    Keyboard,
    /// Built-in rule-based controller
    #[serde(alias = "contr")]
    Controller,
}

impl ControlMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlMode::External => "external",
            ControlMode::Keyboard => "keyboard",
            ControlMode::Controller => "controller",
        }
    }
}

impl FromStr for ControlMode {
    type Err = DuetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "external" | "ai" => Ok(ControlMode::External),
            "keyboard" | "man" | "manual" => Ok(ControlMode::Keyboard),
            "controller" | "contr" => Ok(ControlMode::Controller),
            _ => Err(DuetError::UnknownMode {
                kind: "control mode",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Environment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Observation encoding
    pub observation: ObservationMode,
    /// Action source
    pub control: ControlMode,
    /// Ticks simulated per `step` call (>= 1)
    pub frame_skip: u32,
    /// Random gate layouts instead of the canonical centered block
    pub random_obstacles: bool,
    /// Produce an observation at all (training loops may skip it for speed)
    pub capture: bool,
    /// Master seed; every reset draws its episode seed from it
    pub seed: u64,
    /// Render intermediate frame-skip ticks to the attached display
    pub visualize: bool,
    /// Outline ball hitboxes when rendering
    pub draw_hitboxes: bool,
    /// Episodes played by the demo binary
    pub max_episodes: u32,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            observation: ObservationMode::Pixel,
            control: ControlMode::External,
            frame_skip: 1,
            random_obstacles: true,
            capture: true,
            seed: 0,
            visualize: false,
            draw_hitboxes: false,
            max_episodes: 10,
        }
    }
}

impl EnvConfig {
    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.frame_skip == 0 {
            return Err(DuetError::InvalidConfig(
                "frame_skip must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Adjust for unattended play: nobody supplies actions or holds keys, so
    /// the built-in controller drives, and observations are not captured.
    pub fn headless(mut self) -> Self {
        if self.control != ControlMode::Controller {
            log::warn!(
                "{} control needs an agent or a window, using the controller instead",
                self.control
            );
            self.control = ControlMode::Controller;
        }
        self.capture = false;
        self
    }

    /// Load a config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config: EnvConfig = serde_json::from_str(&json)?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load a config, falling back to defaults when the file does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save the config as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Config saved to {}", path.as_ref().display());
        Ok(())
    }
}
