//! Duet - two balls orbiting a ring, dodging falling gates
//!
//! Core modules:
//! - `sim`: Deterministic simulation (balls, obstacles, step engine)
//! - `env`: Step-based environment facade (reset/step/render)
//! - `observation`: Coordinate and pixel encodings of the game state
//! - `control`: Action sources (external agent, keyboard, rule-based controller)
//! - `renderer`: Draw-sink interface and software raster
//! - `config`: Environment configuration

pub mod config;
pub mod control;
pub mod env;
pub mod error;
pub mod highscores;
pub mod observation;
pub mod renderer;
pub mod sim;

pub use config::{ControlMode, EnvConfig, ObservationMode};
pub use control::{Action, ControlSource, Controller, KeyState};
pub use env::{DuetEnv, EpisodeSummary, StepResult};
pub use error::{DuetError, Result};
pub use highscores::HighScores;
pub use observation::{Observation, ObservationSpace, PixelFrame};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Board dimensions (screen coordinates, y grows downward)
    pub const BOARD_WIDTH: u32 = 540;
    pub const BOARD_HEIGHT: u32 = 960;

    /// Distance from either ball to the ring center
    pub const ORBIT_RADIUS: f32 = 100.0;
    /// Outline width of the grey ring
    pub const RING_WIDTH: u32 = 1;
    /// Distance from the ring center to the bottom of the board
    pub const DIST_TO_BOTTOM: f32 = ORBIT_RADIUS + 15.0;
    /// Angular step of the balls per tick (radians)
    pub const SPIN_STEP: f32 = 0.0224;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 10.0;

    /// Obstacle defaults
    pub const OBSTACLE_HEIGHT: f32 = 40.0;
    pub const OBSTACLE_SPEED: f32 = 5.0;
    /// Pieces narrower than this are dropped from a gate
    pub const MIN_OBSTACLE_WIDTH: f32 = 40.0;
    /// Width of the canonical centered block (fixed layout)
    pub const CENTER_BLOCK_WIDTH: f32 = 120.0;
    /// Opening of a split gate
    pub const SPLIT_GAP_WIDTH: f32 = 160.0;

    /// Ticks between two obstacle-set spawns
    pub const SPAWN_INTERVAL: u32 = 140;

    /// Observation shapes
    pub const PIXEL_OBS_WIDTH: usize = 84;
    pub const PIXEL_OBS_HEIGHT: usize = 84;
    pub const PIXEL_OBS_CHANNELS: usize = 3;
    pub const COORD_OBS_LEN: usize = 12;

    /// Number of discrete actions (idle, spin left, spin right)
    pub const ACTION_COUNT: usize = 3;
}

/// Center of the ring the balls orbit
#[inline]
pub fn ring_center() -> Vec2 {
    Vec2::new(
        (consts::BOARD_WIDTH / 2) as f32,
        consts::BOARD_HEIGHT as f32 - consts::DIST_TO_BOTTOM,
    )
}

/// Wrap an angle to [0, 2π)
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::TAU;
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Convert polar (r, theta) around `center` to screen coordinates
#[inline]
pub fn polar_to_screen(center: Vec2, r: f32, theta: f32) -> Vec2 {
    center + Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Angle of a screen point around `center`, wrapped to [0, 2π)
#[inline]
pub fn screen_to_angle(center: Vec2, pos: Vec2) -> f32 {
    let d = pos - center;
    wrap_angle(d.y.atan2(d.x))
}
