//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed step only
//! - Seeded RNG only
//! - Stable iteration order (gates oldest first)
//! - No rendering or platform dependencies

pub mod ball;
pub mod obstacle;
pub mod obstacles;
pub mod state;
pub mod tick;

pub use ball::{Ball, BallColor};
pub use obstacle::{Obstacle, Rect};
pub use obstacles::{GateKind, GateLayout, ObstacleManager, ObstacleSet};
pub use state::{GamePhase, GameState};
pub use tick::{Action, TickOutcome, tick, tick_repeated};
