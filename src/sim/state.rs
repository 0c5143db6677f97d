//! Game state and core simulation types
//!
//! Everything one episode needs lives here; nothing is process-global.

use serde::{Deserialize, Serialize};

use super::ball::{Ball, BallColor};
use super::obstacles::{GateLayout, ObstacleManager};

/// Current phase of an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Balls are spinning, gates are falling
    Running,
    /// A ball hit a gate. Only a reset leaves this phase.
    Terminated,
}

/// Complete state of one episode
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the obstacle RNG was created from
    pub seed: u64,
    /// Gates cleared so far (never decreases)
    pub score: u32,
    /// Spawn cadence counter; starts at 1 and wraps at the spawn interval
    pub spawn_counter: u32,
    /// Sub-steps simulated since reset
    pub time_ticks: u64,
    pub phase: GamePhase,
    pub blue: Ball,
    pub red: Ball,
    pub obstacles: ObstacleManager,
}

impl GameState {
    /// Create a fresh episode: balls at their start phases, one gate spawned
    pub fn new(seed: u64, layout: GateLayout) -> Self {
        let mut state = Self {
            seed,
            score: 0,
            spawn_counter: 1,
            time_ticks: 0,
            phase: GamePhase::Running,
            blue: Ball::new(BallColor::Blue),
            red: Ball::new(BallColor::Red),
            obstacles: ObstacleManager::new(layout, seed),
        };

        state.obstacles.new_obstacle_set();

        state
    }

    pub fn is_terminated(&self) -> bool {
        self.phase == GamePhase::Terminated
    }

    /// Both balls in draw order (blue first)
    pub fn balls(&self) -> [&Ball; 2] {
        [&self.blue, &self.red]
    }
}
