//! Fixed-step simulation tick
//!
//! Core game loop that advances an episode deterministically.

use serde::{Deserialize, Serialize};

use super::state::{GamePhase, GameState};
use crate::consts::SPAWN_INTERVAL;

/// Motion applied to both balls for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Action {
    #[default]
    Idle,
    SpinLeft,
    SpinRight,
}

impl Action {
    /// Discrete index used by agents (0 = idle, 1 = left, 2 = right)
    pub fn index(self) -> u8 {
        match self {
            Action::Idle => 0,
            Action::SpinLeft => 1,
            Action::SpinRight => 2,
        }
    }

    /// Controller view of the action: -1 left, 0 idle, 1 right
    pub fn direction(self) -> i8 {
        match self {
            Action::Idle => 0,
            Action::SpinLeft => -1,
            Action::SpinRight => 1,
        }
    }

    pub fn from_direction(direction: i8) -> Self {
        match direction.signum() {
            -1 => Action::SpinLeft,
            1 => Action::SpinRight,
            _ => Action::Idle,
        }
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    /// 1 on a retirement tick, 0 otherwise (and always 0 on a collision)
    pub reward: u32,
    /// The oldest gate scrolled off and was retired
    pub retired: bool,
    /// A ball hit a gate; the episode is over
    pub collided: bool,
}

/// Advance the episode by one tick
pub fn tick(state: &mut GameState, action: Action) -> TickOutcome {
    let mut outcome = TickOutcome::default();

    if state.phase == GamePhase::Terminated {
        return outcome;
    }

    state.time_ticks += 1;

    // Both balls always move together
    match action {
        Action::SpinLeft => {
            state.blue.spin_left();
            state.red.spin_left();
        }
        Action::SpinRight => {
            state.blue.spin_right();
            state.red.spin_right();
        }
        Action::Idle => {}
    }

    state.obstacles.move_all();

    if state.obstacles.oldest_out_of_frame() {
        state.obstacles.remove_obstacle_set();
        state.score += 1;
        outcome.reward = 1;
        outcome.retired = true;
    }

    if state.spawn_counter % SPAWN_INTERVAL == 0 {
        state.obstacles.new_obstacle_set();
    }

    // Only the oldest gate can be level with the ring
    if let Some(oldest) = state.obstacles.try_oldest() {
        let hit = oldest
            .iter()
            .any(|o| state.blue.collided_with(o) || state.red.collided_with(o));
        if hit {
            state.phase = GamePhase::Terminated;
            outcome.reward = 0;
            outcome.collided = true;
            log::debug!(
                "Collision at tick {} with gate {} (score {})",
                state.time_ticks,
                oldest.id,
                state.score
            );
        }
    }

    state.spawn_counter = (state.spawn_counter + 1) % SPAWN_INTERVAL;

    outcome
}

/// Repeat `tick` up to `repeats` times with the same action.
///
/// Returns the outcome of the last executed tick only: rewards from earlier
/// ticks in the window are not accumulated. A collision stops the loop at
/// once. `after_tick` sees the state after every tick except the last, which
/// is what frame-skip visualization draws.
pub fn tick_repeated<F>(
    state: &mut GameState,
    action: Action,
    repeats: u32,
    mut after_tick: F,
) -> TickOutcome
where
    F: FnMut(&GameState),
{
    let mut outcome = TickOutcome::default();
    for i in 0..repeats.max(1) {
        outcome = tick(state, action);
        if outcome.collided {
            break;
        }
        if i + 1 < repeats {
            after_tick(state);
        }
    }
    outcome
}
