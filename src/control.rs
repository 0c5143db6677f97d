//! Action sources
//!
//! Whoever drives the balls (an agent, a human on the arrow keys, the
//! built-in controller) ends up producing the same [`Action`], so the engine
//! never needs to know where it came from.

use glam::Vec2;

use crate::config::ControlMode;
use crate::consts::*;
use crate::error::{DuetError, Result};
use crate::sim::{GameState, ObstacleSet};
use crate::{polar_to_screen, ring_center, screen_to_angle};

pub use crate::sim::Action;

impl TryFrom<i64> for Action {
    type Error = DuetError;

    fn try_from(index: i64) -> Result<Self> {
        match index {
            0 => Ok(Action::Idle),
            1 => Ok(Action::SpinLeft),
            2 => Ok(Action::SpinRight),
            other => Err(DuetError::InvalidAction(other)),
        }
    }
}

/// Arrow keys currently held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyState {
    pub left: bool,
    pub right: bool,
}

impl KeyState {
    /// Left wins when both keys are down
    pub fn action(&self) -> Action {
        if self.left {
            Action::SpinLeft
        } else if self.right {
            Action::SpinRight
        } else {
            Action::Idle
        }
    }
}

/// Clearance kept between a ball center and an obstacle edge
const SAFETY_MARGIN: f32 = 4.0;

/// Rule-based controller: hold still while both balls are clear of the next
/// gate, otherwise spin toward the nearest phase that is.
#[derive(Debug, Clone, Default)]
pub struct Controller;

impl Controller {
    pub fn new() -> Self {
        Self
    }

    /// Pick an action for the current frame
    pub fn decide<'a, I>(&self, sets: I, red_pos: Vec2, blue_pos: Vec2) -> Action
    where
        I: IntoIterator<Item = &'a ObstacleSet>,
    {
        let center = ring_center();
        let lowest_ball_y = center.y + ORBIT_RADIUS;

        // The first gate that has not yet passed below the ring
        let Some(gate) = sets.into_iter().find(|s| {
            s.iter().any(|o| o.top() <= lowest_ball_y + SAFETY_MARGIN)
        }) else {
            return Action::Idle;
        };

        let blue_theta = screen_to_angle(center, blue_pos);
        debug_assert!(
            (screen_to_angle(center, red_pos) - blue_theta).abs() > 1.0,
            "balls should be on opposite sides of the ring"
        );

        // Half a turn in either direction covers every phase
        let max_steps = (std::f32::consts::PI / SPIN_STEP).ceil() as i32;
        for k in 0..=max_steps {
            let left = blue_theta - k as f32 * SPIN_STEP;
            if Self::phase_is_safe(gate, left) {
                return if k == 0 { Action::Idle } else { Action::SpinLeft };
            }
            let right = blue_theta + k as f32 * SPIN_STEP;
            if Self::phase_is_safe(gate, right) {
                return Action::SpinRight;
            }
        }

        Action::Idle
    }

    /// Both balls clear of every obstacle in `gate` that has not yet passed them
    fn phase_is_safe(gate: &ObstacleSet, blue_theta: f32) -> bool {
        let center = ring_center();
        [blue_theta, blue_theta + std::f32::consts::PI]
            .into_iter()
            .map(|theta| polar_to_screen(center, ORBIT_RADIUS, theta))
            .all(|ball| {
                gate.iter().all(|o| {
                    let (left, right) = o.x_span();
                    let passed = o.top() > ball.y + SAFETY_MARGIN;
                    let in_column =
                        ball.x >= left - SAFETY_MARGIN && ball.x <= right + SAFETY_MARGIN;
                    passed || !in_column
                })
            })
    }
}

/// Closed set of action sources, chosen once from the config
#[derive(Debug, Clone)]
pub enum ControlSource {
    /// Action supplied with every `step` call
    External,
    /// Arrow keys, updated by the host loop
    Keyboard(KeyState),
    RuleBased(Controller),
}

impl ControlSource {
    pub fn from_mode(mode: ControlMode) -> Self {
        match mode {
            ControlMode::External => ControlSource::External,
            ControlMode::Keyboard => ControlSource::Keyboard(KeyState::default()),
            ControlMode::Controller => ControlSource::RuleBased(Controller::new()),
        }
    }

    pub fn mode(&self) -> ControlMode {
        match self {
            ControlSource::External => ControlMode::External,
            ControlSource::Keyboard(_) => ControlMode::Keyboard,
            ControlSource::RuleBased(_) => ControlMode::Controller,
        }
    }

    /// Resolve the action for this step. `requested` is only used for
    /// external control; `None` there means idle.
    pub fn resolve(&self, requested: Option<Action>, state: &GameState) -> Action {
        match self {
            ControlSource::External => requested.unwrap_or_default(),
            ControlSource::Keyboard(keys) => keys.action(),
            ControlSource::RuleBased(controller) => controller.decide(
                state.obstacles.obstacle_sets(),
                state.red.position(),
                state.blue.position(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Ball, BallColor, GateKind, GateLayout, Obstacle, tick};
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_action_try_from() {
        assert_eq!(Action::try_from(0).unwrap(), Action::Idle);
        assert_eq!(Action::try_from(2).unwrap(), Action::SpinRight);
        assert!(matches!(Action::try_from(3), Err(DuetError::InvalidAction(3))));
        assert!(Action::try_from(-1).is_err());
    }

    #[test]
    fn test_keyboard_left_wins() {
        let both = KeyState {
            left: true,
            right: true,
        };
        assert_eq!(both.action(), Action::SpinLeft);
        assert_eq!(KeyState::default().action(), Action::Idle);
    }

    #[test]
    fn test_controller_idles_when_clear() {
        let state = GameState::new(0, GateLayout::Fixed);
        let source = ControlSource::from_mode(ControlMode::Controller);
        assert_eq!(source.resolve(None, &state), Action::Idle);
    }

    #[test]
    fn test_controller_dodges_left_wall() {
        let mut state = GameState::new(0, GateLayout::Fixed);
        state.obstacles.clear();
        state.obstacles.push_set(ObstacleSet::new(
            5,
            GateKind::LeftWall,
            vec![Obstacle::new(0.0, 300.0, 230.0, OBSTACLE_HEIGHT)],
        ));
        let controller = Controller::new();
        let action = controller.decide(
            state.obstacles.obstacle_sets(),
            state.red.position(),
            state.blue.position(),
        );
        // Blue sits at x = 170, inside the wall's column
        assert_ne!(action, Action::Idle);
    }

    #[test]
    fn test_controller_leaves_vertical_stack_under_center_block() {
        let mut state = GameState::new(0, GateLayout::Fixed);
        state.blue = Ball::with_theta(BallColor::Blue, 3.0 * FRAC_PI_2);
        state.red = Ball::with_theta(BallColor::Red, FRAC_PI_2);
        let source = ControlSource::RuleBased(Controller::new());
        assert_ne!(source.resolve(None, &state), Action::Idle);
    }

    #[test]
    fn test_controller_ignores_passed_gate() {
        let mut state = GameState::new(0, GateLayout::Fixed);
        state.obstacles.clear();
        state.obstacles.push_set(ObstacleSet::new(
            5,
            GateKind::CenterBlock,
            vec![Obstacle::new(0.0, 955.0, 540.0, OBSTACLE_HEIGHT)],
        ));
        let source = ControlSource::RuleBased(Controller::new());
        assert_eq!(source.resolve(None, &state), Action::Idle);
    }

    #[test]
    fn test_controller_clears_random_gates() {
        for seed in [1u64, 2, 3] {
            let mut state = GameState::new(seed, GateLayout::Random);
            let source = ControlSource::from_mode(ControlMode::Controller);
            for _ in 0..1500 {
                let action = source.resolve(None, &state);
                if tick(&mut state, action).collided {
                    break;
                }
            }
            assert!(state.score >= 3, "seed {} only scored {}", seed, state.score);
        }
    }

    #[test]
    fn test_external_none_is_idle() {
        let state = GameState::new(0, GateLayout::Fixed);
        let source = ControlSource::External;
        assert_eq!(source.resolve(None, &state), Action::Idle);
        assert_eq!(
            source.resolve(Some(Action::SpinRight), &state),
            Action::SpinRight
        );
        assert_eq!(source.mode(), ControlMode::External);
    }
}
