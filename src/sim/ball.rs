//! Orbiting ball
//!
//! A ball is nothing more than an angle on the ring. Everything else
//! (screen position, hitbox) is derived from it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::obstacle::{Obstacle, Rect};
use crate::consts::*;
use crate::{polar_to_screen, ring_center, wrap_angle};

/// Which of the two balls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallColor {
    Blue,
    Red,
}

impl BallColor {
    /// Starting phase on the ring (blue on the left, red on the right)
    pub fn start_theta(self) -> f32 {
        match self {
            BallColor::Blue => std::f32::consts::PI,
            BallColor::Red => 0.0,
        }
    }
}

/// A ball orbiting the ring center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub color: BallColor,
    /// Current angle (radians, always in [0, 2π))
    theta: f32,
    /// Orbit radius, constant for the ball's lifetime
    radius: f32,
    /// Angle added or removed per spin
    step: f32,
}

impl Ball {
    pub fn new(color: BallColor) -> Self {
        Self::with_theta(color, color.start_theta())
    }

    /// Ball placed at an arbitrary phase
    pub fn with_theta(color: BallColor, theta: f32) -> Self {
        Self {
            color,
            theta: wrap_angle(theta),
            radius: ORBIT_RADIUS,
            step: SPIN_STEP,
        }
    }

    #[inline]
    pub fn theta(&self) -> f32 {
        self.theta
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn spin_left(&mut self) {
        self.theta = wrap_angle(self.theta - self.step);
    }

    pub fn spin_right(&mut self) {
        self.theta = wrap_angle(self.theta + self.step);
    }

    /// Screen position of the ball center
    pub fn position(&self) -> Vec2 {
        polar_to_screen(ring_center(), self.radius, self.theta)
    }

    /// Square drawn around the ball when hitbox debugging is on
    pub fn hitbox(&self) -> Rect {
        let pos = self.position();
        Rect::new(
            pos.x - BALL_RADIUS,
            pos.y - BALL_RADIUS,
            2.0 * BALL_RADIUS,
            2.0 * BALL_RADIUS,
        )
    }

    /// True if the ball center lies inside the obstacle (edges count as a hit)
    pub fn collided_with(&self, obstacle: &Obstacle) -> bool {
        obstacle.rect().contains(self.position())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::{PI, TAU};

    #[test]
    fn test_start_positions() {
        let blue = Ball::new(BallColor::Blue);
        let red = Ball::new(BallColor::Red);
        assert!((blue.position() - Vec2::new(170.0, 845.0)).length() < 1e-3);
        assert!((red.position() - Vec2::new(370.0, 845.0)).length() < 1e-3);
    }

    #[test]
    fn test_spin_wraps() {
        let mut red = Ball::new(BallColor::Red);
        red.spin_left();
        assert!((red.theta() - (TAU - SPIN_STEP)).abs() < 1e-5);
        red.spin_right();
        assert!(red.theta() < 1e-5 || red.theta() > TAU - 1e-5);
    }

    #[test]
    fn test_collision_edges_inclusive() {
        let red = Ball::new(BallColor::Red);
        let pos = red.position();
        // Obstacle whose left edge sits exactly on the ball center
        let touching = Obstacle::new(pos.x, pos.y - 20.0, 50.0, 40.0);
        assert!(red.collided_with(&touching));

        let beside = Obstacle::new(pos.x + 0.5, pos.y - 20.0, 50.0, 40.0);
        assert!(!red.collided_with(&beside));

        let above = Obstacle::new(pos.x - 25.0, pos.y - 41.0, 50.0, 40.0);
        assert!(!red.collided_with(&above));
    }

    #[test]
    fn test_hitbox_centered() {
        let blue = Ball::new(BallColor::Blue);
        let hb = blue.hitbox();
        assert!((hb.center() - blue.position()).length() < 1e-4);
        assert_eq!(hb.width, 2.0 * BALL_RADIUS);
    }

    proptest! {
        /// A full revolution of identical spins returns to the start position
        #[test]
        fn test_full_revolution(theta in 0.0f32..TAU, left in any::<bool>()) {
            let mut ball = Ball::with_theta(BallColor::Blue, theta);
            let start = ball.position();
            let steps = (TAU / SPIN_STEP).round() as usize;
            for _ in 0..steps {
                if left { ball.spin_left() } else { ball.spin_right() }
            }
            // 2π is not an exact multiple of the step; allow the remainder
            let remainder = (steps as f32 * SPIN_STEP - TAU).abs();
            let tolerance = ORBIT_RADIUS * remainder + 0.05;
            prop_assert!((ball.position() - start).length() <= tolerance);
        }

        /// Balls spun together stay exactly opposite each other
        #[test]
        fn test_phase_lock(moves in prop::collection::vec(0u8..3, 0..400)) {
            let mut blue = Ball::new(BallColor::Blue);
            let mut red = Ball::new(BallColor::Red);
            for m in moves {
                match m {
                    1 => { blue.spin_left(); red.spin_left(); }
                    2 => { blue.spin_right(); red.spin_right(); }
                    _ => {}
                }
                let diff = wrap_angle(blue.theta() - red.theta());
                prop_assert!((diff - PI).abs() < 1e-3, "phase diff {}", diff);
                let mid = (blue.position() + red.position()) / 2.0;
                prop_assert!((mid - ring_center()).length() < 0.05);
            }
        }
    }
}
