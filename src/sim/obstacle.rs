//! Falling rectangular obstacles

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Axis-aligned rectangle in screen coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Point-in-rectangle test, edges inclusive
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left && p.x <= self.right() && p.y >= self.top && p.y <= self.bottom()
    }
}

/// A single obstacle: fixed size and column, falling one step per tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    left: f32,
    top: f32,
    width: f32,
    height: f32,
    /// Downward distance covered per tick
    speed: f32,
}

impl Obstacle {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
            speed: OBSTACLE_SPEED,
        }
    }

    /// Obstacle spanning `[left, right)` horizontally, spawned just above the board
    pub fn spawn(left: f32, right: f32) -> Self {
        Self::new(left, -OBSTACLE_HEIGHT, right - left, OBSTACLE_HEIGHT)
    }

    /// Advance one tick toward the ring. No bounds check; the manager retires it.
    pub fn move_down(&mut self) {
        self.top += self.speed;
    }

    pub fn x_span(&self) -> (f32, f32) {
        (self.left, self.left + self.width)
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.top
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.width, self.height)
    }

    /// True once the whole obstacle has left the bottom of the board
    pub fn out_of_frame(&self) -> bool {
        self.top > BOARD_HEIGHT as f32
    }
}
