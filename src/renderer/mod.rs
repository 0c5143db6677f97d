//! Rendering module
//!
//! The simulation never talks to a window. A frame is a short list of draw
//! commands pushed into a [`DrawSink`]; the software [`Raster`] is the sink
//! behind pixel observations, and any display backend can implement the same
//! trait.

pub mod font;
pub mod raster;

pub use raster::{Raster, downsample};

use glam::Vec2;

use crate::consts::*;
use crate::ring_center;
use crate::sim::{BallColor, GameState, Rect};

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLUE: Rgb = Rgb(0, 0, 255);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const GREY: Rgb = Rgb(169, 169, 169);
}

impl BallColor {
    pub fn rgb(self) -> Rgb {
        match self {
            BallColor::Blue => Rgb::BLUE,
            BallColor::Red => Rgb::RED,
        }
    }
}

/// Output side of rendering: a window, a framebuffer, a recorder...
pub trait DrawSink {
    /// Clear the whole frame
    fn fill(&mut self, color: Rgb);

    /// Circle around `center`; `width == 0` fills it, otherwise an outline
    fn circle(&mut self, center: Vec2, radius: f32, color: Rgb, width: u32);

    /// Rectangle; `width == 0` fills it, otherwise an outline
    fn rect(&mut self, rect: Rect, color: Rgb, width: u32);

    /// Text with its top-left corner at `pos`
    fn text(&mut self, text: &str, pos: Vec2, scale: u32, color: Rgb);

    /// Show the finished frame
    fn present(&mut self) {}
}

/// Per-frame drawing switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawOptions {
    /// Outline each ball's hitbox
    pub hitboxes: bool,
    /// Draw the "GAME OVER" banner once the episode has ended
    pub game_over_banner: bool,
}

/// Scale of the score digits
pub const SCORE_SCALE: u32 = 3;
/// Scale of the game over banner
pub const BANNER_SCALE: u32 = 12;

/// Draw one complete frame of `state` into `sink` (without presenting it)
pub fn draw_frame(state: &GameState, options: &DrawOptions, sink: &mut dyn DrawSink) {
    sink.fill(Rgb::BLACK);

    sink.circle(ring_center(), ORBIT_RADIUS, Rgb::GREY, RING_WIDTH);

    for ball in state.balls() {
        sink.circle(ball.position(), BALL_RADIUS, ball.color.rgb(), 0);
        if options.hitboxes {
            sink.rect(ball.hitbox(), ball.color.rgb(), 1);
        }
    }

    for obstacle in state.obstacles.iter() {
        sink.rect(obstacle.rect(), Rgb::WHITE, 0);
    }

    let score_pos = Vec2::new(10.0, BOARD_HEIGHT as f32 - 25.0);
    sink.text(&state.score.to_string(), score_pos, SCORE_SCALE, Rgb::WHITE);

    if options.game_over_banner && state.is_terminated() {
        let banner = "GAME OVER";
        let width = font::text_width(banner, BANNER_SCALE) as f32;
        let pos = Vec2::new(
            (BOARD_WIDTH as f32 - width) / 2.0,
            BOARD_HEIGHT as f32 / 2.0,
        );
        sink.text(banner, pos, BANNER_SCALE, Rgb::RED);
    }
}
