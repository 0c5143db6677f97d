//! Observation encodings
//!
//! Both encodings are pure projections of a [`GameState`]; producing one
//! never mutates the simulation.

use serde::{Deserialize, Serialize};

use crate::config::ObservationMode;
use crate::consts::*;
use crate::renderer::{DrawOptions, Raster, downsample, draw_frame};
use crate::sim::{GameState, Obstacle};

/// Fixed-shape RGB image, row-major (height x width x channel)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelFrame {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelFrame {
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Self {
        assert_eq!(data.len(), width * height * PIXEL_OBS_CHANNELS);
        Self {
            width,
            height,
            data,
        }
    }

    /// (height, width, channels)
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, PIXEL_OBS_CHANNELS)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// RGB value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> [u8; 3] {
        let i = (row * self.width + col) * PIXEL_OBS_CHANNELS;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }
}

/// One observation in the configured encoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Observation {
    /// `[blue_x, blue_y, red_x, red_y, top1, bottom1, left1, right1, top2, bottom2, left2, right2]`
    Coords([f32; COORD_OBS_LEN]),
    Pixels(PixelFrame),
}

impl Observation {
    /// Flatten to `f32` values (pixels keep their 0-255 range)
    pub fn to_f32_vec(&self) -> Vec<f32> {
        match self {
            Observation::Coords(c) => c.to_vec(),
            Observation::Pixels(p) => p.data().iter().map(|&v| v as f32).collect(),
        }
    }
}

/// Shape and bounds of an observation mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationSpace {
    pub shape: Vec<usize>,
    pub low: f32,
    pub high: f32,
}

impl ObservationSpace {
    pub fn for_mode(mode: ObservationMode) -> Self {
        match mode {
            ObservationMode::Pixel => Self {
                shape: vec![PIXEL_OBS_HEIGHT, PIXEL_OBS_WIDTH, PIXEL_OBS_CHANNELS],
                low: 0.0,
                high: 255.0,
            },
            ObservationMode::Coord => Self {
                shape: vec![COORD_OBS_LEN],
                // Gates spawn just above the board
                low: -OBSTACLE_HEIGHT,
                // ...and are retired once their top passes the bottom edge
                high: BOARD_HEIGHT as f32 + OBSTACLE_HEIGHT,
            },
        }
    }

    /// Total number of scalars in one observation
    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }
}

fn bounds(obstacle: Option<&Obstacle>) -> [f32; 4] {
    match obstacle {
        Some(o) => {
            let (left, right) = o.x_span();
            [o.top(), o.bottom(), left, right]
        }
        None => [0.0; 4],
    }
}

/// Ball coordinates followed by the bounds of the oldest gate's obstacles
pub fn coord_observation(state: &GameState) -> [f32; COORD_OBS_LEN] {
    let blue = state.blue.position();
    let red = state.red.position();

    let (first, second) = match state.obstacles.try_oldest() {
        Some(set) => (set.obstacles().first(), set.obstacles().get(1)),
        None => (None, None),
    };

    let mut coords = [0.0; COORD_OBS_LEN];
    coords[..4].copy_from_slice(&[blue.x, blue.y, red.x, red.y]);
    coords[4..8].copy_from_slice(&bounds(first));
    coords[8..].copy_from_slice(&bounds(second));
    coords
}

/// Rasterize the frame at board resolution and shrink it to the observation size
pub fn pixel_observation(state: &GameState) -> PixelFrame {
    let mut raster = Raster::new(BOARD_WIDTH, BOARD_HEIGHT);
    draw_frame(state, &DrawOptions::default(), &mut raster);
    downsample(&raster, PIXEL_OBS_WIDTH, PIXEL_OBS_HEIGHT)
}

pub fn observe(state: &GameState, mode: ObservationMode) -> Observation {
    match mode {
        ObservationMode::Coord => Observation::Coords(coord_observation(state)),
        ObservationMode::Pixel => Observation::Pixels(pixel_observation(state)),
    }
}
