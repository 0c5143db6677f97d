//! Software RGB framebuffer
//!
//! Rasterization uses pixel centers and integer-only downsampling so a frame
//! is byte-identical on every platform.

use glam::Vec2;

use super::font::{self, GLYPH_SPACING, GLYPH_WIDTH};
use super::{DrawSink, Rgb};
use crate::observation::PixelFrame;
use crate::sim::Rect;

/// Row-major RGB framebuffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    data: Vec<u8>,
    /// Frames presented so far
    frames: u64,
}

impl Raster {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width * height * 3) as usize],
            frames: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        let i = ((y * self.width + x) * 3) as usize;
        Rgb(self.data[i], self.data[i + 1], self.data[i + 2])
    }

    #[inline]
    fn put(&mut self, x: i64, y: i64, color: Rgb) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let i = ((y as u32 * self.width + x as u32) * 3) as usize;
        self.data[i] = color.0;
        self.data[i + 1] = color.1;
        self.data[i + 2] = color.2;
    }

    /// Fill pixels whose centers fall in [x0, x1) x [y0, y1)
    fn fill_span(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgb) {
        let xa = (x0 - 0.5).ceil().max(0.0) as i64;
        let ya = (y0 - 0.5).ceil().max(0.0) as i64;
        let xb = ((x1 - 0.5).ceil() as i64).min(self.width as i64);
        let yb = ((y1 - 0.5).ceil() as i64).min(self.height as i64);
        for y in ya..yb {
            for x in xa..xb {
                self.put(x, y, color);
            }
        }
    }
}

impl DrawSink for Raster {
    fn fill(&mut self, color: Rgb) {
        for px in self.data.chunks_exact_mut(3) {
            px[0] = color.0;
            px[1] = color.1;
            px[2] = color.2;
        }
    }

    fn circle(&mut self, center: Vec2, radius: f32, color: Rgb, width: u32) {
        let outer_sq = radius * radius;
        let inner = if width == 0 {
            -1.0
        } else {
            (radius - width as f32).max(0.0)
        };
        let inner_sq = if inner < 0.0 { -1.0 } else { inner * inner };

        let x0 = (center.x - radius).floor() as i64;
        let x1 = (center.x + radius).ceil() as i64;
        let y0 = (center.y - radius).floor() as i64;
        let y1 = (center.y + radius).ceil() as i64;
        for y in y0..=y1 {
            let dy = y as f32 + 0.5 - center.y;
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - center.x;
                let d_sq = dx * dx + dy * dy;
                if d_sq <= outer_sq && d_sq > inner_sq {
                    self.put(x, y, color);
                }
            }
        }
    }

    fn rect(&mut self, rect: Rect, color: Rgb, width: u32) {
        let (l, t, r, b) = (rect.left, rect.top, rect.right(), rect.bottom());
        if width == 0 {
            self.fill_span(l, t, r, b, color);
            return;
        }
        let w = width as f32;
        self.fill_span(l, t, r, t + w, color);
        self.fill_span(l, b - w, r, b, color);
        self.fill_span(l, t, l + w, b, color);
        self.fill_span(r - w, t, r, b, color);
    }

    fn text(&mut self, text: &str, pos: Vec2, scale: u32, color: Rgb) {
        let scale = scale.max(1) as i64;
        let origin_x = pos.x.round() as i64;
        let origin_y = pos.y.round() as i64;
        let advance = (GLYPH_WIDTH + GLYPH_SPACING) as i64 * scale;

        for (i, c) in text.chars().enumerate() {
            let Some(rows) = font::glyph(c) else {
                continue;
            };
            let gx = origin_x + i as i64 * advance;
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                        continue;
                    }
                    let px = gx + col as i64 * scale;
                    let py = origin_y + row as i64 * scale;
                    for sy in 0..scale {
                        for sx in 0..scale {
                            self.put(px + sx, py + sy, color);
                        }
                    }
                }
            }
        }
    }

    fn present(&mut self) {
        self.frames += 1;
    }
}

/// Area-average `raster` down to `out_width` x `out_height`.
///
/// Each output pixel is the integer mean of the source block it covers;
/// blocks are derived with integer division so results never depend on
/// floating-point rounding.
pub fn downsample(raster: &Raster, out_width: usize, out_height: usize) -> PixelFrame {
    let (w, h) = (raster.width as usize, raster.height as usize);
    let mut data = Vec::with_capacity(out_width * out_height * 3);

    for oy in 0..out_height {
        let y0 = oy * h / out_height;
        let y1 = ((oy + 1) * h / out_height).max(y0 + 1);
        for ox in 0..out_width {
            let x0 = ox * w / out_width;
            let x1 = ((ox + 1) * w / out_width).max(x0 + 1);

            let mut sum = [0u32; 3];
            for y in y0..y1 {
                let row = y * w;
                for x in x0..x1 {
                    let i = (row + x) * 3;
                    sum[0] += raster.data[i] as u32;
                    sum[1] += raster.data[i + 1] as u32;
                    sum[2] += raster.data[i + 2] as u32;
                }
            }
            let n = ((y1 - y0) * (x1 - x0)) as u32;
            data.extend(sum.iter().map(|s| ((s + n / 2) / n) as u8));
        }
    }

    PixelFrame::new(out_width, out_height, data)
}
