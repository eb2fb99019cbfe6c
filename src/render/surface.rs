use std::io::Write;

use super::color::sample_stops;
use super::{BlendMode, CellFill, Primitive, RadialGradient};
use crate::error::{CoverageError, Result};
use crate::geometry::{Bounds, Point};

/// Largest raster [`PixelBuffer`] will allocate
pub const MAX_PIXELS: usize = 16_000_000;

/// Drawing target for composited primitives
pub trait Surface {
    fn fill_cell(&mut self, cell: &CellFill, mode: BlendMode);
    fn fill_radial(&mut self, gradient: &RadialGradient, mode: BlendMode);
}

/// Draw primitives in order
pub fn paint<S: Surface + ?Sized>(surface: &mut S, primitives: &[Primitive], mode: BlendMode) {
    for primitive in primitives {
        match primitive {
            Primitive::Cell(cell) => surface.fill_cell(cell, mode),
            Primitive::Radial(gradient) => surface.fill_radial(gradient, mode),
        }
    }
}

/// In-memory raster over a plan region
///
/// Pixels hold premultiplied unit RGBA and start fully transparent. Cell
/// feathering is not applied.
pub struct PixelBuffer {
    bounds: Bounds,
    pixel_size: f64,
    width: usize,
    height: usize,
    pixels: Vec<[f64; 4]>,
}

impl PixelBuffer {
    pub fn new(bounds: Bounds, pixel_size: f64) -> Result<Self> {
        bounds.validate()?;
        if !(pixel_size.is_finite() && pixel_size > 0.0) {
            return Err(CoverageError::InvalidInput(format!(
                "pixel size must be positive, got {}",
                pixel_size
            )));
        }
        let width = (bounds.width / pixel_size).ceil().max(1.0) as usize;
        let height = (bounds.height / pixel_size).ceil().max(1.0) as usize;
        let len = width
            .checked_mul(height)
            .filter(|&n| n <= MAX_PIXELS)
            .ok_or_else(|| {
                CoverageError::InvalidInput(format!(
                    "raster of {}x{} pixels exceeds the limit of {} pixels",
                    width, height, MAX_PIXELS
                ))
            })?;
        Ok(Self {
            bounds,
            pixel_size,
            width,
            height,
            pixels: vec![[0.0; 4]; len],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[f64; 4]> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    fn pixel_center(&self, x: usize, y: usize) -> Point {
        Point::new(
            self.bounds.origin_x + (x as f64 + 0.5) * self.pixel_size,
            self.bounds.origin_y + (y as f64 + 0.5) * self.pixel_size,
        )
    }

    /// Pixel index range whose centres fall in `[lo, hi)` along one axis
    fn span(&self, origin: f64, lo: f64, hi: f64, len: usize) -> (usize, usize) {
        let first = ((lo - origin) / self.pixel_size - 0.5).ceil().max(0.0);
        let last = ((hi - origin) / self.pixel_size - 0.5).ceil().max(0.0);
        (
            (first as usize).min(len),
            (last as usize).min(len),
        )
    }

    /// Binary PPM composited over a white background
    pub fn write_ppm<W: Write>(&self, out: &mut W) -> Result<()> {
        write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for px in &self.pixels {
            let background = 1.0 - px[3];
            for channel in &px[..3] {
                let v = (channel + background).clamp(0.0, 1.0);
                bytes.push((v * 255.0).round() as u8);
            }
        }
        out.write_all(&bytes)?;
        Ok(())
    }
}

impl Surface for PixelBuffer {
    fn fill_cell(&mut self, cell: &CellFill, mode: BlendMode) {
        let (x0, x1) = self.span(self.bounds.origin_x, cell.x, cell.x + cell.width, self.width);
        let (y0, y1) = self.span(self.bounds.origin_y, cell.y, cell.y + cell.height, self.height);
        let src = cell.color.to_unit();
        for y in y0..y1 {
            for x in x0..x1 {
                let idx = y * self.width + x;
                self.pixels[idx] = mode.blend(self.pixels[idx], src);
            }
        }
    }

    fn fill_radial(&mut self, gradient: &RadialGradient, mode: BlendMode) {
        if gradient.radius <= 0.0 {
            return;
        }
        let c = gradient.center;
        let r = gradient.radius;
        let (x0, x1) = self.span(self.bounds.origin_x, c.x - r, c.x + r, self.width);
        let (y0, y1) = self.span(self.bounds.origin_y, c.y - r, c.y + r, self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                let d = self.pixel_center(x, y).distance_to(&c);
                if d > r {
                    continue;
                }
                let src = sample_stops(&gradient.stops, d / r).to_unit();
                let idx = y * self.width + x;
                self.pixels[idx] = mode.blend(self.pixels[idx], src);
            }
        }
    }
}
