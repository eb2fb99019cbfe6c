use serde::{Deserialize, Serialize};

use crate::error::{CoverageError, Result};

/// A position on the floor plane, in plan units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Rectangular extent of the plane being sampled
///
/// Always derived from the real floor-plan dimensions by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub origin_x: f64,
    pub origin_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(origin_x: f64, origin_y: f64, width: f64, height: f64) -> Result<Self> {
        let bounds = Self {
            origin_x,
            origin_y,
            width,
            height,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Bounds anchored at the origin, e.g. the pixel size of a floor-plan image.
    pub fn from_size(width: f64, height: f64) -> Result<Self> {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.origin_x.is_finite() && self.origin_y.is_finite()) {
            return Err(CoverageError::InvalidInput(format!(
                "bounds origin must be finite, got ({}, {})",
                self.origin_x, self.origin_y
            )));
        }
        if !(self.width.is_finite() && self.width > 0.0)
            || !(self.height.is_finite() && self.height > 0.0)
        {
            return Err(CoverageError::InvalidInput(format!(
                "bounds must have positive extent, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    pub fn max_x(&self) -> f64 {
        self.origin_x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.origin_y + self.height
    }

    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.origin_x
            && point.x <= self.max_x()
            && point.y >= self.origin_y
            && point.y <= self.max_y()
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.origin_x <= other.max_x()
            && other.origin_x <= self.max_x()
            && self.origin_y <= other.max_y()
            && other.origin_y <= self.max_y()
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_bounds_rejects_degenerate() {
        assert!(Bounds::from_size(0.0, 100.0).is_err());
        assert!(Bounds::from_size(100.0, -1.0).is_err());
        assert!(Bounds::from_size(f64::NAN, 100.0).is_err());
        assert!(Bounds::new(f64::INFINITY, 0.0, 10.0, 10.0).is_err());
        assert!(Bounds::from_size(800.0, 600.0).is_ok());
    }

    #[test]
    fn test_bounds_contains() {
        let b = Bounds::new(10.0, 10.0, 20.0, 20.0).unwrap();
        assert!(b.contains(&Point::new(15.0, 29.0)));
        assert!(!b.contains(&Point::new(31.0, 15.0)));
    }
}
