use serde::{Deserialize, Serialize};

use crate::config::ValidationRules;
use crate::constants::GEOMETRY_EPSILON;
use crate::error::{CoverageError, Result};
use crate::geometry::{Bounds, Point};

/// Geometry of a coverage area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CoverageShape {
    Circle {
        center: Point,
        radius: f64,
    },
    Rectangle {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Polygon {
        points: Vec<Point>,
    },
}

impl CoverageShape {
    /// Canonical form of authored geometry
    ///
    /// Rectangles drawn right-to-left or bottom-to-top get positive extents.
    /// Polygons lose consecutive duplicate vertices and a repeated closing
    /// vertex. Nothing else changes.
    pub fn normalized(&self) -> Self {
        match self {
            Self::Circle { .. } => self.clone(),
            Self::Rectangle {
                x,
                y,
                width,
                height,
            } => Self::Rectangle {
                x: x.min(x + width),
                y: y.min(y + height),
                width: width.abs(),
                height: height.abs(),
            },
            Self::Polygon { points } => Self::Polygon {
                points: dedup_vertices(points),
            },
        }
    }

    /// Check the shape is usable
    ///
    /// Circles need a positive radius, rectangles a non-zero extent, and
    /// polygons at least three distinct vertices, non-zero area and no
    /// self-intersection. With `rules`, the area must also stay within
    /// `max_area_size`.
    pub fn validate(&self, rules: Option<&ValidationRules>) -> Result<()> {
        match self {
            Self::Circle { center, radius } => {
                if !center.is_finite() {
                    return Err(degenerate("circle centre is not finite"));
                }
                if !radius.is_finite() || *radius <= 0.0 {
                    return Err(degenerate(format!("circle radius must be positive, got {}", radius)));
                }
            }
            Self::Rectangle {
                x,
                y,
                width,
                height,
            } => {
                if ![x, y, width, height].iter().all(|v| v.is_finite()) {
                    return Err(degenerate("rectangle has non-finite values"));
                }
                if width.abs() <= GEOMETRY_EPSILON || height.abs() <= GEOMETRY_EPSILON {
                    return Err(degenerate(format!("rectangle {}x{} has no area", width, height)));
                }
            }
            Self::Polygon { points } => {
                if !points.iter().all(Point::is_finite) {
                    return Err(degenerate("polygon has non-finite vertices"));
                }
                let vertices = dedup_vertices(points);
                if vertices.len() < 3 {
                    return Err(degenerate(format!(
                        "polygon needs at least 3 distinct vertices, got {}",
                        vertices.len()
                    )));
                }
                if polygon_area(&vertices) <= GEOMETRY_EPSILON {
                    return Err(degenerate("polygon has no area"));
                }
                if is_self_intersecting(&vertices) {
                    return Err(degenerate("polygon edges intersect"));
                }
            }
        }

        if let Some(rules) = rules {
            let area = self.area();
            if area > rules.max_area_size {
                return Err(degenerate(format!(
                    "area {:.1} exceeds the maximum of {:.1}",
                    area, rules.max_area_size
                )));
            }
        }
        Ok(())
    }

    pub fn area(&self) -> f64 {
        match self {
            Self::Circle { radius, .. } => std::f64::consts::PI * radius * radius,
            Self::Rectangle { width, height, .. } => (width * height).abs(),
            Self::Polygon { points } => polygon_area(points),
        }
    }

    pub fn contains(&self, point: &Point) -> bool {
        match self.normalized() {
            Self::Circle { center, radius } => center.distance_to(point) <= radius,
            Self::Rectangle {
                x,
                y,
                width,
                height,
            } => point.x >= x && point.x <= x + width && point.y >= y && point.y <= y + height,
            Self::Polygon { points } => polygon_contains(&points, point),
        }
    }

    /// Axis-aligned box enclosing the shape
    pub fn bounding_box(&self) -> Bounds {
        match self.normalized() {
            Self::Circle { center, radius } => Bounds {
                origin_x: center.x - radius,
                origin_y: center.y - radius,
                width: 2.0 * radius,
                height: 2.0 * radius,
            },
            Self::Rectangle {
                x,
                y,
                width,
                height,
            } => Bounds {
                origin_x: x,
                origin_y: y,
                width,
                height,
            },
            Self::Polygon { points } => {
                let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
                let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
                for p in &points {
                    min_x = min_x.min(p.x);
                    min_y = min_y.min(p.y);
                    max_x = max_x.max(p.x);
                    max_y = max_y.max(p.y);
                }
                if points.is_empty() {
                    (min_x, min_y, max_x, max_y) = (0.0, 0.0, 0.0, 0.0);
                }
                Bounds {
                    origin_x: min_x,
                    origin_y: min_y,
                    width: max_x - min_x,
                    height: max_y - min_y,
                }
            }
        }
    }
}

fn degenerate(msg: impl Into<String>) -> CoverageError {
    CoverageError::DegenerateShape(msg.into())
}

fn same_point(a: &Point, b: &Point) -> bool {
    (a.x - b.x).abs() <= GEOMETRY_EPSILON && (a.y - b.y).abs() <= GEOMETRY_EPSILON
}

fn dedup_vertices(points: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().is_none_or(|last| !same_point(last, p)) {
            out.push(*p);
        }
    }
    while out.len() > 1 && same_point(&out[0], &out[out.len() - 1]) {
        out.pop();
    }
    out
}

/// Shoelace formula, unsigned
fn polygon_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f64 = (0..n)
        .map(|i| {
            let (a, b) = (points[i], points[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum();
    twice.abs() / 2.0
}

/// Ray casting; points exactly on an edge may land either way
fn polygon_contains(points: &[Point], p: &Point) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (points[i], points[j]);
        if (pi.y > p.y) != (pj.y > p.y) && p.x < (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn orientation(a: &Point, b: &Point, c: &Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn on_segment(a: &Point, b: &Point, p: &Point) -> bool {
    p.x >= a.x.min(b.x) - GEOMETRY_EPSILON
        && p.x <= a.x.max(b.x) + GEOMETRY_EPSILON
        && p.y >= a.y.min(b.y) - GEOMETRY_EPSILON
        && p.y <= a.y.max(b.y) + GEOMETRY_EPSILON
}

fn segments_intersect(p1: &Point, p2: &Point, p3: &Point, p4: &Point) -> bool {
    let d1 = orientation(p3, p4, p1);
    let d2 = orientation(p3, p4, p2);
    let d3 = orientation(p1, p2, p3);
    let d4 = orientation(p1, p2, p4);

    let straddles = |a: f64, b: f64| (a > GEOMETRY_EPSILON && b < -GEOMETRY_EPSILON)
        || (a < -GEOMETRY_EPSILON && b > GEOMETRY_EPSILON);
    if straddles(d1, d2) && straddles(d3, d4) {
        return true;
    }

    (d1.abs() <= GEOMETRY_EPSILON && on_segment(p3, p4, p1))
        || (d2.abs() <= GEOMETRY_EPSILON && on_segment(p3, p4, p2))
        || (d3.abs() <= GEOMETRY_EPSILON && on_segment(p1, p2, p3))
        || (d4.abs() <= GEOMETRY_EPSILON && on_segment(p1, p2, p4))
}

fn is_self_intersecting(points: &[Point]) -> bool {
    let n = points.len();

    // Adjacent edges folding back onto each other.
    for i in 0..n {
        let (a, b, c) = (&points[i], &points[(i + 1) % n], &points[(i + 2) % n]);
        let dot = (a.x - b.x) * (c.x - b.x) + (a.y - b.y) * (c.y - b.y);
        if orientation(a, b, c).abs() <= GEOMETRY_EPSILON && dot > 0.0 {
            return true;
        }
    }

    for i in 0..n {
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            if segments_intersect(
                &points[i],
                &points[(i + 1) % n],
                &points[j],
                &points[(j + 1) % n],
            ) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poly(coords: &[(f64, f64)]) -> CoverageShape {
        CoverageShape::Polygon {
            points: coords.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        }
    }

    #[test]
    fn test_circle_validation() {
        let ok = CoverageShape::Circle {
            center: Point::new(1.0, 1.0),
            radius: 5.0,
        };
        assert!(ok.validate(None).is_ok());
        for r in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let bad = CoverageShape::Circle {
                center: Point::new(1.0, 1.0),
                radius: r,
            };
            assert!(bad.validate(None).is_err());
        }
    }

    #[test]
    fn test_rectangle_normalization() {
        let r = CoverageShape::Rectangle {
            x: 10.0,
            y: 10.0,
            width: -4.0,
            height: -2.0,
        };
        assert!(r.validate(None).is_ok());
        assert_eq!(
            r.normalized(),
            CoverageShape::Rectangle {
                x: 6.0,
                y: 8.0,
                width: 4.0,
                height: 2.0
            }
        );
        assert!(r.contains(&Point::new(7.0, 9.0)));
        let flat = CoverageShape::Rectangle {
            x: 0.0,
            y: 0.0,
            width: 4.0,
            height: 0.0,
        };
        assert!(flat.validate(None).is_err());
    }

    #[test]
    fn test_polygon_degenerate() {
        assert!(poly(&[(0.0, 0.0), (1.0, 1.0)]).validate(None).is_err());
        assert!(poly(&[(0.0, 0.0), (1.0, 1.0), (1.0, 1.0), (0.0, 0.0)]).validate(None).is_err());
        assert!(poly(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]).validate(None).is_err());
    }

    #[test]
    fn test_polygon_self_intersection() {
        // Bow tie
        let bow = poly(&[(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0)]);
        assert!(bow.validate(None).is_err());
        // Spike folding back along an edge
        let spike = poly(&[(0.0, 0.0), (10.0, 0.0), (5.0, 0.0), (5.0, 5.0)]);
        assert!(spike.validate(None).is_err());
        let square = poly(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]);
        assert!(square.validate(None).is_ok());
        assert_eq!(
            square.normalized(),
            poly(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)])
        );
    }

    #[test]
    fn test_concave_polygon() {
        let l = poly(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 4.0),
            (4.0, 4.0),
            (4.0, 10.0),
            (0.0, 10.0),
        ]);
        assert!(l.validate(None).is_ok());
        assert!((l.area() - 64.0).abs() < 1e-9);
        assert!(l.contains(&Point::new(2.0, 8.0)));
        assert!(!l.contains(&Point::new(8.0, 8.0)));
    }

    #[test]
    fn test_max_area_rule() {
        let rules = ValidationRules { max_area_size: 50.0 };
        let square = poly(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        assert!(square.validate(Some(&rules)).is_err());
        assert!(square.validate(None).is_ok());
    }

    #[test]
    fn test_bounding_box() {
        let c = CoverageShape::Circle {
            center: Point::new(10.0, 20.0),
            radius: 5.0,
        };
        let b = c.bounding_box();
        assert_eq!((b.origin_x, b.origin_y, b.width, b.height), (5.0, 15.0, 10.0, 10.0));
    }

    #[test]
    fn test_serde_tagged() {
        let json = r#"{"kind": "circle", "center": {"x": 1, "y": 2}, "radius": 3}"#;
        let shape: CoverageShape = serde_json::from_str(json).unwrap();
        assert_eq!(
            shape,
            CoverageShape::Circle {
                center: Point::new(1.0, 2.0),
                radius: 3.0
            }
        );
    }
}
