//! Planar points in the lawn's local metric frame.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// A point (or vector) in meters.
///
/// Serialized as `[x, y]`. On input the legacy `"x,y"` string form and
/// `{ "x": .., "y": .. }` objects are accepted as well.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "PointRepr", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Ordered ring of points, implicitly closed.
pub type Polygon = Vec<Point>;

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        (*other - *self).length()
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn dot(&self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product.
    pub fn cross(&self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Unit vector in the same direction, `None` for (near) zero vectors.
    pub fn normalized(&self) -> Option<Point> {
        let len = self.length();
        if len < 1e-12 || !len.is_finite() {
            None
        } else {
            Some(Point::new(self.x / len, self.y / len))
        }
    }

    /// Left-hand perpendicular.
    pub fn perp(&self) -> Point {
        Point::new(-self.y, self.x)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn lerp(&self, other: Point, t: f64) -> Point {
        *self + (other - *self) * t
    }

    pub fn approx_eq(&self, other: &Point, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Point::new(x, y)
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PointRepr {
    Pair([f64; 2]),
    Object { x: f64, y: f64 },
    Text(String),
}

impl TryFrom<PointRepr> for Point {
    type Error = String;

    fn try_from(repr: PointRepr) -> Result<Self, Self::Error> {
        let point = match repr {
            PointRepr::Pair(pair) => Point::from(pair),
            PointRepr::Object { x, y } => Point::new(x, y),
            PointRepr::Text(text) => {
                let mut parts = text.split(',').map(str::trim);
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(x), Some(y), None) => {
                        let x = x
                            .parse::<f64>()
                            .map_err(|e| format!("invalid x in point '{}': {}", text, e))?;
                        let y = y
                            .parse::<f64>()
                            .map_err(|e| format!("invalid y in point '{}': {}", text, e))?;
                        Point::new(x, y)
                    }
                    _ => return Err(format!("expected \"x,y\", got '{}'", text)),
                }
            }
        };
        if point.is_finite() {
            Ok(point)
        } else {
            Err(format!("non-finite point {:?}", point))
        }
    }
}
