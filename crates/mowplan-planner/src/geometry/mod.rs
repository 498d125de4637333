//! Geometry kernel
//!
//! Stateless functions on points and polygons. Polygons are implicitly
//! closed vertex rings. Every function is total: degenerate input (fewer
//! than three vertices, zero-length edges, parallel lines) yields an empty,
//! false or zero result instead of NaN or a panic.

mod clip;
mod metrics;
mod offset;

pub use clip::{
    buffered_polygon_intervals, circle_interval, clip_line_to_boundary, clip_swath,
    inside_intervals, segment_inside, strip_interval, subtract_intervals, union_intervals,
    within_buffered_polygon, EdgeBand, Interval, Region,
};
pub use metrics::{
    aspect_ratio, circularity, convexity_ratio, is_roughly_circular, resample_boundary,
};
pub use offset::{is_simple_polygon, offset_polygon, offset_polygon_inward};

use mowplan_core::{Point, Polygon};
use std::cmp::Ordering;

/// Tolerance for parallel-line and zero-length checks.
pub const EPSILON: f64 = 1e-10;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// `None` for an empty slice
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let init = Bounds {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        Some(points.iter().skip(1).fold(init, |b, p| Bounds {
            min_x: b.min_x.min(p.x),
            min_y: b.min_y.min(p.y),
            max_x: b.max_x.max(p.x),
            max_y: b.max_y.max(p.y),
        }))
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn diagonal(&self) -> f64 {
        self.width().hypot(self.height())
    }
}

/// Even-odd ray casting test.
///
/// Points exactly on an edge get a deterministic answer that depends only
/// on the input, never on call history.
pub fn point_in_polygon(p: Point, poly: &[Point]) -> bool {
    if poly.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = poly.len() - 1;
    for i in 0..poly.len() {
        let (pi, pj) = (poly[i], poly[j]);
        if (pi.y > p.y) != (pj.y > p.y) {
            let x_cross = (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Shoelace area, positive for counter-clockwise rings
pub fn signed_area(poly: &[Point]) -> f64 {
    if poly.len() < 3 {
        return 0.0;
    }
    let twice: f64 = edges(poly).map(|(a, b)| a.cross(b)).sum();
    twice / 2.0
}

/// Absolute shoelace area; 0 for fewer than three points
pub fn polygon_area(poly: &[Point]) -> f64 {
    signed_area(poly).abs()
}

pub fn perimeter_length(poly: &[Point]) -> f64 {
    if poly.len() < 2 {
        return 0.0;
    }
    edges(poly).map(|(a, b)| a.distance_to(&b)).sum()
}

/// Area centroid, falling back to the vertex mean for zero-area rings
pub fn centroid(poly: &[Point]) -> Option<Point> {
    if poly.is_empty() {
        return None;
    }
    let area = signed_area(poly);
    if area.abs() < EPSILON {
        let sum = poly.iter().fold(Point::ORIGIN, |acc, p| acc + *p);
        return Some(sum * (1.0 / poly.len() as f64));
    }
    let (cx, cy) = edges(poly).fold((0.0, 0.0), |(cx, cy), (a, b)| {
        let cross = a.cross(b);
        (cx + (a.x + b.x) * cross, cy + (a.y + b.y) * cross)
    });
    Some(Point::new(cx / (6.0 * area), cy / (6.0 * area)))
}

/// Closed-ring edges `(v[i], v[i+1])`, wrapping back to the first vertex
pub fn edges(poly: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    let n = poly.len();
    (0..n).map(move |i| (poly[i], poly[(i + 1) % n]))
}

/// Cross product of `o→a` and `o→b`; positive for a left turn
pub fn orient(o: Point, a: Point, b: Point) -> f64 {
    (a - o).cross(b - o)
}

/// Graham scan convex hull, counter-clockwise.
///
/// Fewer than three points are returned unchanged. Collinear points on the
/// hull boundary are dropped.
pub fn convex_hull(points: &[Point]) -> Polygon {
    if points.len() < 3 {
        return points.to_vec();
    }
    let anchor = points.iter().copied().fold(points[0], |best, p| {
        if p.y < best.y || (p.y == best.y && p.x < best.x) {
            p
        } else {
            best
        }
    });

    let mut rest: Vec<Point> = points.iter().copied().filter(|p| *p != anchor).collect();
    rest.sort_by(|a, b| {
        let angle_a = (a.y - anchor.y).atan2(a.x - anchor.x);
        let angle_b = (b.y - anchor.y).atan2(b.x - anchor.x);
        angle_a
            .partial_cmp(&angle_b)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                anchor
                    .distance_to(a)
                    .partial_cmp(&anchor.distance_to(b))
                    .unwrap_or(Ordering::Equal)
            })
    });

    let mut hull = vec![anchor];
    for p in rest {
        while hull.len() >= 2 && orient(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    hull
}

/// Parameters `(ua, ub)` where segments `a1→a2` and `b1→b2` cross
pub fn segment_intersection_params(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<(f64, f64)> {
    let da = a2 - a1;
    let db = b2 - b1;
    let denom = da.cross(db);
    if denom.abs() < EPSILON {
        return None;
    }
    let offset = b1 - a1;
    let ua = offset.cross(db) / denom;
    let ub = offset.cross(da) / denom;
    if (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub) {
        Some((ua, ub))
    } else {
        None
    }
}

/// Crossing point of two segments, `None` when parallel or disjoint
pub fn segment_intersection(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<Point> {
    segment_intersection_params(a1, a2, b1, b2).map(|(ua, _)| a1.lerp(a2, ua))
}

/// Every crossing of `a→b` with an edge of `poly`, in edge order
pub fn line_polygon_intersections(a: Point, b: Point, poly: &[Point]) -> Vec<Point> {
    if poly.len() < 2 {
        return Vec::new();
    }
    edges(poly)
        .filter_map(|(e1, e2)| segment_intersection(a, b, e1, e2))
        .collect()
}

/// Shortest distance from `p` to segment `a→b`
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.dot(ab);
    if len_sq < EPSILON * EPSILON {
        return p.distance_to(&a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance_to(&a.lerp(b, t))
}

/// Shortest distance from `p` to the outline of `poly`
pub fn distance_to_polygon(p: Point, poly: &[Point]) -> f64 {
    match poly.len() {
        0 => f64::INFINITY,
        1 => p.distance_to(&poly[0]),
        _ => edges(poly)
            .map(|(a, b)| distance_to_segment(p, a, b))
            .fold(f64::INFINITY, f64::min),
    }
}
