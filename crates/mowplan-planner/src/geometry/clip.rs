//! Segment clipping against boundaries and obstacles.

use super::{
    distance_to_segment, edges, line_polygon_intersections, point_in_polygon,
    segment_intersection_params, EPSILON,
};
use mowplan_core::{Point, Polygon};
use std::cmp::Ordering;

/// Parameter range `[t0, t1]` along a segment, `0 <= t0 < t1 <= 1`
pub type Interval = (f64, f64);

const PARAM_EPS: f64 = 1e-12;

/// An area a segment can be clipped against
pub trait Region {
    fn contains(&self, p: Point) -> bool;

    /// Sorted, disjoint parameter ranges of `a→b` inside the region
    fn intervals(&self, a: Point, b: Point) -> Vec<Interval>;
}

impl Region for Polygon {
    fn contains(&self, p: Point) -> bool {
        point_in_polygon(p, self)
    }

    fn intervals(&self, a: Point, b: Point) -> Vec<Interval> {
        inside_intervals(a, b, self)
    }
}

/// Band of `width` along the inside of a boundary outline, already covered
/// by edge loops
#[derive(Debug, Clone)]
pub struct EdgeBand<'a> {
    pub boundary: &'a [Point],
    pub width: f64,
}

impl Region for EdgeBand<'_> {
    fn contains(&self, p: Point) -> bool {
        edges(self.boundary).any(|(a, b)| distance_to_segment(p, a, b) < self.width)
    }

    fn intervals(&self, a: Point, b: Point) -> Vec<Interval> {
        let mut blocked = Vec::new();
        for (p, q) in edges(self.boundary) {
            blocked.extend(circle_interval(a, b, p, self.width));
            blocked.extend(strip_interval(a, b, p, q, self.width));
        }
        union_intervals(blocked)
    }
}

/// Parameter ranges of `a→b` inside `poly`, by even-odd classification of
/// the pieces between edge crossings. Works for concave polygons.
pub fn inside_intervals(a: Point, b: Point, poly: &[Point]) -> Vec<Interval> {
    if poly.len() < 3 {
        return Vec::new();
    }
    if a.distance_to(&b) < EPSILON {
        return if point_in_polygon(a, poly) {
            vec![(0.0, 1.0)]
        } else {
            Vec::new()
        };
    }

    let mut params = vec![0.0, 1.0];
    params.extend(
        edges(poly).filter_map(|(e1, e2)| segment_intersection_params(a, b, e1, e2).map(|(t, _)| t)),
    );
    params.sort_by(|x, y| x.partial_cmp(y).unwrap_or(Ordering::Equal));
    params.dedup_by(|x, y| (*x - *y).abs() < PARAM_EPS);

    let mut inside: Vec<Interval> = Vec::new();
    for pair in params.windows(2) {
        let (t0, t1) = (pair[0], pair[1]);
        if t1 - t0 < PARAM_EPS {
            continue;
        }
        if !point_in_polygon(a.lerp(b, (t0 + t1) / 2.0), poly) {
            continue;
        }
        match inside.last_mut() {
            Some(last) if (last.1 - t0).abs() < PARAM_EPS => last.1 = t1,
            _ => inside.push((t0, t1)),
        }
    }
    inside
}

/// Remove every `blocked` range from `free`
pub fn subtract_intervals(free: &[Interval], blocked: &[Interval]) -> Vec<Interval> {
    let mut result = free.to_vec();
    for &(b0, b1) in blocked {
        result = result
            .into_iter()
            .flat_map(|(f0, f1)| {
                if b1 <= f0 || b0 >= f1 {
                    return vec![(f0, f1)];
                }
                let mut parts = Vec::with_capacity(2);
                if b0 > f0 {
                    parts.push((f0, b0));
                }
                if b1 < f1 {
                    parts.push((b1, f1));
                }
                parts
            })
            .collect();
    }
    result.retain(|(t0, t1)| t1 - t0 > PARAM_EPS);
    result
}

/// Pieces of `a→b` inside `boundary` and outside every obstacle region,
/// ordered from `a` to `b`.
pub fn clip_swath<R: Region>(
    a: Point,
    b: Point,
    boundary: &[Point],
    obstacles: &[R],
) -> Vec<(Point, Point)> {
    let mut free = inside_intervals(a, b, boundary);
    for obstacle in obstacles {
        if free.is_empty() {
            break;
        }
        let blocked = obstacle.intervals(a, b);
        if !blocked.is_empty() {
            free = subtract_intervals(&free, &blocked);
        }
    }
    free.into_iter()
        .map(|(t0, t1)| (a.lerp(b, t0), a.lerp(b, t1)))
        .filter(|(s, e)| s.distance_to(e) > 1e-6)
        .collect()
}

fn sort_by_distance_from(origin: Point, points: &mut [Point]) {
    points.sort_by(|p, q| {
        origin
            .distance_to(p)
            .partial_cmp(&origin.distance_to(q))
            .unwrap_or(Ordering::Equal)
    });
}

/// Sub-path of `a→b` inside `boundary` and outside `obstacles`, as 0, 2 or
/// 4 points (pairs of start/end).
///
/// - both ends outside the boundary: the first and last crossing, if any
/// - one end inside: that end plus the crossing nearest to it
/// - both ends inside: split around the first obstacle crossed, or nothing
///   when both ends lie in the same obstacle
pub fn clip_line_to_boundary(a: Point, b: Point, boundary: &[Point], obstacles: &[Polygon]) -> Vec<Point> {
    if boundary.len() < 3 {
        return Vec::new();
    }
    let a_inside = point_in_polygon(a, boundary);
    let b_inside = point_in_polygon(b, boundary);

    if !a_inside || !b_inside {
        let mut crossings = line_polygon_intersections(a, b, boundary);
        if crossings.is_empty() {
            return Vec::new();
        }
        sort_by_distance_from(a, &mut crossings);
        let first = crossings[0];
        let last = crossings[crossings.len() - 1];
        return match (a_inside, b_inside) {
            (true, false) => vec![a, first],
            (false, true) => vec![last, b],
            _ if crossings.len() >= 2 => vec![first, last],
            _ => Vec::new(),
        };
    }

    for obstacle in obstacles {
        if obstacle.len() < 3 {
            continue;
        }
        let a_blocked = point_in_polygon(a, obstacle);
        let b_blocked = point_in_polygon(b, obstacle);
        if a_blocked && b_blocked {
            return Vec::new();
        }
        let mut crossings = line_polygon_intersections(a, b, obstacle);
        if crossings.is_empty() {
            continue;
        }
        sort_by_distance_from(a, &mut crossings);
        let entry = crossings[0];
        let exit = crossings[crossings.len() - 1];
        match (a_blocked, b_blocked) {
            (true, false) => return vec![exit, b],
            (false, true) => return vec![a, entry],
            _ if crossings.len() >= 2 => return vec![a, entry, exit, b],
            // grazing a vertex
            _ => continue,
        }
    }
    vec![a, b]
}

/// Whether `a→b` stays inside `boundary` without crossing its outline
pub fn segment_inside(a: Point, b: Point, boundary: &[Point]) -> bool {
    point_in_polygon(a, boundary)
        && point_in_polygon(b, boundary)
        && line_polygon_intersections(a, b, boundary).is_empty()
}

/// Parameter range where `a→b` is closer than `radius` to `center`
pub fn circle_interval(a: Point, b: Point, center: Point, radius: f64) -> Option<Interval> {
    let d = b - a;
    let f = a - center;
    let qa = d.dot(d);
    if qa < EPSILON * EPSILON {
        return (a.distance_to(&center) < radius).then_some((0.0, 1.0));
    }
    let qb = 2.0 * f.dot(d);
    let qc = f.dot(f) - radius * radius;
    let disc = qb * qb - 4.0 * qa * qc;
    if disc <= 0.0 {
        return None;
    }
    let root = disc.sqrt();
    let t0 = ((-qb - root) / (2.0 * qa)).max(0.0);
    let t1 = ((-qb + root) / (2.0 * qa)).min(1.0);
    (t1 - t0 > PARAM_EPS).then_some((t0, t1))
}

/// Parameter range where `a→b` is within `radius` of the edge `p→q`
/// (the rectangular part of the capsule around the edge)
pub fn strip_interval(a: Point, b: Point, p: Point, q: Point, radius: f64) -> Option<Interval> {
    let axis = (q - p).normalized()?;
    let edge_len = p.distance_to(&q);
    let d = b - a;

    let mut range = (0.0f64, 1.0f64);
    // along-edge coordinate in [0, edge_len] and perpendicular in (-r, r)
    for (offset, slope, lo, hi) in [
        ((a - p).dot(axis), d.dot(axis), 0.0, edge_len),
        ((a - p).cross(axis), d.cross(axis), -radius, radius),
    ] {
        if slope.abs() < EPSILON {
            if offset < lo || offset > hi {
                return None;
            }
            continue;
        }
        let ta = (lo - offset) / slope;
        let tb = (hi - offset) / slope;
        range.0 = range.0.max(ta.min(tb));
        range.1 = range.1.min(ta.max(tb));
    }
    (range.1 - range.0 > PARAM_EPS).then_some(range)
}

/// Merge overlapping ranges into a sorted disjoint list
pub fn union_intervals(mut intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.sort_by(|x, y| x.0.partial_cmp(&y.0).unwrap_or(Ordering::Equal));
    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for (t0, t1) in intervals {
        match merged.last_mut() {
            Some(last) if t0 <= last.1 => last.1 = last.1.max(t1),
            _ => merged.push((t0, t1)),
        }
    }
    merged
}

/// Parameter ranges of `a→b` closer than `margin` to `poly` or inside it
pub fn buffered_polygon_intervals(a: Point, b: Point, poly: &[Point], margin: f64) -> Vec<Interval> {
    let mut blocked = inside_intervals(a, b, poly);
    if margin > 0.0 {
        for (p, q) in edges(poly) {
            blocked.extend(circle_interval(a, b, p, margin));
            blocked.extend(strip_interval(a, b, p, q, margin));
        }
    }
    union_intervals(blocked)
}

/// Whether `p` lies inside `poly` or within `margin` of its outline
pub fn within_buffered_polygon(p: Point, poly: &[Point], margin: f64) -> bool {
    point_in_polygon(p, poly)
        || (margin > 0.0 && edges(poly).any(|(a, b)| distance_to_segment(p, a, b) < margin))
}
