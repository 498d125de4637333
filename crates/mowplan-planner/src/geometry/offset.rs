//! Polygon offsetting.

use super::{edges, segment_intersection_params, signed_area, EPSILON};
use mowplan_core::{Point, Polygon};

/// Vertices whose bisector is this close to perpendicular are dropped
/// instead of producing a near-infinite miter.
const MIN_HALF_ANGLE_COS: f64 = 1e-3;

/// True when no two non-adjacent edges cross
pub fn is_simple_polygon(poly: &[Point]) -> bool {
    let n = poly.len();
    if n < 3 {
        return false;
    }
    let edge_list: Vec<(Point, Point)> = edges(poly).collect();
    for i in 0..n {
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let (a1, a2) = edge_list[i];
            let (b1, b2) = edge_list[j];
            if segment_intersection_params(a1, a2, b1, b2).is_some() {
                return false;
            }
        }
    }
    true
}

/// Miter offset of every vertex along its averaged edge normal.
///
/// Positive `distance` shrinks the polygon, negative grows it, regardless
/// of winding. The displacement is scaled so each edge moves by exactly
/// `distance`. Returns an empty polygon when the result is not a simple
/// ring of the same orientation that shrank (or grew) as requested.
pub fn offset_polygon(poly: &[Point], distance: f64) -> Polygon {
    if poly.len() < 3 || !distance.is_finite() {
        return Vec::new();
    }
    let area = signed_area(poly);
    if area.abs() < EPSILON {
        return Vec::new();
    }
    if distance == 0.0 {
        return poly.to_vec();
    }

    // left normals of a counter-clockwise ring point inward
    let inward = if area > 0.0 { 1.0 } else { -1.0 };
    let n = poly.len();
    let mut result = Vec::with_capacity(n);
    let mut sources = Vec::with_capacity(n);
    for i in 0..n {
        let prev = poly[(i + n - 1) % n];
        let curr = poly[i];
        let next = poly[(i + 1) % n];
        let (Some(e1), Some(e2)) = ((curr - prev).normalized(), (next - curr).normalized()) else {
            continue;
        };
        let Some(bisector) = (e1.perp() + e2.perp()).normalized() else {
            continue;
        };
        let cos_half = bisector.dot(e1.perp());
        if cos_half < MIN_HALF_ANGLE_COS {
            continue;
        }
        let moved = curr + bisector * (inward * distance / cos_half);
        if moved.is_finite() {
            result.push(moved);
            sources.push(i);
        }
    }

    let new_area = signed_area(&result);
    let same_orientation = new_area * area > 0.0;
    let resized = if distance > 0.0 {
        new_area.abs() < area.abs()
    } else {
        new_area.abs() > area.abs()
    };
    if result.len() < 3
        || !same_orientation
        || !resized
        || edge_flipped(poly, &result, &sources)
        || !is_simple_polygon(&result)
    {
        return Vec::new();
    }
    result
}

/// An offset edge pointing against its source edge means the ring turned
/// inside out.
fn edge_flipped(poly: &[Point], result: &[Point], sources: &[usize]) -> bool {
    let n = poly.len();
    let m = result.len();
    (0..m).any(|k| {
        let (i, j) = (sources[k], sources[(k + 1) % m]);
        j == (i + 1) % n && (result[(k + 1) % m] - result[k]).dot(poly[j] - poly[i]) <= 0.0
    })
}

/// Shrink `poly` by `distance`; see [`offset_polygon`].
///
/// A non-positive distance returns the polygon unchanged.
pub fn offset_polygon_inward(poly: &[Point], distance: f64) -> Polygon {
    if distance <= 0.0 {
        return if poly.len() >= 3 { poly.to_vec() } else { Vec::new() };
    }
    offset_polygon(poly, distance)
}
