//! Shape metrics used to classify zone boundaries.

use super::{centroid, convex_hull, edges, perimeter_length, polygon_area, Bounds, EPSILON};
use mowplan_core::Point;
use std::f64::consts::PI;

const CIRCULAR_SAMPLES: usize = 64;
const MAX_RADIAL_VARIATION: f64 = 0.2;
const MIN_CIRCULARITY: f64 = 0.85;

/// `area / area(convex_hull)`, 1.0 for convex shapes, 0.0 when degenerate
pub fn convexity_ratio(poly: &[Point]) -> f64 {
    let hull_area = polygon_area(&convex_hull(poly));
    if hull_area < EPSILON {
        return 0.0;
    }
    (polygon_area(poly) / hull_area).min(1.0)
}

/// Isoperimetric quotient `4πA / P²`; 1.0 for a circle
pub fn circularity(poly: &[Point]) -> f64 {
    let perimeter = perimeter_length(poly);
    if perimeter < EPSILON {
        return 0.0;
    }
    4.0 * PI * polygon_area(poly) / (perimeter * perimeter)
}

/// Long side over short side of the bounding box, 0.0 when degenerate
pub fn aspect_ratio(poly: &[Point]) -> f64 {
    let Some(bounds) = Bounds::from_points(poly) else {
        return 0.0;
    };
    let (long, short) = if bounds.width() >= bounds.height() {
        (bounds.width(), bounds.height())
    } else {
        (bounds.height(), bounds.width())
    };
    if short < EPSILON {
        return 0.0;
    }
    long / short
}

/// `count` points spaced evenly along the outline
pub fn resample_boundary(poly: &[Point], count: usize) -> Vec<Point> {
    let total = perimeter_length(poly);
    if poly.len() < 2 || total < EPSILON || count == 0 {
        return poly.to_vec();
    }
    let step = total / count as f64;
    let mut samples = Vec::with_capacity(count);
    let mut next = 0.0;
    let mut walked = 0.0;
    for (a, b) in edges(poly) {
        let len = a.distance_to(&b);
        if len < EPSILON {
            continue;
        }
        while next <= walked + len && samples.len() < count {
            samples.push(a.lerp(b, (next - walked) / len));
            next += step;
        }
        walked += len;
    }
    samples
}

/// Whether the outline is close to a circle.
///
/// The distance from the centroid to evenly spaced outline samples must
/// vary by less than 20% (standard deviation over mean), and the
/// isoperimetric quotient must reach 0.85. Squares and rectangles pass the
/// first test but fail the second.
pub fn is_roughly_circular(poly: &[Point]) -> bool {
    if poly.len() < 3 {
        return false;
    }
    let Some(center) = centroid(poly) else {
        return false;
    };
    let samples = resample_boundary(poly, CIRCULAR_SAMPLES);
    let distances: Vec<f64> = samples.iter().map(|p| p.distance_to(&center)).collect();
    let n = distances.len() as f64;
    let mean = distances.iter().sum::<f64>() / n;
    if mean < EPSILON {
        return false;
    }
    let variance = distances.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt() / mean < MAX_RADIAL_VARIATION && circularity(poly) >= MIN_CIRCULARITY
}
