//! Path post-processing: smoothing, simplification and dock anchoring.

use mowplan_core::{Path, Point, Waypoint};

/// Cleans up generated paths before they are handed to the mower
#[derive(Debug, Clone)]
pub struct PathOptimizer {
    collinearity_tolerance_deg: f64,
    min_spacing: f64,
    transit_speed: f64,
}

impl PathOptimizer {
    /// Points closer than a tenth of `mower_width` are merged; turns below
    /// `collinearity_tolerance_deg` are straightened.
    pub fn new(mower_width: f64, collinearity_tolerance_deg: f64) -> Self {
        Self {
            collinearity_tolerance_deg,
            min_spacing: (mower_width / 10.0).max(0.0),
            transit_speed: 1.0,
        }
    }

    pub fn with_transit_speed(mut self, speed: f64) -> Self {
        self.transit_speed = speed;
        self
    }

    /// Smooth, simplify, then anchor both ends at `dock` when given
    pub fn optimize(&self, path: &Path, dock: Option<Point>) -> Path {
        let before = path.len();
        let smoothed = self.smooth(path);
        let simplified = self.simplify(&smoothed);
        let optimized = match dock {
            Some(dock) => self.anchor_to_dock(&simplified, dock),
            None => simplified,
        };
        tracing::debug!(
            "Optimized path from {} to {} waypoints",
            before,
            optimized.len()
        );
        optimized
    }

    /// Drop interior waypoints where the path turns by less than the
    /// collinearity tolerance.
    ///
    /// A waypoint is only dropped when the travel arriving at it and the
    /// travel leaving it use the same blade and speed settings, so merging
    /// the two segments changes nothing but their count.
    pub fn smooth(&self, path: &Path) -> Path {
        let waypoints = path.waypoints();
        if waypoints.len() < 3 {
            return path.clone();
        }
        let tolerance = self.collinearity_tolerance_deg.to_radians();
        let mut out = Path::with_capacity(waypoints.len());
        out.push(waypoints[0]);
        for i in 1..waypoints.len() - 1 {
            let current = waypoints[i];
            let next = waypoints[i + 1];
            let prev = out.last_position().unwrap_or(waypoints[i - 1].position);
            let removable = current.same_flags(&next)
                && turn_angle(prev, current.position, next.position)
                    .is_some_and(|angle| angle < tolerance);
            if !removable {
                out.push(current);
            }
        }
        out.push(waypoints[waypoints.len() - 1]);
        out
    }

    /// Drop waypoints closer than the minimum spacing to the previously
    /// kept one. The first and last waypoints are always kept.
    pub fn simplify(&self, path: &Path) -> Path {
        let waypoints = path.waypoints();
        if waypoints.len() < 3 || self.min_spacing <= 0.0 {
            return path.clone();
        }
        let last_index = waypoints.len() - 1;
        let mut out = Path::with_capacity(waypoints.len());
        out.push(waypoints[0]);
        for waypoint in &waypoints[1..last_index] {
            let far_enough = out
                .last_position()
                .map_or(true, |kept| kept.distance_to(&waypoint.position) >= self.min_spacing);
            if far_enough {
                out.push(*waypoint);
            }
        }
        out.push(waypoints[last_index]);
        out
    }

    /// Start and finish at `dock`, travelling there with the blade off
    pub fn anchor_to_dock(&self, path: &Path, dock: Point) -> Path {
        let mut out = Path::with_capacity(path.len() + 2);
        out.push(Waypoint::transit(dock, self.transit_speed));
        let mut iter = path.waypoints().iter();
        if let Some(first) = iter.next() {
            // leaving the dock is never a mowing move
            out.move_to(first.position, self.transit_speed);
        }
        for waypoint in iter {
            out.push(*waypoint);
        }
        out.move_to(dock, self.transit_speed);
        out
    }
}

/// Absolute heading change at `b` in radians, `None` for a zero-length leg
fn turn_angle(a: Point, b: Point, c: Point) -> Option<f64> {
    let incoming = (b - a).normalized()?;
    let outgoing = (c - b).normalized()?;
    Some(incoming.cross(outgoing).atan2(incoming.dot(outgoing)).abs())
}
