//! Planned mower paths.
//!
//! A path is an ordered list of waypoints. Each waypoint carries the blade
//! and speed settings for the travel that *arrives* at it; the first
//! waypoint is the start position and its flags are not used for motion.

use super::point::Point;
use serde::{Deserialize, Serialize};

/// A target position for the motion controller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub position: Point,
    /// Relative speed in `0.0..=1.0`.
    pub speed: f64,
    /// Blade state while travelling to this waypoint.
    pub mowing_active: bool,
}

impl Waypoint {
    pub fn mowing(position: Point, speed: f64) -> Self {
        Self {
            position,
            speed,
            mowing_active: true,
        }
    }

    pub fn transit(position: Point, speed: f64) -> Self {
        Self {
            position,
            speed,
            mowing_active: false,
        }
    }

    /// Same blade and speed settings
    pub fn same_flags(&self, other: &Waypoint) -> bool {
        self.mowing_active == other.mowing_active && (self.speed - other.speed).abs() < 1e-9
    }
}

/// Straight travel between two consecutive waypoints
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathSegment {
    pub start: Point,
    pub end: Point,
    pub speed: f64,
    pub mowing_active: bool,
}

impl PathSegment {
    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }
}

/// Ordered waypoint sequence produced by the planner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    waypoints: Vec<Waypoint>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            waypoints: Vec::with_capacity(capacity),
        }
    }

    /// Append a waypoint. Non-finite positions or speeds are skipped.
    ///
    /// Returns whether the waypoint was accepted.
    pub fn push(&mut self, waypoint: Waypoint) -> bool {
        if !waypoint.position.is_finite() || !waypoint.speed.is_finite() {
            tracing::debug!("Skipping non-finite waypoint {:?}", waypoint);
            return false;
        }
        self.waypoints.push(Waypoint {
            speed: waypoint.speed.clamp(0.0, 1.0),
            ..waypoint
        });
        true
    }

    /// Travel to `p` with the blade running
    pub fn mow_to(&mut self, p: Point, speed: f64) -> bool {
        self.push(Waypoint::mowing(p, speed))
    }

    /// Travel to `p` with the blade stopped; a no-op if already there
    pub fn move_to(&mut self, p: Point, speed: f64) -> bool {
        if self.last_position().is_some_and(|last| last.approx_eq(&p, 1e-9)) {
            return false;
        }
        self.push(Waypoint::transit(p, speed))
    }

    /// Append `other`, joining with a transit to its first waypoint
    pub fn append(&mut self, other: &Path, transit_speed: f64) {
        let mut iter = other.waypoints.iter();
        if let Some(first) = iter.next() {
            self.move_to(first.position, transit_speed);
        }
        for waypoint in iter {
            self.push(*waypoint);
        }
    }

    /// Keep only the first `len` waypoints
    pub fn truncate(&mut self, len: usize) {
        self.waypoints.truncate(len);
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn first_position(&self) -> Option<Point> {
        self.waypoints.first().map(|w| w.position)
    }

    pub fn last_position(&self) -> Option<Point> {
        self.waypoints.last().map(|w| w.position)
    }

    pub fn points(&self) -> Vec<Point> {
        self.waypoints.iter().map(|w| w.position).collect()
    }

    /// Segments in travel order
    pub fn segments(&self) -> impl Iterator<Item = PathSegment> + '_ {
        self.waypoints.windows(2).map(|pair| PathSegment {
            start: pair[0].position,
            end: pair[1].position,
            speed: pair[1].speed,
            mowing_active: pair[1].mowing_active,
        })
    }

    pub fn segment(&self, index: usize) -> Option<PathSegment> {
        let from = self.waypoints.get(index)?;
        let to = self.waypoints.get(index + 1)?;
        Some(PathSegment {
            start: from.position,
            end: to.position,
            speed: to.speed,
            mowing_active: to.mowing_active,
        })
    }

    pub fn segment_count(&self) -> usize {
        self.waypoints.len().saturating_sub(1)
    }

    pub fn mowing_segment_count(&self) -> usize {
        self.segments().filter(|s| s.mowing_active).count()
    }

    /// Total travel distance in meters
    pub fn total_length(&self) -> f64 {
        self.segments().map(|s| s.length()).sum()
    }

    /// Distance travelled with the blade running
    pub fn mowing_length(&self) -> f64 {
        self.segments()
            .filter(|s| s.mowing_active)
            .map(|s| s.length())
            .sum()
    }
}

impl FromIterator<Waypoint> for Path {
    fn from_iter<I: IntoIterator<Item = Waypoint>>(iter: I) -> Self {
        let mut path = Path::new();
        for waypoint in iter {
            path.push(waypoint);
        }
        path
    }
}
