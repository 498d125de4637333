//! Obstacle avoidance
//!
//! Obstacles are inflated into [`Footprint`]s (physical outline grown by
//! the global and per-obstacle safety margins). [`ObstacleAvoider`] then
//! rewrites a path so that no waypoint and no segment enters a footprint,
//! bridging the gaps with transit routes around the footprints.

use crate::cancel::CancelToken;
use crate::geometry::{
    buffered_polygon_intervals, circle_interval, convex_hull, distance_to_polygon,
    inside_intervals, offset_polygon, point_in_polygon, subtract_intervals, union_intervals,
    within_buffered_polygon, Interval, Region,
};
use mowplan_core::{Obstacle, ObstacleShape, Path, Point, Polygon, Result, Waypoint};
use mowplan_settings::AvoidancePolicy;
use std::f64::consts::PI;

/// Sides of the polygon circumscribing a circular footprint
const CIRCLE_OUTLINE_SIDES: usize = 24;
/// Distance kept from a footprint edge when a segment is split there
const SPLIT_CLEARANCE: f64 = 1e-3;
/// Outline corners are pushed this much further from the outline center
/// before they are used as transit waypoints
const CORNER_SCALE: f64 = 1.02;
/// Tolerance for points lying on the zone boundary
const ON_BOUNDARY: f64 = 1e-6;

/// An obstacle grown by its safety margin
#[derive(Debug, Clone, PartialEq)]
pub enum Footprint {
    Circle {
        id: String,
        center: Point,
        radius: f64,
    },
    /// Every point within `margin` of `vertices` (or inside them)
    Polygon {
        id: String,
        vertices: Polygon,
        margin: f64,
    },
}

impl Footprint {
    /// Inflate `obstacle` by `global_margin` plus its own margin
    pub fn from_obstacle(obstacle: &Obstacle, global_margin: f64) -> Option<Self> {
        let margin = (global_margin + obstacle.safety_margin).max(0.0);
        match &obstacle.shape {
            ObstacleShape::Circle { center, radius } => {
                let radius = radius + margin;
                (center.is_finite() && radius.is_finite() && radius > 0.0).then(|| {
                    Footprint::Circle {
                        id: obstacle.id.clone(),
                        center: *center,
                        radius,
                    }
                })
            }
            ObstacleShape::Polygon { vertices } => {
                (vertices.len() >= 3 && vertices.iter().all(Point::is_finite)).then(|| {
                    Footprint::Polygon {
                        id: obstacle.id.clone(),
                        vertices: vertices.clone(),
                        margin,
                    }
                })
            }
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Footprint::Circle { id, .. } | Footprint::Polygon { id, .. } => id,
        }
    }

    /// Center and radius of a circle enclosing the footprint
    pub fn bounding_circle(&self) -> (Point, f64) {
        match self {
            Footprint::Circle { center, radius, .. } => (*center, *radius),
            Footprint::Polygon {
                vertices, margin, ..
            } => {
                let sum = vertices.iter().fold(Point::ORIGIN, |acc, p| acc + *p);
                let center = sum * (1.0 / vertices.len() as f64);
                let reach = vertices
                    .iter()
                    .map(|v| v.distance_to(&center))
                    .fold(0.0, f64::max);
                (center, reach + margin)
            }
        }
    }

    /// Polygon enclosing the whole footprint.
    ///
    /// Circles become a circumscribed regular polygon; polygonal obstacles
    /// use the miter offset of their convex hull.
    pub fn outline(&self) -> Polygon {
        match self {
            Footprint::Circle { center, radius, .. } => {
                let step = 2.0 * PI / CIRCLE_OUTLINE_SIDES as f64;
                let reach = radius / (step / 2.0).cos();
                (0..CIRCLE_OUTLINE_SIDES)
                    .map(|i| {
                        let angle = i as f64 * step;
                        *center + Point::new(angle.cos(), angle.sin()) * reach
                    })
                    .collect()
            }
            Footprint::Polygon {
                vertices, margin, ..
            } => {
                let hull = convex_hull(vertices);
                if *margin <= 0.0 {
                    return hull;
                }
                let grown = offset_polygon(&hull, -margin);
                if grown.is_empty() {
                    // fall back to a square around the bounding circle
                    let (center, reach) = self.bounding_circle();
                    vec![
                        center + Point::new(-reach, -reach),
                        center + Point::new(reach, -reach),
                        center + Point::new(reach, reach),
                        center + Point::new(-reach, reach),
                    ]
                } else {
                    grown
                }
            }
        }
    }
}

impl Region for Footprint {
    fn contains(&self, p: Point) -> bool {
        match self {
            Footprint::Circle { center, radius, .. } => p.distance_to(center) < *radius,
            Footprint::Polygon {
                vertices, margin, ..
            } => within_buffered_polygon(p, vertices, *margin),
        }
    }

    fn intervals(&self, a: Point, b: Point) -> Vec<Interval> {
        match self {
            Footprint::Circle { center, radius, .. } => {
                circle_interval(a, b, *center, *radius).into_iter().collect()
            }
            Footprint::Polygon {
                vertices, margin, ..
            } => buffered_polygon_intervals(a, b, vertices, *margin),
        }
    }
}

/// Inflate every obstacle at or above `min_confidence`
pub fn inflate_obstacles(
    obstacles: &[Obstacle],
    global_margin: f64,
    min_confidence: f64,
) -> Vec<Footprint> {
    obstacles
        .iter()
        .filter(|obstacle| {
            let reliable = obstacle.is_reliable(min_confidence);
            if !reliable {
                tracing::debug!(
                    "Ignoring obstacle {} (confidence {:.2} < {:.2})",
                    obstacle.id,
                    obstacle.confidence,
                    min_confidence
                );
            }
            reliable
        })
        .filter_map(|obstacle| {
            let footprint = Footprint::from_obstacle(obstacle, global_margin);
            if footprint.is_none() {
                tracing::warn!("Obstacle {} has degenerate geometry, ignored", obstacle.id);
            }
            footprint
        })
        .collect()
}

/// Whether `p` is inside any footprint
pub fn blocked(p: Point, footprints: &[Footprint]) -> bool {
    footprints.iter().any(|f| f.contains(p))
}

/// Rewrites paths so they stay clear of obstacle footprints
#[derive(Debug, Clone)]
pub struct ObstacleAvoider {
    safety_margin: f64,
    min_confidence: f64,
    policy: AvoidancePolicy,
    transit_speed: f64,
}

impl ObstacleAvoider {
    pub fn new(safety_margin: f64, min_confidence: f64, policy: AvoidancePolicy) -> Self {
        Self {
            safety_margin,
            min_confidence,
            policy,
            transit_speed: 1.0,
        }
    }

    pub fn with_transit_speed(mut self, speed: f64) -> Self {
        self.transit_speed = speed;
        self
    }

    pub fn policy(&self) -> AvoidancePolicy {
        self.policy
    }

    /// Footprints of the obstacles this avoider honours
    pub fn footprints(&self, obstacles: &[Obstacle]) -> Vec<Footprint> {
        inflate_obstacles(obstacles, self.safety_margin, self.min_confidence)
    }

    /// Rewrite `path` against `obstacles`.
    ///
    /// When `boundary` is given, transit routes between points on the lawn
    /// stay inside it. Pieces that cannot be reached without crossing a
    /// footprint are skipped.
    pub fn avoid(
        &self,
        path: &Path,
        obstacles: &[Obstacle],
        boundary: Option<&[Point]>,
        cancel: &CancelToken,
    ) -> Result<Path> {
        let footprints = self.footprints(obstacles);
        self.avoid_footprints(path, &footprints, boundary, cancel)
    }

    /// Same as [`avoid`](Self::avoid) with pre-inflated footprints
    pub fn avoid_footprints(
        &self,
        path: &Path,
        footprints: &[Footprint],
        boundary: Option<&[Point]>,
        cancel: &CancelToken,
    ) -> Result<Path> {
        if footprints.is_empty() || path.is_empty() {
            return Ok(path.clone());
        }

        let mut out = Path::with_capacity(path.len());
        if path.len() == 1 {
            if let Some(only) = path.waypoints().first() {
                if !blocked(only.position, footprints) {
                    out.push(*only);
                }
            }
            return Ok(out);
        }

        let mut removed = 0usize;
        let mut unreachable = 0usize;
        for (index, segment) in path.segments().enumerate() {
            if index % 64 == 0 {
                cancel.check()?;
            }
            let blocked_ranges = union_intervals(
                footprints
                    .iter()
                    .flat_map(|f| f.intervals(segment.start, segment.end))
                    .collect(),
            );
            // blade-off moves are always rerouted, never dropped
            let policy = if segment.mowing_active {
                self.policy
            } else {
                AvoidancePolicy::Split
            };
            let free = match (policy, blocked_ranges.is_empty()) {
                (_, true) => vec![(0.0, 1.0)],
                (AvoidancePolicy::Drop, false) => Vec::new(),
                (AvoidancePolicy::Split, false) => {
                    subtract_intervals(&[(0.0, 1.0)], &blocked_ranges)
                }
            };
            if free.len() != 1 || free[0] != (0.0, 1.0) {
                removed += 1;
            }

            let length = segment.start.distance_to(&segment.end);
            let nudge = if length > 0.0 {
                (SPLIT_CLEARANCE / length).min(0.25)
            } else {
                0.0
            };
            for (t0, t1) in free {
                let t0 = if t0 > 0.0 { t0 + nudge } else { t0 };
                let t1 = if t1 < 1.0 { t1 - nudge } else { t1 };
                if t1 <= t0 {
                    continue;
                }
                let start = segment.start.lerp(segment.end, t0);
                let end = segment.start.lerp(segment.end, t1);
                if blocked(start, footprints) || blocked(end, footprints) {
                    continue;
                }
                if !self.bridge(&mut out, start, footprints, boundary) {
                    unreachable += 1;
                    continue;
                }
                out.push(Waypoint {
                    position: end,
                    speed: segment.speed,
                    mowing_active: segment.mowing_active,
                });
            }
        }

        if unreachable > 0 {
            tracing::warn!(
                "Obstacle avoidance skipped {} path pieces with no clear transit route",
                unreachable
            );
        }
        if removed > 0 {
            tracing::debug!(
                "Obstacle avoidance ({}) rewrote {} of {} segments",
                self.policy,
                removed,
                path.segment_count()
            );
        }
        Ok(out)
    }

    /// Move from the end of `out` to `target` with the blade off, around
    /// any footprint in the way. Returns `false`, leaving `out` untouched,
    /// when no clear route exists.
    fn bridge(
        &self,
        out: &mut Path,
        target: Point,
        footprints: &[Footprint],
        boundary: Option<&[Point]>,
    ) -> bool {
        let Some(from) = out.last_position() else {
            out.move_to(target, self.transit_speed);
            return true;
        };
        if from.approx_eq(&target, 1e-9) {
            return true;
        }
        if leg_is_clear(from, target, footprints) {
            out.move_to(target, self.transit_speed);
            return true;
        }
        match transit_route(from, target, footprints, boundary) {
            Some(route) => {
                for p in route {
                    out.move_to(p, self.transit_speed);
                }
                true
            }
            None => {
                tracing::warn!("No clear transit route from {} to {}", from, target);
                false
            }
        }
    }
}

/// Whether `a→b` stays out of every footprint
fn leg_is_clear(a: Point, b: Point, footprints: &[Footprint]) -> bool {
    footprints.iter().all(|f| f.intervals(a, b).is_empty())
}

fn inside_or_on(p: Point, boundary: &[Point]) -> bool {
    point_in_polygon(p, boundary) || distance_to_polygon(p, boundary) < ON_BOUNDARY
}

/// Whether `a→b` stays inside `boundary`. Legs with an end outside the
/// boundary (a dock on the lawn edge) are not constrained.
fn stays_inside(a: Point, b: Point, boundary: &[Point]) -> bool {
    if !inside_or_on(a, boundary) || !inside_or_on(b, boundary) {
        return true;
    }
    let covered: f64 = inside_intervals(a, b, boundary)
        .iter()
        .map(|(t0, t1)| t1 - t0)
        .sum();
    covered > 1.0 - ON_BOUNDARY || distance_to_polygon(a.lerp(b, 0.5), boundary) < ON_BOUNDARY
}

/// Outline corners of every footprint, pushed slightly outwards, that are
/// free and inside `boundary`
fn corner_nodes(footprints: &[Footprint], boundary: Option<&[Point]>) -> Vec<Point> {
    let mut nodes = Vec::new();
    for footprint in footprints {
        let outline = footprint.outline();
        if outline.is_empty() {
            continue;
        }
        let sum = outline.iter().fold(Point::ORIGIN, |acc, p| acc + *p);
        let center = sum * (1.0 / outline.len() as f64);
        nodes.extend(
            outline
                .into_iter()
                .map(|v| center + (v - center) * CORNER_SCALE)
                .filter(|p| !blocked(*p, footprints))
                .filter(|p| boundary.map_or(true, |b| point_in_polygon(*p, b))),
        );
    }
    nodes
}

/// Shortest blade-off route from `from` to `to` through footprint corners,
/// excluding `from`. Every leg is clear of all footprints and, when
/// `boundary` is given, inside it.
fn transit_route(
    from: Point,
    to: Point,
    footprints: &[Footprint],
    boundary: Option<&[Point]>,
) -> Option<Vec<Point>> {
    let mut nodes = vec![from, to];
    nodes.extend(corner_nodes(footprints, boundary));
    let count = nodes.len();

    let usable = |a: Point, b: Point| {
        leg_is_clear(a, b, footprints) && boundary.map_or(true, |poly| stays_inside(a, b, poly))
    };

    // dense Dijkstra; visibility is only tested for legs that would improve
    let mut dist = vec![f64::INFINITY; count];
    let mut previous: Vec<Option<usize>> = vec![None; count];
    let mut settled = vec![false; count];
    dist[0] = 0.0;
    loop {
        let current = (0..count)
            .filter(|&i| !settled[i] && dist[i].is_finite())
            .min_by(|&a, &b| dist[a].total_cmp(&dist[b]))?;
        if current == 1 {
            break;
        }
        settled[current] = true;
        for next in 0..count {
            if settled[next] {
                continue;
            }
            let candidate = dist[current] + nodes[current].distance_to(&nodes[next]);
            if candidate < dist[next] && usable(nodes[current], nodes[next]) {
                dist[next] = candidate;
                previous[next] = Some(current);
            }
        }
    }

    let mut route = vec![to];
    let mut at = 1;
    while let Some(prev) = previous[at] {
        if prev == 0 {
            break;
        }
        route.push(nodes[prev]);
        at = prev;
    }
    route.reverse();
    Some(route)
}
