//! Random coverage: scattered samples visited nearest-first.

use super::{parallel, GeneratedPath, PatternContext};
use crate::avoidance::blocked;
use crate::geometry::{point_in_polygon, polygon_area, segment_inside, Bounds, Region};
use mowplan_core::{MowingPattern, Path, Point, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

const MIN_SAMPLES: usize = 10;
const ATTEMPTS_PER_SAMPLE: usize = 10;

pub(super) fn generate(ctx: &PatternContext<'_>) -> Result<GeneratedPath> {
    let boundary = ctx.boundary();
    let samples = sample_points(ctx)?;

    if samples.len() < MIN_SAMPLES {
        tracing::warn!(
            "Only {} random samples fit zone {}, falling back to parallel lines",
            samples.len(),
            ctx.zone.id
        );
        let path = parallel::generate(ctx, ctx.zone.direction_degrees)?;
        return Ok(GeneratedPath {
            path,
            pattern: MowingPattern::Parallel,
        });
    }

    let ordered = nearest_neighbour_order(ctx, samples)?;
    let speed = ctx.settings.mowing_speed;
    let transit = ctx.settings.transit_speed;
    let mut path = Path::with_capacity(ordered.len());
    let mut previous: Option<Point> = None;
    for p in ordered {
        match previous {
            None => {
                path.move_to(p, transit);
            }
            Some(prev) => {
                let clear = segment_inside(prev, p, boundary)
                    && ctx.footprints.iter().all(|f| f.intervals(prev, p).is_empty());
                if clear {
                    path.mow_to(p, speed);
                } else {
                    path.move_to(p, transit);
                }
            }
        }
        previous = Some(p);
    }

    tracing::debug!(
        "Random pattern for zone {} (seed {}): {} waypoints",
        ctx.zone.id,
        ctx.seed,
        path.len()
    );
    Ok(GeneratedPath {
        path,
        pattern: MowingPattern::Random,
    })
}

/// Rejection-sample points inside the lawn and outside every footprint,
/// keeping them at least `random_walk_step_m` apart.
fn sample_points(ctx: &PatternContext<'_>) -> Result<Vec<Point>> {
    let boundary = ctx.boundary();
    let settings = ctx.settings;
    let Some(bounds) = Bounds::from_points(boundary) else {
        return Ok(Vec::new());
    };
    if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
        return Ok(Vec::new());
    }

    let width_sq = ctx.mower_width * ctx.mower_width;
    let estimate = if width_sq > 0.0 {
        (polygon_area(boundary) / width_sq * 2.0) as usize
    } else {
        0
    };
    let needed = estimate
        .max(settings.random_min_points)
        .min(settings.random_max_points);
    let max_attempts = needed.saturating_mul(ATTEMPTS_PER_SAMPLE);

    let mut rng = StdRng::seed_from_u64(ctx.seed);
    let mut spacing = SpacingGrid::new(settings.random_walk_step_m);
    let mut samples = Vec::with_capacity(needed);
    let mut attempts = 0;
    while samples.len() < needed && attempts < max_attempts {
        if attempts % 256 == 0 {
            ctx.cancel.check()?;
        }
        attempts += 1;
        let p = Point::new(
            rng.gen_range(bounds.min_x..bounds.max_x),
            rng.gen_range(bounds.min_y..bounds.max_y),
        );
        if !point_in_polygon(p, boundary) || blocked(p, ctx.footprints) {
            continue;
        }
        if spacing.insert(p) {
            samples.push(p);
        }
    }
    tracing::debug!(
        "Sampled {} of {} random points in {} attempts",
        samples.len(),
        needed,
        attempts
    );
    Ok(samples)
}

fn nearest_neighbour_order(ctx: &PatternContext<'_>, mut remaining: Vec<Point>) -> Result<Vec<Point>> {
    let mut ordered = Vec::with_capacity(remaining.len());
    if remaining.is_empty() {
        return Ok(ordered);
    }
    let mut current = remaining.swap_remove(0);
    ordered.push(current);
    while !remaining.is_empty() {
        if ordered.len() % 256 == 0 {
            ctx.cancel.check()?;
        }
        let mut closest = 0;
        let mut min_dist = f64::INFINITY;
        for (i, p) in remaining.iter().enumerate() {
            let dist = current.distance_to(p);
            if dist < min_dist {
                min_dist = dist;
                closest = i;
            }
        }
        current = remaining.swap_remove(closest);
        ordered.push(current);
    }
    Ok(ordered)
}

/// Hash grid answering "is any accepted point closer than `min_distance`"
struct SpacingGrid {
    min_distance: f64,
    cells: HashMap<(i64, i64), Vec<Point>>,
}

impl SpacingGrid {
    fn new(min_distance: f64) -> Self {
        Self {
            min_distance,
            cells: HashMap::new(),
        }
    }

    fn cell(&self, p: Point) -> (i64, i64) {
        (
            (p.x / self.min_distance).floor() as i64,
            (p.y / self.min_distance).floor() as i64,
        )
    }

    /// Accept `p` unless it crowds an earlier point
    fn insert(&mut self, p: Point) -> bool {
        if self.min_distance <= 0.0 {
            return true;
        }
        let (cx, cy) = self.cell(p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(points) = self.cells.get(&(cx + dx, cy + dy)) {
                    if points.iter().any(|q| q.distance_to(&p) < self.min_distance) {
                        return false;
                    }
                }
            }
        }
        self.cells.entry((cx, cy)).or_default().push(p);
        true
    }
}
