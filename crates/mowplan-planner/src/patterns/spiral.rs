//! Archimedean spiral around the zone centroid.

use super::{push_pieces, PatternContext};
use crate::avoidance::blocked;
use crate::geometry::{centroid, clip_line_to_boundary, point_in_polygon};
use mowplan_core::{Path, Point, Result};
use std::f64::consts::PI;

const MIN_STEP_DEGREES: f64 = 0.1;

pub(super) fn generate(ctx: &PatternContext<'_>) -> Result<Path> {
    let boundary = ctx.boundary();
    let mut path = Path::new();
    let Some(center) = centroid(boundary) else {
        return Ok(path);
    };
    if boundary.len() < 3 {
        return Ok(path);
    }

    let spacing = ctx.spacing();
    let a = spacing;
    let b = spacing / (2.0 * PI);
    let max_radius = boundary
        .iter()
        .map(|p| p.distance_to(&center))
        .fold(0.0, f64::max);
    let step = ctx
        .settings
        .spiral_step_degrees
        .max(MIN_STEP_DEGREES)
        .to_radians();
    let theta_max = ((max_radius - a) / b).max(0.0);
    let steps = (theta_max / step).ceil() as usize;

    // runs of consecutive samples that are inside the lawn and clear
    let mut runs: Vec<Vec<Point>> = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    for i in 0..=steps {
        if i % 256 == 0 {
            ctx.cancel.check()?;
        }
        let theta = (i as f64 * step).min(theta_max);
        let r = a + b * theta;
        let p = center + Point::new(theta.cos(), theta.sin()) * r;
        if point_in_polygon(p, boundary) && !blocked(p, ctx.footprints) {
            current.push(p);
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }

    if !ctx.settings.reverse_spiral {
        // mow from the outside in
        runs.reverse();
        for run in runs.iter_mut() {
            run.reverse();
        }
    }

    let speed = ctx.settings.mowing_speed;
    let transit = ctx.settings.transit_speed;
    for run in &runs {
        if let Some(first) = run.first() {
            path.move_to(*first, transit);
        }
        for w in run.windows(2) {
            let pieces = clip_line_to_boundary(w[0], w[1], boundary, &ctx.outlines);
            push_pieces(&mut path, &pieces, speed, transit);
        }
    }

    tracing::debug!(
        "Spiral from {} out to {:.2} m: {} runs, {} waypoints",
        center,
        max_radius,
        runs.len(),
        path.len()
    );
    Ok(path)
}
