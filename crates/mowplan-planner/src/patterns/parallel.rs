//! Parallel swaths and the patterns built from them (zigzag, grid,
//! divide-and-conquer).

use super::PatternContext;
use crate::geometry::{clip_swath, Bounds, EdgeBand};
use mowplan_core::{Path, Point, Result};

/// Boustrophedon swaths at `direction_deg` over the zone boundary
pub(super) fn generate(ctx: &PatternContext<'_>, direction_deg: f64) -> Result<Path> {
    swaths(ctx, ctx.boundary(), direction_deg)
}

/// Swaths perpendicular to the longer side of the bounding box
pub(super) fn zigzag(ctx: &PatternContext<'_>) -> Result<Path> {
    let Some(bounds) = Bounds::from_points(ctx.boundary()) else {
        return Ok(Path::new());
    };
    let direction = if bounds.width() < bounds.height() {
        0.0
    } else {
        90.0
    };
    swaths(ctx, ctx.boundary(), direction)
}

/// A full pass at 0° followed by a full pass at 90°
pub(super) fn grid(ctx: &PatternContext<'_>) -> Result<Path> {
    let mut path = swaths(ctx, ctx.boundary(), 0.0)?;
    let cross = swaths(ctx, ctx.boundary(), 90.0)?;
    path.append(&cross, ctx.settings.transit_speed);
    Ok(path)
}

/// First half of a 0° pass, then first half of a 90° pass
pub(super) fn divide_and_conquer(ctx: &PatternContext<'_>) -> Result<Path> {
    let mut path = swaths(ctx, ctx.boundary(), 0.0)?;
    let mut cross = swaths(ctx, ctx.boundary(), 90.0)?;
    path.truncate(path.len() / 2);
    cross.truncate(cross.len() / 2);
    path.append(&cross, ctx.settings.transit_speed);
    Ok(path)
}

/// Scanline fill of `boundary` minus the context's footprints.
///
/// The boundary is rotated so swaths run along the X axis, scanlines are
/// spaced at most one effective width apart across the rotated bounding
/// box and every other non-empty swath is reversed.
pub(super) fn swaths(ctx: &PatternContext<'_>, boundary: &[Point], direction_deg: f64) -> Result<Path> {
    swaths_excluding(ctx, boundary, direction_deg, None)
}

/// [`swaths`] that additionally skip everything inside `band`
pub(super) fn swaths_excluding(
    ctx: &PatternContext<'_>,
    boundary: &[Point],
    direction_deg: f64,
    band: Option<&EdgeBand<'_>>,
) -> Result<Path> {
    let mut path = Path::new();
    if boundary.len() < 3 {
        return Ok(path);
    }
    let spacing = ctx.spacing();

    let cos_a = (-direction_deg).to_radians().cos();
    let sin_a = (-direction_deg).to_radians().sin();
    let rotate = |p: Point| -> Point { Point::new(p.x * cos_a - p.y * sin_a, p.x * sin_a + p.y * cos_a) };
    let inv_rotate = |p: Point| -> Point {
        let cos_inv = direction_deg.to_radians().cos();
        let sin_inv = direction_deg.to_radians().sin();
        Point::new(p.x * cos_inv - p.y * sin_inv, p.x * sin_inv + p.y * cos_inv)
    };

    let rotated: Vec<Point> = boundary.iter().map(|&p| rotate(p)).collect();
    let Some(bounds) = Bounds::from_points(&rotated) else {
        return Ok(path);
    };

    let offsets = scanline_offsets(bounds.min_y, bounds.max_y, spacing);
    let pad = 1.0 + spacing;
    let speed = ctx.settings.mowing_speed;
    let transit = ctx.settings.transit_speed;

    let mut forward = true;
    let mut swath_count = 0usize;
    for current_y in offsets {
        ctx.cancel.check()?;
        let start = inv_rotate(Point::new(bounds.min_x - pad, current_y));
        let end = inv_rotate(Point::new(bounds.max_x + pad, current_y));
        let mut pieces = clip_swath(start, end, boundary, ctx.footprints);
        if let Some(band) = band {
            pieces = pieces
                .into_iter()
                .flat_map(|(s, e)| clip_swath(s, e, boundary, std::slice::from_ref(band)))
                .collect();
        }
        if pieces.is_empty() {
            continue;
        }
        if !forward {
            pieces.reverse();
            for piece in pieces.iter_mut() {
                *piece = (piece.1, piece.0);
            }
        }
        for (piece_start, piece_end) in pieces {
            path.move_to(piece_start, transit);
            path.mow_to(piece_end, speed);
        }
        forward = !forward;
        swath_count += 1;
    }

    tracing::debug!(
        "Parallel fill at {:.1}°: {} swaths, {} waypoints",
        direction_deg,
        swath_count,
        path.len()
    );
    Ok(path)
}

/// Scanline positions from half a spacing inside `min` to half a spacing
/// inside `max`, evenly spread and never more than `spacing` apart. A
/// strip thinner than one spacing gets a single centred line.
fn scanline_offsets(min: f64, max: f64, spacing: f64) -> Vec<f64> {
    let height = max - min;
    if height <= spacing {
        return vec![(min + max) / 2.0];
    }
    let first = min + spacing / 2.0;
    let last = max - spacing / 2.0;
    let gaps = ((last - first) / spacing).ceil().max(1.0) as usize;
    let step = (last - first) / gaps as f64;
    (0..=gaps).map(|k| first + step * k as f64).collect()
}
