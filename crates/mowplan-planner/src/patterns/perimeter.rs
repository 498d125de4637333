//! Perimeter-first: edge loops, then a parallel fill of what is left.

use super::{parallel, push_pieces, PatternContext};
use crate::geometry::{clip_line_to_boundary, edges, offset_polygon_inward, EdgeBand};
use mowplan_core::{Path, PlanningError, Result};

pub(super) fn generate(ctx: &PatternContext<'_>) -> Result<Path> {
    let boundary = ctx.boundary();
    let spacing = ctx.spacing();
    let passes = ctx.settings.perimeter_passes;
    let edge_speed = ctx.settings.edge_speed;
    let transit = ctx.settings.transit_speed;

    let mut path = Path::new();
    // depth from the boundary mowed by the loops emitted so far
    let mut covered = 0.0;
    for pass in 0..passes {
        ctx.cancel.check()?;
        // blade centred half a swath inside the previous loop
        let distance = (pass as f64 + 0.5) * spacing;
        let ring = offset_polygon_inward(boundary, distance);
        if ring.len() < 3 {
            tracing::debug!(
                "{} for zone {}, skipping edge loop {}",
                PlanningError::DegenerateOffset { distance },
                ctx.zone.id,
                pass + 1
            );
            continue;
        }
        for (a, b) in edges(&ring) {
            let pieces = clip_line_to_boundary(a, b, boundary, &ctx.outlines);
            push_pieces(&mut path, &pieces, edge_speed, transit);
        }
        covered = (pass as f64 + 1.0) * spacing;
    }

    let inner_distance = passes as f64 * spacing;
    let inner = offset_polygon_inward(boundary, inner_distance);
    let fill = if inner.len() >= 3 {
        parallel::swaths(ctx, &inner, ctx.zone.direction_degrees)?
    } else {
        // a thin feature collapses the whole offset; fill the boundary and
        // leave out only the band the loops already mowed
        tracing::debug!(
            "{} for zone {}, filling the boundary outside a {:.2} m edge band",
            PlanningError::DegenerateOffset {
                distance: inner_distance
            },
            ctx.zone.id,
            covered
        );
        let band = EdgeBand {
            boundary,
            width: covered,
        };
        let band = (covered > 0.0).then_some(&band);
        parallel::swaths_excluding(ctx, boundary, ctx.zone.direction_degrees, band)?
    };
    path.append(&fill, transit);
    Ok(path)
}
