//! Pattern selection from the boundary shape.

use super::{parallel, perimeter, spiral, GeneratedPath, PatternContext};
use crate::geometry::{aspect_ratio, convexity_ratio, is_roughly_circular, Bounds};
use mowplan_core::{MowingPattern, Point, Result};

const ELONGATED_ASPECT: f64 = 2.0;
const CONVEX_RATIO: f64 = 0.9;
const MODERATE_RATIO: f64 = 0.7;

/// Shape measurements that drive adaptive pattern selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeProfile {
    pub aspect_ratio: f64,
    pub convexity: f64,
    pub circular: bool,
    /// Swath direction along the longer bounding-box side
    pub long_axis_degrees: f64,
}

impl ShapeProfile {
    pub fn measure(boundary: &[Point]) -> Self {
        let long_axis_degrees = match Bounds::from_points(boundary) {
            Some(bounds) if bounds.height() > bounds.width() => 90.0,
            _ => 0.0,
        };
        Self {
            aspect_ratio: aspect_ratio(boundary),
            convexity: convexity_ratio(boundary),
            circular: is_roughly_circular(boundary),
            long_axis_degrees,
        }
    }

    pub fn is_elongated(&self) -> bool {
        self.aspect_ratio > ELONGATED_ASPECT
    }

    /// Pattern suited to this shape
    pub fn recommended(&self) -> MowingPattern {
        if self.is_elongated() {
            MowingPattern::Parallel
        } else if self.convexity > CONVEX_RATIO {
            if self.circular {
                MowingPattern::Spiral
            } else {
                MowingPattern::Parallel
            }
        } else if self.convexity > MODERATE_RATIO {
            MowingPattern::PerimeterFirst
        } else {
            MowingPattern::DivideAndConquer
        }
    }
}

/// Pattern the adaptive strategy picks for `boundary`
pub fn classify(boundary: &[Point]) -> MowingPattern {
    ShapeProfile::measure(boundary).recommended()
}

pub(super) fn generate(ctx: &PatternContext<'_>) -> Result<GeneratedPath> {
    let profile = ShapeProfile::measure(ctx.boundary());
    let pattern = profile.recommended();
    tracing::debug!(
        "Zone {} shape: aspect {:.2}, convexity {:.3}, circular {} => {}",
        ctx.zone.id,
        profile.aspect_ratio,
        profile.convexity,
        profile.circular,
        pattern
    );

    let path = match pattern {
        MowingPattern::Parallel if profile.is_elongated() => {
            parallel::generate(ctx, profile.long_axis_degrees)?
        }
        MowingPattern::Spiral => spiral::generate(ctx)?,
        MowingPattern::PerimeterFirst => perimeter::generate(ctx)?,
        MowingPattern::DivideAndConquer => parallel::divide_and_conquer(ctx)?,
        _ => parallel::generate(ctx, ctx.zone.direction_degrees)?,
    };
    Ok(GeneratedPath { path, pattern })
}
