//! Coverage pattern generators
//!
//! Each [`MowingPattern`] maps to one generator. Generators only see a
//! [`PatternContext`] (zone boundary, inflated obstacle footprints, mower
//! width, tuning) and return a raw [`Path`]; obstacle avoidance and
//! optimization run afterwards.

mod adaptive;
mod parallel;
mod perimeter;
mod random;
mod spiral;

pub use adaptive::{classify, ShapeProfile};

use crate::avoidance::Footprint;
use crate::cancel::CancelToken;
use mowplan_core::{MowingPattern, Path, PlanningError, Point, Polygon, Result, Zone};
use mowplan_settings::PatternSettings;

/// Smallest swath spacing accepted, in meters
const MIN_SPACING: f64 = 1e-6;

/// Everything a generator needs about one planning call
#[derive(Debug)]
pub struct PatternContext<'a> {
    pub zone: &'a Zone,
    pub footprints: &'a [Footprint],
    /// Polygonal outlines of `footprints`, for the point-pair clipper
    pub outlines: Vec<Polygon>,
    pub mower_width: f64,
    pub settings: &'a PatternSettings,
    pub cancel: &'a CancelToken,
    /// Seed for the random pattern
    pub seed: u64,
}

impl<'a> PatternContext<'a> {
    pub fn new(
        zone: &'a Zone,
        footprints: &'a [Footprint],
        mower_width: f64,
        settings: &'a PatternSettings,
        cancel: &'a CancelToken,
    ) -> Self {
        Self {
            zone,
            footprints,
            outlines: footprints.iter().map(Footprint::outline).collect(),
            mower_width,
            settings,
            cancel,
            seed: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn boundary(&self) -> &[Point] {
        &self.zone.perimeter
    }

    /// Distance between adjacent swaths
    pub fn spacing(&self) -> f64 {
        self.zone.effective_spacing(self.mower_width)
    }

    fn checked_spacing(&self) -> Result<f64> {
        let spacing = self.spacing();
        if !spacing.is_finite() || spacing <= MIN_SPACING {
            return Err(PlanningError::InvalidSpacing {
                spacing,
                mower_width: self.mower_width,
                overlap_percent: self.zone.overlap_percent,
            }
            .into());
        }
        Ok(spacing)
    }
}

/// A raw path and the pattern that actually produced it
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPath {
    pub path: Path,
    /// Differs from the requested pattern after adaptive selection or a
    /// fallback
    pub pattern: MowingPattern,
}

impl GeneratedPath {
    fn new(path: Path, pattern: MowingPattern) -> Self {
        Self { path, pattern }
    }
}

/// Generate the raw coverage path for `pattern`
pub fn generate(pattern: MowingPattern, ctx: &PatternContext<'_>) -> Result<GeneratedPath> {
    let spacing = ctx.checked_spacing()?;
    tracing::debug!(
        "Generating {} pattern for zone {} (spacing {:.3} m, {} footprints)",
        pattern,
        ctx.zone.id,
        spacing,
        ctx.footprints.len()
    );

    let generated = match pattern {
        MowingPattern::Parallel => GeneratedPath::new(
            parallel::generate(ctx, ctx.zone.direction_degrees)?,
            MowingPattern::Parallel,
        ),
        MowingPattern::Spiral => GeneratedPath::new(spiral::generate(ctx)?, MowingPattern::Spiral),
        MowingPattern::Zigzag => GeneratedPath::new(parallel::zigzag(ctx)?, MowingPattern::Zigzag),
        MowingPattern::Grid => GeneratedPath::new(parallel::grid(ctx)?, MowingPattern::Grid),
        MowingPattern::PerimeterFirst => GeneratedPath::new(
            perimeter::generate(ctx)?,
            MowingPattern::PerimeterFirst,
        ),
        MowingPattern::DivideAndConquer => GeneratedPath::new(
            parallel::divide_and_conquer(ctx)?,
            MowingPattern::DivideAndConquer,
        ),
        MowingPattern::Adaptive => adaptive::generate(ctx)?,
        MowingPattern::Random => random::generate(ctx)?,
        MowingPattern::Custom => {
            tracing::warn!(
                "{}; zone {} falls back to parallel lines",
                PlanningError::UnknownPattern {
                    pattern: pattern.to_string()
                },
                ctx.zone.id
            );
            GeneratedPath::new(
                parallel::generate(ctx, ctx.zone.direction_degrees)?,
                MowingPattern::Parallel,
            )
        }
    };
    Ok(generated)
}

/// Append start/end pairs as mowing runs joined by transits
fn push_pieces(path: &mut Path, pieces: &[Point], speed: f64, transit_speed: f64) {
    for pair in pieces.chunks_exact(2) {
        path.move_to(pair[0], transit_speed);
        path.mow_to(pair[1], speed);
    }
}
