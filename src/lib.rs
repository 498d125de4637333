//! # mowplan
//!
//! Coverage path planning for autonomous lawn mowers:
//! - Zone and obstacle bookkeeping with persistent zone definitions
//! - Parallel, zigzag, grid, spiral, perimeter-first, random and adaptive
//!   coverage patterns
//! - Obstacle avoidance with safety margins and detours
//! - Path smoothing, simplification and dock anchoring
//! - Execution progress tracking
//!
//! ## Architecture
//!
//! mowplan is organized as a workspace with multiple crates:
//!
//! 1. **mowplan-core** - Data model, errors, planner events
//! 2. **mowplan-settings** - Configuration and zone stores
//! 3. **mowplan-planner** - Geometry, pattern generators, avoidance,
//!    optimizer and the coverage planner
//! 4. **mowplan** - Command line binary that integrates all crates

pub use mowplan_core::data;
pub use mowplan_planner::{geometry, patterns};

pub use mowplan_core::{
    Error, EventBus, EventCategory, EventFilter, MowingPattern, Obstacle, ObstacleShape,
    ObstacleType, Path, PathSegment, PlannerEvent, PlanningError, PlanningResult, Point, Polygon,
    Result, Waypoint, Zone, ZoneError, ZoneState,
};

pub use mowplan_planner::{
    classify, CancelToken, CoveragePlanner, Footprint, ObstacleAvoider, PathOptimizer,
    ShapeProfile,
};

pub use mowplan_settings::{
    AvoidancePolicy, Config, JsonZoneStore, MemoryZoneStore, MowerSettings, NavigationSettings,
    PatternSettings, StorageSettings, ZoneStore,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Human readable output on stderr, filtered by `RUST_LOG` (info by
/// default). Stdout is left for planner output.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Initialize logging as one JSON object per line on stderr
pub fn init_json_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .try_init()?;

    Ok(())
}
