//! Data model for coverage planning
//!
//! This module provides:
//! - Points and polygons in the lawn's local metric frame
//! - Obstacles with confidence, type tags and safety margins
//! - Zones with their boundary, mowing preferences and weekly schedule
//! - Paths made of flagged waypoints
//! - Planning results with progress tracking

pub mod obstacle;
pub mod path;
pub mod planning;
pub mod point;
pub mod schedule;
pub mod zone;

pub use obstacle::{Obstacle, ObstacleShape, ObstacleType};
pub use path::{Path, PathSegment, Waypoint};
pub use planning::PlanningResult;
pub use point::{Point, Polygon};
pub use schedule::MowingSchedule;
pub use zone::{MowingPattern, Zone, ZoneState};
