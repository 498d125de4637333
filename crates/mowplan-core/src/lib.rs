//! # mowplan core
//!
//! Core types shared by the mowplan crates: the zone/obstacle/path data
//! model, the error hierarchy, and the planner event bus.

pub mod data;
pub mod error;
pub mod event_bus;

pub use data::{
    MowingPattern, MowingSchedule, Obstacle, ObstacleShape, ObstacleType, Path, PathSegment,
    PlanningResult, Point, Polygon, Waypoint, Zone, ZoneState,
};

pub use error::{Error, PlanningError, Result, StorageError, ZoneError};

pub use event_bus::{
    EventBus, EventBusConfig, EventBusError, EventCategory, EventFilter, PlannerEvent,
    SubscriptionId,
};
