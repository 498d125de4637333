//! Event type definitions for the event bus.
//!
//! Events are cloneable and serializable so they can be logged or relayed
//! to a dashboard verbatim.

use serde::{Deserialize, Serialize};

use crate::data::{MowingPattern, ZoneState};

/// Notifications emitted by the coverage planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlannerEvent {
    ZoneAdded {
        zone_id: String,
    },
    ZoneUpdated {
        zone_id: String,
    },
    ZoneDeleted {
        zone_id: String,
    },
    ObstacleAdded {
        obstacle_id: String,
    },
    ObstacleRemoved {
        obstacle_id: String,
    },
    ObstaclesCleared {
        count: usize,
    },
    PathPlanned {
        zone_id: String,
        pattern: MowingPattern,
        waypoints: usize,
        length_m: f64,
    },
    PlanningFailed {
        zone_id: String,
        reason: String,
    },
    StateChanged {
        zone_id: String,
        state: ZoneState,
    },
    SegmentAdvanced {
        zone_id: String,
        cursor: usize,
        progress: f64,
    },
    ZoneCompleted {
        zone_id: String,
    },
}

impl PlannerEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            Self::ZoneAdded { .. } | Self::ZoneUpdated { .. } | Self::ZoneDeleted { .. } => {
                EventCategory::Zone
            }
            Self::ObstacleAdded { .. }
            | Self::ObstacleRemoved { .. }
            | Self::ObstaclesCleared { .. } => EventCategory::Obstacle,
            Self::PathPlanned { .. } | Self::PlanningFailed { .. } => EventCategory::Planning,
            Self::StateChanged { .. } | Self::SegmentAdvanced { .. } | Self::ZoneCompleted { .. } => {
                EventCategory::Progress
            }
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            Self::ZoneAdded { zone_id } => format!("Zone {} added", zone_id),
            Self::ZoneUpdated { zone_id } => format!("Zone {} updated", zone_id),
            Self::ZoneDeleted { zone_id } => format!("Zone {} deleted", zone_id),
            Self::ObstacleAdded { obstacle_id } => format!("Obstacle {} added", obstacle_id),
            Self::ObstacleRemoved { obstacle_id } => format!("Obstacle {} removed", obstacle_id),
            Self::ObstaclesCleared { count } => format!("{} obstacles cleared", count),
            Self::PathPlanned {
                zone_id,
                pattern,
                waypoints,
                length_m,
            } => format!(
                "Zone {} planned with {} ({} waypoints, {:.1} m)",
                zone_id, pattern, waypoints, length_m
            ),
            Self::PlanningFailed { zone_id, reason } => {
                format!("Planning zone {} failed: {}", zone_id, reason)
            }
            Self::StateChanged { zone_id, state } => format!("Zone {} is {}", zone_id, state),
            Self::SegmentAdvanced {
                zone_id,
                cursor,
                progress,
            } => format!(
                "Zone {} at segment {} ({:.0}%)",
                zone_id,
                cursor,
                progress * 100.0
            ),
            Self::ZoneCompleted { zone_id } => format!("Zone {} completed", zone_id),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Zone CRUD events.
    Zone,
    /// Obstacle list changes.
    Obstacle,
    /// Plan completion or failure.
    Planning,
    /// Cursor movement and state transitions.
    Progress,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Zone => write!(f, "Zone"),
            Self::Obstacle => write!(f, "Obstacle"),
            Self::Planning => write!(f, "Planning"),
            Self::Progress => write!(f, "Progress"),
        }
    }
}
