//! Mowing zones and the coverage patterns they request.

use super::obstacle::{Obstacle, ObstacleType};
use super::point::{Point, Polygon};
use super::schedule::{lenient_timestamp, MowingSchedule};
use crate::error::ZoneError;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coverage strategy requested by a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MowingPattern {
    /// Straight boustrophedon swaths
    #[default]
    Parallel,
    /// Archimedean spiral from the centroid
    Spiral,
    /// Parallel lines across the short side
    Zigzag,
    /// Parallel passes at 0° and 90°
    Grid,
    /// Concentric edge loops, then an interior fill
    PerimeterFirst,
    /// Pick a pattern from the boundary shape
    Adaptive,
    /// Seeded random sampling with nearest-neighbour ordering
    Random,
    /// Truncated 0°/90° passes for very irregular shapes
    DivideAndConquer,
    /// User-defined generator
    Custom,
}

impl MowingPattern {
    pub const ALL: [MowingPattern; 9] = [
        Self::Parallel,
        Self::Spiral,
        Self::Zigzag,
        Self::Grid,
        Self::PerimeterFirst,
        Self::Adaptive,
        Self::Random,
        Self::DivideAndConquer,
        Self::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parallel => "parallel",
            Self::Spiral => "spiral",
            Self::Zigzag => "zigzag",
            Self::Grid => "grid",
            Self::PerimeterFirst => "perimeter_first",
            Self::Adaptive => "adaptive",
            Self::Random => "random",
            Self::DivideAndConquer => "divide_and_conquer",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for MowingPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MowingPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "parallel" | "parallel_lines" | "lines" => Ok(Self::Parallel),
            "spiral" => Ok(Self::Spiral),
            "zigzag" => Ok(Self::Zigzag),
            "grid" => Ok(Self::Grid),
            "perimeter_first" | "perimeter" => Ok(Self::PerimeterFirst),
            "adaptive" => Ok(Self::Adaptive),
            "random" => Ok(Self::Random),
            "divide_and_conquer" => Ok(Self::DivideAndConquer),
            "custom" => Ok(Self::Custom),
            _ => Err(format!("unknown mowing pattern '{}'", s)),
        }
    }
}

impl From<String> for MowingPattern {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown mowing pattern '{}', using parallel lines", value);
            Self::Parallel
        })
    }
}

impl From<MowingPattern> for String {
    fn from(pattern: MowingPattern) -> Self {
        pattern.as_str().to_string()
    }
}

/// Lifecycle of a zone's plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneState {
    #[default]
    Unplanned,
    Planned,
    InProgress,
    Completed,
}

impl fmt::Display for ZoneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unplanned => write!(f, "unplanned"),
            Self::Planned => write!(f, "planned"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

fn default_overlap() -> f64 {
    10.0
}

fn default_cutting_height() -> u32 {
    40
}

fn default_priority() -> i32 {
    1
}

fn default_true() -> bool {
    true
}

/// A lawn area with its own boundary and mowing preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ZoneRecord")]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub perimeter: Polygon,
    /// Zone-scoped obstacles, merged with the planner's global list.
    pub obstacles: Vec<Obstacle>,
    pub pattern: MowingPattern,
    pub direction_degrees: f64,
    pub overlap_percent: f64,
    pub cutting_height_mm: u32,
    pub priority: i32,
    pub avoid_obstacles: bool,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<MowingSchedule>,
    /// When the zone was last mowed to completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_last: Option<DateTime<Utc>>,
    pub custom_parameters: serde_json::Map<String, serde_json::Value>,
}

/// Stored form of a zone. `no_mow_areas` polygons become restricted
/// zone obstacles.
#[derive(Deserialize)]
struct ZoneRecord {
    id: String,
    name: String,
    #[serde(alias = "boundary")]
    perimeter: Polygon,
    #[serde(default)]
    obstacles: Vec<Obstacle>,
    #[serde(default)]
    no_mow_areas: Vec<Polygon>,
    #[serde(default)]
    pattern: MowingPattern,
    #[serde(default)]
    direction_degrees: f64,
    #[serde(default = "default_overlap")]
    overlap_percent: f64,
    #[serde(default = "default_cutting_height")]
    cutting_height_mm: u32,
    #[serde(default = "default_priority")]
    priority: i32,
    #[serde(default = "default_true")]
    avoid_obstacles: bool,
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default)]
    schedule: Option<MowingSchedule>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    completed_last: Option<DateTime<Utc>>,
    #[serde(default)]
    custom_parameters: serde_json::Map<String, serde_json::Value>,
}

impl From<ZoneRecord> for Zone {
    fn from(record: ZoneRecord) -> Self {
        let mut obstacles = record.obstacles;
        for (index, area) in record.no_mow_areas.into_iter().enumerate() {
            if area.len() < 3 {
                tracing::warn!(
                    "Zone {}: no-mow area {} has {} points, ignored",
                    record.id,
                    index,
                    area.len()
                );
                continue;
            }
            obstacles.push(
                Obstacle::polygon(format!("{}-no-mow-{}", record.id, index), area)
                    .with_type(ObstacleType::Restricted),
            );
        }
        Self {
            id: record.id,
            name: record.name,
            perimeter: record.perimeter,
            obstacles,
            pattern: record.pattern,
            direction_degrees: record.direction_degrees,
            overlap_percent: record.overlap_percent,
            cutting_height_mm: record.cutting_height_mm,
            priority: record.priority,
            avoid_obstacles: record.avoid_obstacles,
            enabled: record.enabled,
            schedule: record.schedule,
            completed_last: record.completed_last,
            custom_parameters: record.custom_parameters,
        }
    }
}

impl Zone {
    pub fn new(id: impl Into<String>, name: impl Into<String>, perimeter: Polygon) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            perimeter,
            obstacles: Vec::new(),
            pattern: MowingPattern::default(),
            direction_degrees: 0.0,
            overlap_percent: default_overlap(),
            cutting_height_mm: default_cutting_height(),
            priority: default_priority(),
            avoid_obstacles: true,
            enabled: true,
            schedule: None,
            completed_last: None,
            custom_parameters: serde_json::Map::new(),
        }
    }

    /// Axis-aligned rectangle from the origin, handy for defaults and tests
    pub fn rectangle(id: impl Into<String>, width: f64, height: f64) -> Self {
        let id = id.into();
        let name = format!("Zone {}", id);
        Self::new(
            id,
            name,
            vec![
                Point::new(0.0, 0.0),
                Point::new(width, 0.0),
                Point::new(width, height),
                Point::new(0.0, height),
            ],
        )
    }

    pub fn with_pattern(mut self, pattern: MowingPattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn with_direction(mut self, degrees: f64) -> Self {
        self.direction_degrees = degrees;
        self
    }

    pub fn with_overlap(mut self, percent: f64) -> Self {
        self.overlap_percent = percent;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_obstacle(mut self, obstacle: Obstacle) -> Self {
        self.obstacles.push(obstacle);
        self
    }

    pub fn with_schedule(mut self, schedule: MowingSchedule) -> Self {
        self.schedule = Some(schedule);
        self
    }

    /// Enabled, with an enabled schedule
    pub fn is_scheduled(&self) -> bool {
        self.enabled && self.schedule.as_ref().is_some_and(|s| s.enabled)
    }

    /// Scheduled for mowing at `now` and not yet completed that day
    pub fn is_due<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        self.enabled
            && self
                .schedule
                .as_ref()
                .is_some_and(|s| s.is_due(now, self.completed_last.as_ref()))
    }

    /// Distance between adjacent swaths for a given cutting width
    pub fn effective_spacing(&self, mower_width: f64) -> f64 {
        mower_width * (1.0 - self.overlap_percent / 100.0)
    }

    /// Check the fields the planner relies on.
    ///
    /// A boundary with fewer than three points is accepted here; planning
    /// such a zone yields an empty path.
    pub fn validate(&self) -> Result<(), ZoneError> {
        let invalid = |reason: String| ZoneError::InvalidZone {
            id: self.id.clone(),
            reason,
        };
        if self.id.trim().is_empty() {
            return Err(invalid("zone id must not be empty".to_string()));
        }
        if !self.overlap_percent.is_finite()
            || self.overlap_percent < 0.0
            || self.overlap_percent >= 100.0
        {
            return Err(invalid(format!(
                "overlap {}% must be in [0, 100)",
                self.overlap_percent
            )));
        }
        if !self.direction_degrees.is_finite() {
            return Err(invalid("direction must be finite".to_string()));
        }
        if self.perimeter.iter().any(|p| !p.is_finite()) {
            return Err(invalid("perimeter contains non-finite points".to_string()));
        }
        if let Some(day) = self
            .schedule
            .as_ref()
            .and_then(|s| s.days.iter().find(|&&day| day > 6))
        {
            return Err(invalid(format!("schedule day {} must be 0 (Monday) to 6", day)));
        }
        Ok(())
    }
}
