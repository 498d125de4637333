//! Detected obstacles the planner must steer around.

use super::point::{Point, Polygon};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Obstacle classification reported by the detection subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleType {
    /// Trees, beds, furniture
    Static,
    /// Pets, people, moving objects
    Dynamic,
    /// Toys, hoses, things that will be cleared
    Temporary,
    /// No-go areas
    Restricted,
    /// Not classified (also used for unrecognised tags)
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ObstacleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Static => write!(f, "static"),
            Self::Dynamic => write!(f, "dynamic"),
            Self::Temporary => write!(f, "temporary"),
            Self::Restricted => write!(f, "restricted"),
        }
    }
}

/// Physical outline of an obstacle, before any safety margin
#[derive(Debug, Clone, PartialEq)]
pub enum ObstacleShape {
    Circle { center: Point, radius: f64 },
    Polygon { vertices: Polygon },
}

/// An obstacle with its avoidance parameters.
///
/// `safety_margin` is added on top of the planner's global margin.
/// Obstacles whose `confidence` is below the configured minimum are ignored
/// during planning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ObstacleRecord", into = "ObstacleRecord")]
pub struct Obstacle {
    pub id: String,
    pub shape: ObstacleShape,
    pub safety_margin: f64,
    pub confidence: f64,
    pub obstacle_type: ObstacleType,
    pub last_seen: Option<DateTime<Utc>>,
    /// Velocity in m/s, informational for dynamic obstacles.
    pub velocity: Option<Point>,
}

impl Obstacle {
    /// Circular obstacle with full confidence and no extra margin
    pub fn circle(id: impl Into<String>, center: Point, radius: f64) -> Self {
        Self::with_shape(id, ObstacleShape::Circle { center, radius })
    }

    /// Polygonal obstacle with full confidence and no extra margin
    pub fn polygon(id: impl Into<String>, vertices: Polygon) -> Self {
        Self::with_shape(id, ObstacleShape::Polygon { vertices })
    }

    fn with_shape(id: impl Into<String>, shape: ObstacleShape) -> Self {
        Self {
            id: id.into(),
            shape,
            safety_margin: 0.0,
            confidence: 1.0,
            obstacle_type: ObstacleType::Static,
            last_seen: None,
            velocity: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.safety_margin = margin;
        self
    }

    pub fn with_type(mut self, obstacle_type: ObstacleType) -> Self {
        self.obstacle_type = obstacle_type;
        self
    }

    pub fn with_velocity(mut self, velocity: Point) -> Self {
        self.velocity = Some(velocity);
        self
    }

    /// Record that the obstacle was just observed
    pub fn touch(&mut self) {
        self.last_seen = Some(Utc::now());
    }

    /// Reference point: circle center or vertex average.
    pub fn center(&self) -> Point {
        match &self.shape {
            ObstacleShape::Circle { center, .. } => *center,
            ObstacleShape::Polygon { vertices } => vertex_mean(vertices),
        }
    }

    /// Radius of a circle around `center()` enclosing the physical shape.
    pub fn bounding_radius(&self) -> f64 {
        match &self.shape {
            ObstacleShape::Circle { radius, .. } => *radius,
            ObstacleShape::Polygon { vertices } => {
                let center = vertex_mean(vertices);
                vertices
                    .iter()
                    .map(|v| v.distance_to(&center))
                    .fold(0.0, f64::max)
            }
        }
    }

    pub fn is_reliable(&self, min_confidence: f64) -> bool {
        self.confidence >= min_confidence
    }
}

fn vertex_mean(vertices: &[Point]) -> Point {
    if vertices.is_empty() {
        return Point::ORIGIN;
    }
    let sum = vertices.iter().fold(Point::ORIGIN, |acc, p| acc + *p);
    sum * (1.0 / vertices.len() as f64)
}

fn default_confidence() -> f64 {
    1.0
}

fn is_zero(value: &f64) -> bool {
    *value == 0.0
}

/// Wire form: `{ id, position, radius, type, confidence }` plus optional
/// polygon vertices and bookkeeping fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ObstacleRecord {
    id: String,
    position: Point,
    #[serde(default)]
    radius: f64,
    #[serde(rename = "type", default)]
    obstacle_type: ObstacleType,
    #[serde(default = "default_confidence")]
    confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    polygon: Option<Polygon>,
    #[serde(default, skip_serializing_if = "is_zero")]
    safety_margin: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_seen: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    velocity: Option<Point>,
}

impl TryFrom<ObstacleRecord> for Obstacle {
    type Error = String;

    fn try_from(record: ObstacleRecord) -> Result<Self, Self::Error> {
        if !(0.0..=1.0).contains(&record.confidence) {
            return Err(format!(
                "obstacle {}: confidence {} outside 0..=1",
                record.id, record.confidence
            ));
        }
        if !record.safety_margin.is_finite() || record.safety_margin < 0.0 {
            return Err(format!(
                "obstacle {}: negative safety margin {}",
                record.id, record.safety_margin
            ));
        }
        let shape = match record.polygon {
            Some(vertices) if vertices.len() >= 3 => ObstacleShape::Polygon { vertices },
            _ => {
                if !record.radius.is_finite() || record.radius < 0.0 {
                    return Err(format!(
                        "obstacle {}: invalid radius {}",
                        record.id, record.radius
                    ));
                }
                ObstacleShape::Circle {
                    center: record.position,
                    radius: record.radius,
                }
            }
        };
        Ok(Self {
            id: record.id,
            shape,
            safety_margin: record.safety_margin,
            confidence: record.confidence,
            obstacle_type: record.obstacle_type,
            last_seen: record.last_seen,
            velocity: record.velocity,
        })
    }
}

impl From<Obstacle> for ObstacleRecord {
    fn from(obstacle: Obstacle) -> Self {
        let position = obstacle.center();
        let radius = obstacle.bounding_radius();
        let polygon = match obstacle.shape {
            ObstacleShape::Circle { .. } => None,
            ObstacleShape::Polygon { vertices } => Some(vertices),
        };
        Self {
            id: obstacle.id,
            position,
            radius,
            obstacle_type: obstacle.obstacle_type,
            confidence: obstacle.confidence,
            polygon,
            safety_margin: obstacle.safety_margin,
            last_seen: obstacle.last_seen,
            velocity: obstacle.velocity,
        }
    }
}
