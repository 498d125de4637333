//! Error handling for mowplan
//!
//! Provides error types for every layer of the planner:
//! - Planning errors (geometry and pattern generation)
//! - Zone errors (zone and obstacle bookkeeping)
//! - Storage errors (zone persistence)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Planning error type
///
/// Raised while turning a zone into a path. Most of these are reported and
/// degraded to an empty or fallback path rather than aborting the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanningError {
    /// Zone boundary cannot enclose an area
    #[error("Zone {zone_id} has an invalid boundary ({points} points, need at least 3)")]
    InvalidBoundary {
        /// The zone whose boundary was rejected.
        zone_id: String,
        /// Number of boundary points supplied.
        points: usize,
    },

    /// Inward offset collapsed or self-intersected
    #[error("Inward offset of {distance:.3} m is degenerate")]
    DegenerateOffset {
        /// The offset distance in meters.
        distance: f64,
    },

    /// No generator is registered for the pattern
    #[error("Unknown mowing pattern '{pattern}', falling back to parallel lines")]
    UnknownPattern {
        /// The requested pattern name.
        pattern: String,
    },

    /// Swath spacing is not positive
    #[error("Invalid swath spacing {spacing} (width {mower_width}, overlap {overlap_percent}%)")]
    InvalidSpacing {
        /// Effective spacing that was computed.
        spacing: f64,
        /// Mower cutting width in meters.
        mower_width: f64,
        /// Overlap percentage.
        overlap_percent: f64,
    },

    /// Plan was cancelled by the caller
    #[error("Planning cancelled")]
    Cancelled,

    /// Plan exceeded its deadline
    #[error("Planning timed out after {timeout_ms}ms")]
    TimedOut {
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },
}

/// Zone error type
///
/// Raised by zone and obstacle CRUD. These never mutate planner state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ZoneError {
    /// Zone id is unknown
    #[error("Zone not found: {id}")]
    ZoneNotFound {
        /// The zone id that was not found.
        id: String,
    },

    /// Obstacle id is unknown
    #[error("Obstacle not found: {id}")]
    ObstacleNotFound {
        /// The obstacle id that was not found.
        id: String,
    },

    /// Zone id is already taken
    #[error("Zone already exists: {id}")]
    DuplicateZone {
        /// The duplicated zone id.
        id: String,
    },

    /// Zone fails validation
    #[error("Invalid zone {id}: {reason}")]
    InvalidZone {
        /// The offending zone id.
        id: String,
        /// Why the zone was rejected.
        reason: String,
    },

    /// No zone is currently selected
    #[error("No zone selected")]
    NoZoneSelected,
}

/// Storage error type
///
/// Represents failures of the zone store collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    /// Zone file could not be read
    #[error("Failed to read {path}: {reason}")]
    Read {
        /// The path being read.
        path: String,
        /// The underlying failure.
        reason: String,
    },

    /// Zone file could not be written
    #[error("Failed to write {path}: {reason}")]
    Write {
        /// The path being written.
        path: String,
        /// The underlying failure.
        reason: String,
    },

    /// Zone document is malformed
    #[error("Malformed zone data: {reason}")]
    Format {
        /// The parse failure.
        reason: String,
    },
}

/// Main error type for mowplan
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Planning error
    #[error(transparent)]
    Planning(#[from] PlanningError),

    /// Zone error
    #[error(transparent)]
    Zone(#[from] ZoneError),

    /// Storage error
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a lookup failure for a zone or obstacle
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::Zone(ZoneError::ZoneNotFound { .. })
                | Error::Zone(ZoneError::ObstacleNotFound { .. })
        )
    }

    /// Check if the plan was aborted by its cancellation token
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Error::Planning(PlanningError::Cancelled)
                | Error::Planning(PlanningError::TimedOut { .. })
        )
    }

    /// Check if this is a storage error
    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::Storage(_) | Error::Io(_) | Error::Json(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
