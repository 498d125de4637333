//! Planning results and progress bookkeeping.

use super::path::{Path, PathSegment};
use super::zone::MowingPattern;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A planned path plus the metadata needed to execute and resume it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningResult {
    pub zone_id: String,
    /// Pattern stored on the zone when planning started.
    pub requested_pattern: MowingPattern,
    /// Pattern that actually produced the path (after adaptive selection
    /// or fallbacks).
    pub pattern: MowingPattern,
    pub path: Path,
    pub planned_at: DateTime<Utc>,
    /// Index of the next segment to execute.
    pub cursor: usize,
    /// RNG seed, for plans that consumed randomness.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl PlanningResult {
    pub fn new(
        zone_id: impl Into<String>,
        requested_pattern: MowingPattern,
        pattern: MowingPattern,
        path: Path,
    ) -> Self {
        Self {
            zone_id: zone_id.into(),
            requested_pattern,
            pattern,
            path,
            planned_at: Utc::now(),
            cursor: 0,
            seed: None,
            completed_at: None,
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn next_segment(&self) -> Option<PathSegment> {
        self.path.segment(self.cursor)
    }

    /// Move the cursor past the current segment.
    ///
    /// Returns false when there is nothing left to advance over.
    pub fn advance(&mut self) -> bool {
        if self.cursor >= self.path.segment_count() {
            return false;
        }
        self.cursor += 1;
        if self.completed_at.is_none() && self.is_complete() {
            self.completed_at = Some(Utc::now());
        }
        true
    }

    /// Number of mowing segments behind the cursor
    pub fn completed_mowing_segments(&self) -> usize {
        self.path
            .segments()
            .take(self.cursor)
            .filter(|s| s.mowing_active)
            .count()
    }

    /// Fraction of mowing segments completed, in `0.0..=1.0`
    pub fn progress(&self) -> f64 {
        let total = self.path.mowing_segment_count();
        if total == 0 {
            return 0.0;
        }
        self.completed_mowing_segments() as f64 / total as f64
    }

    /// True once every mowing segment is behind the cursor
    pub fn is_complete(&self) -> bool {
        let total = self.path.mowing_segment_count();
        total > 0 && self.completed_mowing_segments() == total
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
        self.completed_at = None;
    }
}
