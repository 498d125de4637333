//! Configuration for the coverage planner
//!
//! Configuration is organized into logical sections:
//! - Mower geometry (cutting width, turning radius)
//! - Navigation (safety margins, obstacle confidence, dock)
//! - Pattern tuning (perimeter passes, spiral sampling, random sampling,
//!   per-segment speeds)
//! - Storage (where zone definitions live)
//!
//! Supports JSON and TOML files. Every section falls back to its defaults
//! when omitted.

use crate::error::{SettingsError, SettingsResult};
use mowplan_core::Point;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What to do with path segments that cross an obstacle footprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvoidancePolicy {
    /// Discard the whole segment and bridge the gap with a transit
    Drop,
    /// Keep the parts of the segment outside the footprint
    #[default]
    Split,
}

impl std::fmt::Display for AvoidancePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Drop => write!(f, "drop"),
            Self::Split => write!(f, "split"),
        }
    }
}

/// Mower geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MowerSettings {
    /// Cutting width in meters
    pub cutting_width_m: f64,
}

impl Default for MowerSettings {
    fn default() -> Self {
        Self { cutting_width_m: 0.3 }
    }
}

/// Obstacle handling and docking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationSettings {
    /// Clearance added around every obstacle, in meters
    pub safety_margin_m: f64,
    /// Obstacles reported with lower confidence are ignored
    pub min_obstacle_confidence: f64,
    pub avoidance_policy: AvoidancePolicy,
    /// Where planned paths start and end, if anchored
    pub dock_position: Option<Point>,
    /// Upper bound for one planning call (0 disables the deadline)
    pub planning_timeout_ms: u64,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            safety_margin_m: 0.2,
            min_obstacle_confidence: 0.5,
            avoidance_policy: AvoidancePolicy::Split,
            dock_position: None,
            planning_timeout_ms: 0,
        }
    }
}

/// Pattern generator tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternSettings {
    /// Concentric edge loops for perimeter-first mowing
    pub perimeter_passes: u32,
    /// Traverse spirals from the centroid outward instead of inward
    pub reverse_spiral: bool,
    /// Angular sampling step for spirals, in degrees
    pub spiral_step_degrees: f64,
    /// Turns below this angle are smoothed away, in degrees. Spiral plans
    /// use at most half of `spiral_step_degrees`.
    pub collinearity_tolerance_deg: f64,
    /// Minimum distance between random-pattern samples, in meters
    pub random_walk_step_m: f64,
    /// Fixed seed for the random pattern; drawn per plan when unset
    pub random_seed: Option<u64>,
    pub random_min_points: usize,
    pub random_max_points: usize,
    /// Relative speed while cutting swaths
    pub mowing_speed: f64,
    /// Relative speed on perimeter loops
    pub edge_speed: f64,
    /// Relative speed with the blade off
    pub transit_speed: f64,
}

impl Default for PatternSettings {
    fn default() -> Self {
        Self {
            perimeter_passes: 2,
            reverse_spiral: false,
            spiral_step_degrees: 5.0,
            collinearity_tolerance_deg: 5.0,
            random_walk_step_m: 0.2,
            random_seed: None,
            random_min_points: 50,
            random_max_points: 5000,
            mowing_speed: 1.0,
            edge_speed: 0.8,
            transit_speed: 1.0,
        }
    }
}

/// Zone storage location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub data_dir: PathBuf,
    pub zone_file: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_dir()
                .map(|dir| dir.join("mowplan"))
                .unwrap_or_else(|| PathBuf::from(".")),
            zone_file: "zones.json".to_string(),
        }
    }
}

impl StorageSettings {
    pub fn zone_path(&self) -> PathBuf {
        self.data_dir.join(&self.zone_file)
    }
}

/// Complete planner configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mower: MowerSettings,
    pub navigation: NavigationSettings,
    pub patterns: PatternSettings,
    pub storage: StorageSettings,
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(SettingsError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform config file location (`<config dir>/mowplan/config.toml`)
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("mowplan").join("config.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no platform config directory".to_string())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `path` when it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| SettingsError::ConfigDirectory(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| {
            SettingsError::SaveError(format!("{}: {}", path.display(), e))
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let positive = |key: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(SettingsError::invalid(key, format!("{} must be > 0", value)))
            }
        };
        let non_negative = |key: &str, value: f64| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(SettingsError::invalid(key, format!("{} must be >= 0", value)))
            }
        };
        let fraction = |key: &str, value: f64| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(SettingsError::invalid(key, format!("{} must be in [0, 1]", value)))
            }
        };

        positive("mower.cutting_width_m", self.mower.cutting_width_m)?;

        non_negative("navigation.safety_margin_m", self.navigation.safety_margin_m)?;
        fraction(
            "navigation.min_obstacle_confidence",
            self.navigation.min_obstacle_confidence,
        )?;
        if let Some(dock) = self.navigation.dock_position {
            if !dock.is_finite() {
                return Err(SettingsError::invalid(
                    "navigation.dock_position",
                    "must be finite",
                ));
            }
        }

        let patterns = &self.patterns;
        if patterns.perimeter_passes > 50 {
            return Err(SettingsError::invalid(
                "patterns.perimeter_passes",
                format!("{} exceeds 50", patterns.perimeter_passes),
            ));
        }
        positive("patterns.spiral_step_degrees", patterns.spiral_step_degrees)?;
        if patterns.spiral_step_degrees > 90.0 {
            return Err(SettingsError::invalid(
                "patterns.spiral_step_degrees",
                "must be at most 90",
            ));
        }
        non_negative(
            "patterns.collinearity_tolerance_deg",
            patterns.collinearity_tolerance_deg,
        )?;
        positive("patterns.random_walk_step_m", patterns.random_walk_step_m)?;
        if patterns.random_max_points < patterns.random_min_points {
            return Err(SettingsError::invalid(
                "patterns.random_max_points",
                "must be >= random_min_points",
            ));
        }
        for (key, speed) in [
            ("patterns.mowing_speed", patterns.mowing_speed),
            ("patterns.edge_speed", patterns.edge_speed),
            ("patterns.transit_speed", patterns.transit_speed),
        ] {
            positive(key, speed)?;
            fraction(key, speed)?;
        }

        if self.storage.zone_file.trim().is_empty() {
            return Err(SettingsError::invalid(
                "storage.zone_file",
                "must not be empty",
            ));
        }

        Ok(())
    }
}
