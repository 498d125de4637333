//! Zone persistence
//!
//! The planner hands every zone-table change to a [`ZoneStore`] before
//! applying it. Two stores ship with the crate: a JSON file store and an
//! in-memory store.

use chrono::{DateTime, Utc};
use mowplan_core::{Result, StorageError, Zone};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Backing storage for zone definitions
pub trait ZoneStore: Send + Sync {
    /// Load every stored zone
    fn load(&self) -> Result<Vec<Zone>>;

    /// Replace the stored zones with `zones`
    fn save(&self, zones: &[Zone]) -> Result<()>;

    /// Human readable location, for logs
    fn describe(&self) -> String;
}

/// Export envelope written by [`export_zones`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneExport {
    pub zones: Vec<Zone>,
    pub exported_at: DateTime<Utc>,
}

/// Parse a zone document from a JSON string.
///
/// Accepts a bare array of zones or an object with a `zones` array (the
/// export envelope).
pub fn parse_zones(content: &str) -> Result<Vec<Zone>> {
    let format_error = |e: serde_json::Error| StorageError::Format {
        reason: e.to_string(),
    };
    let document: serde_json::Value = serde_json::from_str(content).map_err(format_error)?;
    let zones = match document {
        serde_json::Value::Object(mut envelope) => match envelope.remove("zones") {
            Some(zones) => zones,
            None => {
                return Err(StorageError::Format {
                    reason: "expected an array of zones or a `zones` field".to_string(),
                }
                .into())
            }
        },
        other => other,
    };
    Ok(serde_json::from_value(zones).map_err(format_error)?)
}

fn read_zone_file(path: &Path) -> Result<Vec<Zone>> {
    let content = std::fs::read_to_string(path).map_err(|e| StorageError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    parse_zones(&content)
}

fn write_atomically(path: &Path, content: &str) -> Result<()> {
    let write_error = |e: std::io::Error| StorageError::Write {
        path: path.display().to_string(),
        reason: e.to_string(),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, content).map_err(write_error)?;
    std::fs::rename(&tmp, path).map_err(write_error)?;
    Ok(())
}

/// Write `zones` with a timestamped envelope
pub fn export_zones(zones: &[Zone], path: &Path) -> Result<()> {
    let export = ZoneExport {
        zones: zones.to_vec(),
        exported_at: Utc::now(),
    };
    let content = serde_json::to_string_pretty(&export)?;
    write_atomically(path, &content)?;
    tracing::info!("Exported {} zones to {}", zones.len(), path.display());
    Ok(())
}

/// Read zones from an export envelope or a plain zone file
pub fn import_zones(path: &Path) -> Result<Vec<Zone>> {
    let zones = read_zone_file(path)?;
    tracing::info!("Read {} zones from {}", zones.len(), path.display());
    Ok(zones)
}

/// Zones stored as a pretty-printed JSON array
#[derive(Debug, Clone)]
pub struct JsonZoneStore {
    path: PathBuf,
}

impl JsonZoneStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ZoneStore for JsonZoneStore {
    fn load(&self) -> Result<Vec<Zone>> {
        if !self.path.exists() {
            tracing::debug!("Zone file {} does not exist yet", self.path.display());
            return Ok(Vec::new());
        }
        read_zone_file(&self.path)
    }

    fn save(&self, zones: &[Zone]) -> Result<()> {
        let content = serde_json::to_string_pretty(zones)?;
        write_atomically(&self.path, &content)?;
        tracing::debug!("Saved {} zones to {}", zones.len(), self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Zones kept in memory only
#[derive(Debug, Default)]
pub struct MemoryZoneStore {
    zones: Mutex<Vec<Zone>>,
    read_only: bool,
}

impl MemoryZoneStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zones(zones: Vec<Zone>) -> Self {
        Self {
            zones: Mutex::new(zones),
            read_only: false,
        }
    }

    /// A store whose saves always fail
    pub fn read_only(zones: Vec<Zone>) -> Self {
        Self {
            zones: Mutex::new(zones),
            read_only: true,
        }
    }

    pub fn snapshot(&self) -> Vec<Zone> {
        self.zones.lock().clone()
    }
}

impl ZoneStore for MemoryZoneStore {
    fn load(&self) -> Result<Vec<Zone>> {
        Ok(self.zones.lock().clone())
    }

    fn save(&self, zones: &[Zone]) -> Result<()> {
        if self.read_only {
            return Err(StorageError::Write {
                path: self.describe(),
                reason: "store is read-only".to_string(),
            }
            .into());
        }
        *self.zones.lock() = zones.to_vec();
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
