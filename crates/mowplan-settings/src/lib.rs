//! Configuration and zone persistence for mowplan
//!
//! - [`Config`]: sectioned planner settings loaded from JSON or TOML
//! - [`ZoneStore`]: where zone definitions are kept between runs

pub mod config;
pub mod error;
pub mod persistence;

pub use config::{
    AvoidancePolicy, Config, MowerSettings, NavigationSettings, PatternSettings, StorageSettings,
};
pub use error::{SettingsError, SettingsResult};
pub use persistence::{
    export_zones, import_zones, parse_zones, JsonZoneStore, MemoryZoneStore, ZoneExport, ZoneStore,
};
