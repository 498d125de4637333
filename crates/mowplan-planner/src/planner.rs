//! Coverage planner
//!
//! Owns the zone table, the global obstacle list and the planned path of
//! each zone, and tracks execution progress on the selected zone.
//!
//! Zone-table changes are saved through the [`ZoneStore`] before they are
//! applied, so a failed save leaves memory untouched. Planning snapshots
//! its inputs, computes without holding any lock and swaps the result in
//! under a short write lock.

use crate::avoidance::ObstacleAvoider;
use crate::cancel::CancelToken;
use crate::geometry::{point_in_polygon, polygon_area};
use crate::optimizer::PathOptimizer;
use crate::patterns::{self, PatternContext};
use mowplan_core::{
    Error, EventBus, MowingPattern, Obstacle, Path, PathSegment, PlannerEvent, PlanningError,
    PlanningResult, Point, Result, Zone, ZoneError, ZoneState,
};
use chrono::{DateTime, Local, TimeZone, Utc};
use mowplan_settings::{Config, ZoneStore};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A zone together with its planning state
#[derive(Debug, Clone)]
struct ZoneEntry {
    zone: Zone,
    state: ZoneState,
    result: Option<PlanningResult>,
}

impl ZoneEntry {
    fn new(zone: Zone) -> Self {
        Self {
            zone,
            state: ZoneState::Unplanned,
            result: None,
        }
    }
}

/// Zone repository and path planning state machine
pub struct CoveragePlanner {
    /// Planner configuration
    config: Config,
    /// Zones by id
    zones: RwLock<BTreeMap<String, ZoneEntry>>,
    /// Obstacles reported at runtime, shared by every zone
    obstacles: Mutex<Vec<Obstacle>>,
    /// Zone whose path is being executed
    current_zone: RwLock<Option<String>>,
    /// Persistence for zone definitions
    store: Box<dyn ZoneStore>,
    /// Optional event sink
    event_bus: Option<Arc<EventBus>>,
}

impl CoveragePlanner {
    /// Create a planner and load the zones held by `store`.
    ///
    /// Invalid stored zones are skipped with a warning; a later zone with a
    /// duplicate id replaces the earlier one.
    pub fn new(config: Config, store: Box<dyn ZoneStore>) -> Result<Self> {
        let mut zones = BTreeMap::new();
        for zone in store.load()? {
            if let Err(e) = zone.validate() {
                tracing::warn!("Skipping stored zone: {}", e);
                continue;
            }
            if zones.contains_key(&zone.id) {
                tracing::warn!("Stored zone {} appears more than once, keeping the last", zone.id);
            }
            zones.insert(zone.id.clone(), ZoneEntry::new(zone));
        }
        tracing::info!("Loaded {} zones from {}", zones.len(), store.describe());

        Ok(Self {
            config,
            zones: RwLock::new(zones),
            obstacles: Mutex::new(Vec::new()),
            current_zone: RwLock::new(None),
            store,
            event_bus: None,
        })
    }

    /// Publish planner events on `bus`
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn publish(&self, event: PlannerEvent) {
        if let Some(bus) = &self.event_bus {
            // nobody listening is fine
            let _ = bus.publish(event);
        }
    }

    fn publish_all(&self, events: Vec<PlannerEvent>) {
        for event in events {
            self.publish(event);
        }
    }

    /// Save `entries` with one change applied, before touching memory
    fn persist(&self, entries: &BTreeMap<String, ZoneEntry>, change: impl FnOnce(&mut Vec<Zone>)) -> Result<()> {
        let mut zones: Vec<Zone> = entries.values().map(|entry| entry.zone.clone()).collect();
        change(&mut zones);
        self.store.save(&zones).inspect_err(|e| {
            tracing::error!("Failed to save zones to {}: {}", self.store.describe(), e);
        })
    }

    // ---------------------------------------------------------------
    // Zones
    // ---------------------------------------------------------------

    pub fn add_zone(&self, zone: Zone) -> Result<()> {
        zone.validate()?;
        let mut zones = self.zones.write();
        if zones.contains_key(&zone.id) {
            return Err(ZoneError::DuplicateZone { id: zone.id }.into());
        }
        self.persist(&zones, |all| all.push(zone.clone()))?;
        let id = zone.id.clone();
        zones.insert(id.clone(), ZoneEntry::new(zone));
        drop(zones);

        tracing::info!("Added zone {}", id);
        self.publish(PlannerEvent::ZoneAdded { zone_id: id });
        Ok(())
    }

    /// Replace a zone's definition. Its planning state and path are kept;
    /// replan to pick up the change.
    pub fn update_zone(&self, zone: Zone) -> Result<()> {
        zone.validate()?;
        let mut zones = self.zones.write();
        if !zones.contains_key(&zone.id) {
            return Err(ZoneError::ZoneNotFound { id: zone.id }.into());
        }
        self.persist(&zones, |all| {
            if let Some(slot) = all.iter_mut().find(|z| z.id == zone.id) {
                *slot = zone.clone();
            }
        })?;
        let id = zone.id.clone();
        if let Some(entry) = zones.get_mut(&id) {
            entry.zone = zone;
        }
        drop(zones);

        tracing::info!("Updated zone {}", id);
        self.publish(PlannerEvent::ZoneUpdated { zone_id: id });
        Ok(())
    }

    /// Remove a zone and its path, returning the removed definition
    pub fn delete_zone(&self, id: &str) -> Result<Zone> {
        let mut zones = self.zones.write();
        if !zones.contains_key(id) {
            return Err(ZoneError::ZoneNotFound { id: id.to_string() }.into());
        }
        self.persist(&zones, |all| all.retain(|z| z.id != id))?;
        let removed = zones
            .remove(id)
            .map(|entry| entry.zone)
            .ok_or_else(|| ZoneError::ZoneNotFound { id: id.to_string() })?;
        drop(zones);

        {
            let mut current = self.current_zone.write();
            if current.as_deref() == Some(id) {
                *current = None;
            }
        }
        tracing::info!("Deleted zone {}", id);
        self.publish(PlannerEvent::ZoneDeleted {
            zone_id: id.to_string(),
        });
        Ok(removed)
    }

    pub fn get_zone(&self, id: &str) -> Result<Zone> {
        self.zones
            .read()
            .get(id)
            .map(|entry| entry.zone.clone())
            .ok_or_else(|| ZoneError::ZoneNotFound { id: id.to_string() }.into())
    }

    /// All zones, ordered by id
    pub fn list_zones(&self) -> Vec<Zone> {
        self.zones.read().values().map(|entry| entry.zone.clone()).collect()
    }

    /// Enabled zones, highest priority first
    pub fn zones_by_priority(&self) -> Vec<Zone> {
        let mut zones: Vec<Zone> = self
            .zones
            .read()
            .values()
            .filter(|entry| entry.zone.enabled)
            .map(|entry| entry.zone.clone())
            .collect();
        zones.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.id.cmp(&b.id)));
        zones
    }

    pub fn zone_state(&self, id: &str) -> Result<ZoneState> {
        self.zones
            .read()
            .get(id)
            .map(|entry| entry.state)
            .ok_or_else(|| ZoneError::ZoneNotFound { id: id.to_string() }.into())
    }

    /// Id of the first zone (by id) whose boundary contains `position`
    pub fn find_zone_at_position(&self, position: Point) -> Option<String> {
        self.zones
            .read()
            .values()
            .find(|entry| point_in_polygon(position, &entry.zone.perimeter))
            .map(|entry| entry.zone.id.clone())
    }

    /// Summed boundary area of the enabled zones, in square meters
    pub fn total_lawn_area(&self) -> f64 {
        self.zones
            .read()
            .values()
            .filter(|entry| entry.zone.enabled)
            .map(|entry| polygon_area(&entry.zone.perimeter))
            .sum()
    }

    /// Write every zone to `path` in the export envelope format
    pub fn export_zones(&self, path: &std::path::Path) -> Result<()> {
        let zones = self.list_zones();
        mowplan_settings::export_zones(&zones, path)?;
        tracing::info!("Exported {} zones to {}", zones.len(), path.display());
        Ok(())
    }

    /// Merge the zones in `path` into the table, replacing zones with the
    /// same id. Returns the number of zones imported.
    ///
    /// Nothing is applied unless every imported zone is valid and the
    /// merged table was saved.
    pub fn import_zones(&self, path: &std::path::Path) -> Result<usize> {
        let imported = mowplan_settings::import_zones(path)?;
        for zone in &imported {
            zone.validate()?;
        }

        let mut zones = self.zones.write();
        self.persist(&zones, |all| {
            for zone in &imported {
                match all.iter_mut().find(|z| z.id == zone.id) {
                    Some(slot) => *slot = zone.clone(),
                    None => all.push(zone.clone()),
                }
            }
        })?;

        let mut events = Vec::with_capacity(imported.len());
        let count = imported.len();
        for zone in imported {
            let zone_id = zone.id.clone();
            match zones.get_mut(&zone.id) {
                Some(entry) => {
                    entry.zone = zone;
                    events.push(PlannerEvent::ZoneUpdated { zone_id });
                }
                None => {
                    zones.insert(zone.id.clone(), ZoneEntry::new(zone));
                    events.push(PlannerEvent::ZoneAdded { zone_id });
                }
            }
        }
        drop(zones);

        tracing::info!("Imported {} zones from {}", count, path.display());
        self.publish_all(events);
        Ok(count)
    }

    // ---------------------------------------------------------------
    // Scheduling
    // ---------------------------------------------------------------

    /// Record that zone `id` was mowed to completion now and put it in the
    /// `Completed` state. The completion time is saved with the zone.
    pub fn mark_zone_completed(&self, id: &str) -> Result<DateTime<Utc>> {
        let now = Utc::now();
        let changed = {
            let mut zones = self.zones.write();
            self.stamp_completion(&mut zones, id, now)?;
            match zones.get_mut(id) {
                Some(entry) => {
                    let changed = entry.state != ZoneState::Completed;
                    entry.state = ZoneState::Completed;
                    changed
                }
                None => false,
            }
        };
        tracing::info!("Marked zone {} completed", id);
        if changed {
            self.publish(PlannerEvent::StateChanged {
                zone_id: id.to_string(),
                state: ZoneState::Completed,
            });
            self.publish(PlannerEvent::ZoneCompleted {
                zone_id: id.to_string(),
            });
        }
        Ok(now)
    }

    /// Save `at` as the zone's last completion, then apply it in memory
    fn stamp_completion(
        &self,
        zones: &mut BTreeMap<String, ZoneEntry>,
        id: &str,
        at: DateTime<Utc>,
    ) -> Result<()> {
        if !zones.contains_key(id) {
            return Err(ZoneError::ZoneNotFound { id: id.to_string() }.into());
        }
        self.persist(zones, |all| {
            if let Some(zone) = all.iter_mut().find(|z| z.id == id) {
                zone.completed_last = Some(at);
            }
        })?;
        if let Some(entry) = zones.get_mut(id) {
            entry.zone.completed_last = Some(at);
        }
        Ok(())
    }

    /// Zones due for mowing at `now`, ordered by id.
    ///
    /// A zone is due on a scheduled day once its start time has passed,
    /// until it has been completed that day.
    pub fn zones_due_for_mowing_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Vec<String> {
        self.zones
            .read()
            .values()
            .filter(|entry| entry.zone.is_due(now))
            .map(|entry| entry.zone.id.clone())
            .collect()
    }

    /// [`zones_due_for_mowing_at`](Self::zones_due_for_mowing_at) on the
    /// local clock
    pub fn zones_due_for_mowing(&self) -> Vec<String> {
        self.zones_due_for_mowing_at(&Local::now())
    }

    /// Zone to mow next at `now`.
    ///
    /// Among due zones the highest schedule priority wins, then the one
    /// completed longest ago. With nothing due, the zone whose next start
    /// is nearest is returned (higher priority first on the same day).
    pub fn next_scheduled_zone_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<String> {
        let zones = self.zones.read();
        let scheduled = zones
            .values()
            .map(|entry| &entry.zone)
            .filter(|zone| zone.is_scheduled());

        let due = scheduled
            .clone()
            .filter(|zone| zone.is_due(now))
            .min_by(|a, b| {
                schedule_priority(b)
                    .cmp(&schedule_priority(a))
                    .then_with(|| a.completed_last.cmp(&b.completed_last))
            });
        if let Some(zone) = due {
            return Some(zone.id.clone());
        }

        scheduled
            .filter_map(|zone| {
                zone.schedule
                    .as_ref()
                    .and_then(|schedule| schedule.days_until_next(now))
                    .map(|days| (days, zone))
            })
            .min_by(|(days_a, a), (days_b, b)| {
                days_a
                    .cmp(days_b)
                    .then_with(|| schedule_priority(b).cmp(&schedule_priority(a)))
            })
            .map(|(_, zone)| zone.id.clone())
    }

    /// [`next_scheduled_zone_at`](Self::next_scheduled_zone_at) on the
    /// local clock
    pub fn next_scheduled_zone(&self) -> Option<String> {
        self.next_scheduled_zone_at(&Local::now())
    }

    // ---------------------------------------------------------------
    // Obstacles
    // ---------------------------------------------------------------

    /// Add an obstacle, replacing any with the same id
    pub fn add_obstacle(&self, obstacle: Obstacle) {
        let id = obstacle.id.clone();
        {
            let mut obstacles = self.obstacles.lock();
            match obstacles.iter_mut().find(|o| o.id == obstacle.id) {
                Some(existing) => *existing = obstacle,
                None => obstacles.push(obstacle),
            }
        }
        tracing::debug!("Obstacle {} added", id);
        self.publish(PlannerEvent::ObstacleAdded { obstacle_id: id });
    }

    pub fn remove_obstacle(&self, id: &str) -> Result<Obstacle> {
        let removed = {
            let mut obstacles = self.obstacles.lock();
            let index = obstacles
                .iter()
                .position(|o| o.id == id)
                .ok_or_else(|| ZoneError::ObstacleNotFound { id: id.to_string() })?;
            obstacles.remove(index)
        };
        tracing::debug!("Obstacle {} removed", id);
        self.publish(PlannerEvent::ObstacleRemoved {
            obstacle_id: id.to_string(),
        });
        Ok(removed)
    }

    pub fn get_obstacle(&self, id: &str) -> Option<Obstacle> {
        self.obstacles.lock().iter().find(|o| o.id == id).cloned()
    }

    /// Remove every global obstacle, returning how many there were
    pub fn clear_obstacles(&self) -> usize {
        let count = std::mem::take(&mut *self.obstacles.lock()).len();
        tracing::debug!("Cleared {} obstacles", count);
        self.publish(PlannerEvent::ObstaclesCleared { count });
        count
    }

    /// Snapshot of the global obstacle list
    pub fn obstacles(&self) -> Vec<Obstacle> {
        self.obstacles.lock().clone()
    }

    // ---------------------------------------------------------------
    // Planning
    // ---------------------------------------------------------------

    pub fn plan_path_for_zone(&self, id: &str) -> Result<Path> {
        self.plan_path_for_zone_with(id, &CancelToken::new())
    }

    /// Plan a coverage path for zone `id` and make it the current path.
    ///
    /// A boundary with fewer than three points yields an empty path and
    /// leaves the zone's state alone. A cancelled or timed out plan returns
    /// the error and keeps the previous result.
    pub fn plan_path_for_zone_with(&self, id: &str, cancel: &CancelToken) -> Result<Path> {
        let zone = self.get_zone(id)?;
        if zone.perimeter.len() < 3 {
            let err = PlanningError::InvalidBoundary {
                zone_id: zone.id.clone(),
                points: zone.perimeter.len(),
            };
            tracing::error!("{}", err);
            self.publish(PlannerEvent::PlanningFailed {
                zone_id: zone.id.clone(),
                reason: err.to_string(),
            });
            return Ok(Path::new());
        }

        let timeout_ms = self.config.navigation.planning_timeout_ms;
        let cancel = if timeout_ms > 0 && !cancel.has_deadline() {
            cancel.with_deadline(Duration::from_millis(timeout_ms))
        } else {
            cancel.clone()
        };

        let started = Instant::now();
        match self.compute(&zone, &cancel) {
            Ok(result) => {
                let path = result.path.clone();
                self.install(result, started.elapsed())?;
                Ok(path)
            }
            Err(e) => {
                if e.is_cancelled() {
                    tracing::warn!("Planning for zone {} stopped: {}", zone.id, e);
                } else {
                    tracing::error!("Planning for zone {} failed: {}", zone.id, e);
                }
                self.publish(PlannerEvent::PlanningFailed {
                    zone_id: zone.id.clone(),
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Generate, avoid, optimize and re-check without touching planner state
    fn compute(&self, zone: &Zone, cancel: &CancelToken) -> Result<PlanningResult> {
        let navigation = &self.config.navigation;
        let patterns_cfg = &self.config.patterns;
        let mower_width = self.config.mower.cutting_width_m;

        let obstacles: Vec<Obstacle> = if zone.avoid_obstacles {
            let mut merged = self.obstacles();
            merged.extend(zone.obstacles.iter().cloned());
            merged
        } else {
            Vec::new()
        };
        let avoider = ObstacleAvoider::new(
            navigation.safety_margin_m,
            navigation.min_obstacle_confidence,
            navigation.avoidance_policy,
        )
        .with_transit_speed(patterns_cfg.transit_speed);
        let footprints = avoider.footprints(&obstacles);

        let seed = patterns_cfg.random_seed.unwrap_or_else(rand::random);
        let ctx = PatternContext::new(zone, &footprints, mower_width, patterns_cfg, cancel)
            .with_seed(seed);
        let generated = patterns::generate(zone.pattern, &ctx)?;
        let boundary = Some(zone.perimeter.as_slice());
        let avoided = avoider.avoid_footprints(&generated.path, &footprints, boundary, cancel)?;

        // spiral samples turn by about one step each, which smoothing must keep
        let mut collinearity = patterns_cfg.collinearity_tolerance_deg;
        if generated.pattern == MowingPattern::Spiral {
            collinearity = collinearity.min(patterns_cfg.spiral_step_degrees / 2.0);
        }
        let optimizer = PathOptimizer::new(mower_width, collinearity)
            .with_transit_speed(patterns_cfg.transit_speed);
        let optimized = optimizer.optimize(&avoided, navigation.dock_position);
        // dock legs and straightened corners are new; route them clear as well
        let path = avoider.avoid_footprints(&optimized, &footprints, boundary, cancel)?;
        cancel.check()?;

        let seed = (generated.pattern == MowingPattern::Random).then_some(seed);
        Ok(PlanningResult::new(zone.id.clone(), zone.pattern, generated.pattern, path).with_seed(seed))
    }

    /// Swap in a finished plan and select its zone
    fn install(&self, result: PlanningResult, elapsed: Duration) -> Result<()> {
        let zone_id = result.zone_id.clone();
        let event = PlannerEvent::PathPlanned {
            zone_id: zone_id.clone(),
            pattern: result.pattern,
            waypoints: result.path.len(),
            length_m: result.path.total_length(),
        };
        tracing::info!(
            "Planned zone {} with {} in {:.1} ms: {} waypoints, {:.1} m ({:.1} m mowing)",
            zone_id,
            result.pattern,
            elapsed.as_secs_f64() * 1000.0,
            result.path.len(),
            result.path.total_length(),
            result.path.mowing_length()
        );

        {
            let mut zones = self.zones.write();
            let entry = zones
                .get_mut(&zone_id)
                .ok_or_else(|| ZoneError::ZoneNotFound { id: zone_id.clone() })?;
            entry.result = Some(result);
            entry.state = ZoneState::Planned;
        }
        *self.current_zone.write() = Some(zone_id.clone());

        self.publish(event);
        self.publish(PlannerEvent::StateChanged {
            zone_id,
            state: ZoneState::Planned,
        });
        Ok(())
    }

    // ---------------------------------------------------------------
    // Progress
    // ---------------------------------------------------------------

    /// Make `id` the zone whose path is executed
    pub fn select_zone(&self, id: &str) -> Result<()> {
        if !self.zones.read().contains_key(id) {
            return Err(ZoneError::ZoneNotFound { id: id.to_string() }.into());
        }
        *self.current_zone.write() = Some(id.to_string());
        Ok(())
    }

    pub fn current_zone(&self) -> Option<String> {
        self.current_zone.read().clone()
    }

    fn current_id(&self) -> Result<String> {
        self.current_zone().ok_or_else(|| ZoneError::NoZoneSelected.into())
    }

    /// Planning result of the selected zone
    pub fn current_result(&self) -> Option<PlanningResult> {
        let id = self.current_zone()?;
        self.zones.read().get(&id)?.result.clone()
    }

    /// Current path of the selected zone
    pub fn current_path(&self) -> Option<Path> {
        self.current_result().map(|result| result.path)
    }

    /// Segment at the cursor, `None` once the path is exhausted
    pub fn get_next_segment(&self) -> Option<PathSegment> {
        let id = self.current_zone()?;
        self.zones.read().get(&id)?.result.as_ref()?.next_segment()
    }

    /// Move the cursor past the current segment.
    ///
    /// The first step puts the zone in progress; passing the last mowing
    /// segment completes it. Returns false when there is no path or the
    /// cursor is already at the end.
    pub fn advance_to_next_segment(&self) -> bool {
        let Ok(id) = self.current_id() else {
            return false;
        };
        let mut events = Vec::new();
        {
            let mut zones = self.zones.write();
            let Some(entry) = zones.get_mut(&id) else {
                return false;
            };
            let Some(result) = entry.result.as_mut() else {
                return false;
            };
            if !result.advance() {
                return false;
            }
            events.push(PlannerEvent::SegmentAdvanced {
                zone_id: id.clone(),
                cursor: result.cursor,
                progress: result.progress(),
            });

            let complete = result.is_complete();
            let mut newly_completed = false;
            if entry.state == ZoneState::Planned {
                entry.state = ZoneState::InProgress;
                events.push(PlannerEvent::StateChanged {
                    zone_id: id.clone(),
                    state: ZoneState::InProgress,
                });
            }
            if complete && entry.state != ZoneState::Completed {
                entry.state = ZoneState::Completed;
                events.push(PlannerEvent::StateChanged {
                    zone_id: id.clone(),
                    state: ZoneState::Completed,
                });
                events.push(PlannerEvent::ZoneCompleted {
                    zone_id: id.clone(),
                });
                tracing::info!("Zone {} completed", id);
                newly_completed = true;
            }
            if newly_completed {
                if let Err(e) = self.stamp_completion(&mut zones, &id, Utc::now()) {
                    tracing::error!("Zone {} completion time not saved: {}", id, e);
                }
            }
        }
        self.publish_all(events);
        true
    }

    /// Completed fraction of the selected zone's mowing segments
    pub fn get_mowing_progress(&self) -> f64 {
        self.current_result()
            .map_or(0.0, |result| result.progress())
    }

    /// Rewind the selected zone's path to its start. The zone goes back to
    /// `Planned`.
    pub fn reset_path(&self) -> Result<()> {
        let id = self.current_id()?;
        let changed = {
            let mut zones = self.zones.write();
            let entry = zones
                .get_mut(&id)
                .ok_or_else(|| ZoneError::ZoneNotFound { id: id.clone() })?;
            let Some(result) = entry.result.as_mut() else {
                return Err(Error::other(format!("zone {} has no planned path", id)));
            };
            result.reset();
            let changed = entry.state != ZoneState::Planned;
            entry.state = ZoneState::Planned;
            changed
        };
        if changed {
            self.publish(PlannerEvent::StateChanged {
                zone_id: id,
                state: ZoneState::Planned,
            });
        }
        Ok(())
    }
}

fn schedule_priority(zone: &Zone) -> i32 {
    zone.schedule.as_ref().map_or(0, |schedule| schedule.priority)
}

impl std::fmt::Debug for CoveragePlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoveragePlanner")
            .field("zones", &self.zones.read().len())
            .field("obstacles", &self.obstacles.lock().len())
            .field("current_zone", &*self.current_zone.read())
            .field("store", &self.store.describe())
            .finish()
    }
}
