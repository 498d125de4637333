use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use mowplan_core::{MowingSchedule, Zone, ZoneState};
use mowplan_planner::CoveragePlanner;
use mowplan_settings::{Config, JsonZoneStore, MemoryZoneStore, ZoneStore};

/// 2024-06-03 is a Monday
fn monday(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, hour, 0, 0).unwrap()
}

fn garden() -> CoveragePlanner {
    let mut paused = MowingSchedule::daily(NaiveTime::from_hms_opt(6, 0, 0).unwrap());
    paused.enabled = false;
    let mut disabled = Zone::rectangle("shed", 2.0, 2.0).with_schedule(MowingSchedule::default());
    disabled.enabled = false;

    let zones = vec![
        // Monday, Wednesday, Friday at 10:00
        Zone::rectangle("front", 6.0, 4.0).with_schedule(MowingSchedule::default()),
        Zone::rectangle("back", 8.0, 8.0)
            .with_schedule(MowingSchedule::daily(NaiveTime::from_hms_opt(8, 0, 0).unwrap()).with_priority(3)),
        Zone::rectangle("side", 2.0, 6.0).with_schedule(paused),
        Zone::rectangle("verge", 1.0, 9.0).with_schedule(MowingSchedule::default().with_days([1])),
        disabled,
        Zone::rectangle("meadow", 20.0, 20.0),
    ];
    CoveragePlanner::new(Config::default(), Box::new(MemoryZoneStore::with_zones(zones))).unwrap()
}

#[test]
fn test_zones_due_for_mowing() {
    let planner = garden();
    assert!(planner.zones_due_for_mowing_at(&monday(7)).is_empty());
    assert_eq!(planner.zones_due_for_mowing_at(&monday(9)), vec!["back"]);
    assert_eq!(planner.zones_due_for_mowing_at(&monday(12)), vec!["back", "front"]);
}

#[test]
fn test_next_scheduled_zone() {
    let planner = garden();
    // nothing due yet; back and front both start later today
    assert_eq!(planner.next_scheduled_zone_at(&monday(7)).as_deref(), Some("back"));
    assert_eq!(planner.next_scheduled_zone_at(&monday(12)).as_deref(), Some("back"));

    planner.mark_zone_completed("back").unwrap();
    assert_eq!(planner.zone_state("back").unwrap(), ZoneState::Completed);
    assert!(planner.get_zone("back").unwrap().completed_last.is_some());
    assert_eq!(planner.next_scheduled_zone_at(&monday(12)).as_deref(), Some("front"));
}

#[test]
fn test_next_zone_without_schedules() {
    let planner = CoveragePlanner::new(
        Config::default(),
        Box::new(MemoryZoneStore::with_zones(vec![Zone::rectangle("meadow", 5.0, 5.0)])),
    )
    .unwrap();
    assert!(planner.next_scheduled_zone_at(&monday(12)).is_none());
    assert!(planner.mark_zone_completed("missing").unwrap_err().is_not_found());
}

#[test]
fn test_finishing_a_path_records_completion() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("zones.json");
    let store = JsonZoneStore::new(&path);
    store.save(&[Zone::rectangle("front", 3.0, 3.0)]).unwrap();

    let planner = CoveragePlanner::new(Config::default(), Box::new(JsonZoneStore::new(&path))).unwrap();
    planner.plan_path_for_zone("front").unwrap();
    assert!(planner.get_zone("front").unwrap().completed_last.is_none());
    while planner.advance_to_next_segment() {}
    assert_eq!(planner.zone_state("front").unwrap(), ZoneState::Completed);

    let stamped = planner.get_zone("front").unwrap().completed_last;
    assert!(stamped.is_some());
    let reloaded = store.load().unwrap();
    assert_eq!(reloaded[0].completed_last, stamped);
}
