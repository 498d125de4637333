use mowplan_core::{EventBus, EventCategory, EventFilter, MowingPattern, PlannerEvent, ZoneState};
use std::sync::{Arc, Mutex};

#[test]
fn test_event_json_is_tagged() {
    let event = PlannerEvent::PathPlanned {
        zone_id: "front".to_string(),
        pattern: MowingPattern::Spiral,
        waypoints: 12,
        length_m: 40.5,
    };
    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["event"], "path_planned");
    assert_eq!(value["pattern"], "spiral");

    let back: PlannerEvent = serde_json::from_value(value).unwrap();
    assert_eq!(back, event);
}

#[test]
fn test_event_categories() {
    let changed = PlannerEvent::StateChanged {
        zone_id: "a".to_string(),
        state: ZoneState::InProgress,
    };
    assert_eq!(changed.category(), EventCategory::Progress);
    assert_eq!(changed.description(), "Zone a is in_progress");

    let cleared = PlannerEvent::ObstaclesCleared { count: 3 };
    assert_eq!(cleared.category(), EventCategory::Obstacle);
    assert!(!EventFilter::Zone("a".to_string()).matches(&cleared));
}

#[test]
fn test_zone_filter_delivers_in_order() {
    let bus = EventBus::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    bus.subscribe(EventFilter::Zone("back".to_string()), move |event| {
        sink.lock().unwrap().push(event.description());
    });

    for (zone, state) in [
        ("back", ZoneState::Planned),
        ("front", ZoneState::Planned),
        ("back", ZoneState::Completed),
    ] {
        bus.publish(PlannerEvent::StateChanged {
            zone_id: zone.to_string(),
            state,
        })
        .ok();
    }

    assert_eq!(
        *seen.lock().unwrap(),
        vec!["Zone back is planned", "Zone back is completed"]
    );
}
