use mowplan_core::{MowingPattern, ObstacleShape, Path, PlanningResult, Point, Zone};

#[test]
fn test_zone_schema_defaults() {
    let json = r#"{
        "id": "front",
        "name": "Front lawn",
        "boundary": [[0, 0], [8, 0], [8, 5], [0, 5]],
        "pattern": "spiral"
    }"#;
    let zone: Zone = serde_json::from_str(json).unwrap();
    assert_eq!(zone.perimeter.len(), 4);
    assert_eq!(zone.pattern, MowingPattern::Spiral);
    assert_eq!(zone.overlap_percent, 10.0);
    assert_eq!(zone.cutting_height_mm, 40);
    assert_eq!(zone.priority, 1);
    assert!(zone.enabled && zone.avoid_obstacles);
    assert!(zone.obstacles.is_empty());
    assert!(zone.validate().is_ok());
}

#[test]
fn test_zone_roundtrip_uses_perimeter_key() {
    let zone = Zone::rectangle("back", 4.0, 3.0)
        .with_pattern(MowingPattern::PerimeterFirst)
        .with_obstacle(mowplan_core::Obstacle::circle("pond", Point::new(2.0, 1.5), 0.4));
    let value = serde_json::to_value(&zone).unwrap();
    assert!(value.get("perimeter").is_some());
    assert_eq!(value["pattern"], "perimeter_first");
    assert_eq!(value["obstacles"][0]["position"], serde_json::json!([2.0, 1.5]));

    let back: Zone = serde_json::from_value(value).unwrap();
    assert_eq!(back, zone);
}

#[test]
fn test_zone_obstacle_polygon() {
    let json = r#"{
        "id": "side",
        "name": "Side",
        "perimeter": ["0,0", "6,0", "6,6", "0,6"],
        "obstacles": [{
            "id": "bed",
            "position": [2, 2],
            "type": "garden_bed",
            "polygon": [[1, 1], [3, 1], [3, 3], [1, 3]],
            "safety_margin": 0.1
        }]
    }"#;
    let zone: Zone = serde_json::from_str(json).unwrap();
    let bed = &zone.obstacles[0];
    assert!(matches!(&bed.shape, ObstacleShape::Polygon { vertices } if vertices.len() == 4));
    assert_eq!(bed.safety_margin, 0.1);
    assert_eq!(bed.confidence, 1.0);
}

#[test]
fn test_invalid_zone_reasons() {
    let mut zone = Zone::rectangle("z", 5.0, 5.0);
    zone.id = " ".to_string();
    assert!(zone.validate().is_err());

    let zone = Zone::rectangle("z", 5.0, 5.0).with_overlap(-1.0);
    assert!(zone.validate().is_err());

    let zone = Zone::rectangle("z", 5.0, 5.0).with_direction(f64::NAN);
    assert!(zone.validate().is_err());

    // short boundaries are stored and planned as empty paths
    let zone = Zone::new("line", "Line", vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
    assert!(zone.validate().is_ok());
}

#[test]
fn test_effective_spacing() {
    let zone = Zone::rectangle("z", 5.0, 5.0);
    assert!((zone.effective_spacing(0.3) - 0.27).abs() < 1e-12);
    assert_eq!(zone.with_overlap(0.0).effective_spacing(0.3), 0.3);
}

#[test]
fn test_planning_result_serialization() {
    let mut path = Path::new();
    path.move_to(Point::new(0.0, 0.0), 1.0);
    path.mow_to(Point::new(3.0, 0.0), 0.8);

    let result = PlanningResult::new("z", MowingPattern::Adaptive, MowingPattern::Parallel, path);
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["requested_pattern"], "adaptive");
    assert_eq!(value["pattern"], "parallel");
    assert!(value.get("seed").is_none());
    assert!(value.get("completed_at").is_none());

    let back: PlanningResult = serde_json::from_value(value).unwrap();
    assert_eq!(back, result);

    let seeded = result.with_seed(Some(42));
    assert_eq!(serde_json::to_value(&seeded).unwrap()["seed"], 42);
}
