use mowplan_core::Point;
use mowplan_settings::{AvoidancePolicy, Config, SettingsError};

#[test]
fn test_defaults_are_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.mower.cutting_width_m, 0.3);
    assert_eq!(config.navigation.safety_margin_m, 0.2);
    assert_eq!(config.navigation.min_obstacle_confidence, 0.5);
    assert_eq!(config.patterns.perimeter_passes, 2);
    assert_eq!(config.storage.zone_path().file_name().unwrap(), "zones.json");
}

#[test]
fn test_toml_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.mower.cutting_width_m = 0.42;
    config.navigation.avoidance_policy = AvoidancePolicy::Drop;
    config.navigation.dock_position = Some(Point::new(-1.0, 2.0));
    config.patterns.random_seed = Some(9);
    config.save_to_file(&path).unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_partial_json_uses_section_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{ "mower": { "cutting_width_m": 0.5, "min_turning_radius_m": 0.4 }, "patterns": { "reverse_spiral": true } }"#,
    )
    .unwrap();

    let config = Config::load_from_file(&path).unwrap();
    assert_eq!(config.mower.cutting_width_m, 0.5);
    assert!(config.patterns.reverse_spiral);
    assert_eq!(config.patterns.spiral_step_degrees, 5.0);
    assert_eq!(config.navigation, Config::default().navigation);
}

#[test]
fn test_invalid_values_rejected() {
    let mut config = Config::default();
    config.mower.cutting_width_m = 0.0;
    assert!(matches!(
        config.validate(),
        Err(SettingsError::InvalidSetting { key, .. }) if key == "mower.cutting_width_m"
    ));

    let mut config = Config::default();
    config.navigation.min_obstacle_confidence = 1.5;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.patterns.random_min_points = 10;
    config.patterns.random_max_points = 5;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.patterns.edge_speed = 1.2;
    assert!(config.validate().is_err());
}

#[test]
fn test_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    assert!(matches!(
        Config::default().save_to_file(&path),
        Err(SettingsError::UnsupportedFormat(ext)) if ext == "yaml"
    ));
}

#[test]
fn test_load_or_default_without_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_or_default(&dir.path().join("missing.toml")).unwrap();
    assert_eq!(config, Config::default());
}
