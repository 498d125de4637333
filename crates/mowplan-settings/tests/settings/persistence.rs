use mowplan_core::{MowingPattern, Zone};
use mowplan_settings::{export_zones, import_zones, parse_zones, JsonZoneStore, MemoryZoneStore, ZoneStore};

#[test]
fn test_json_store_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonZoneStore::new(dir.path().join("data").join("zones.json"));
    assert!(store.load().unwrap().is_empty());

    let zones = vec![
        Zone::rectangle("front", 10.0, 8.0),
        Zone::rectangle("back", 5.0, 5.0).with_pattern(MowingPattern::Grid),
    ];
    store.save(&zones).unwrap();
    assert_eq!(store.load().unwrap(), zones);
    assert!(!store.path().with_extension("json.tmp").exists());
}

#[test]
fn test_corrupt_store_is_a_storage_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("zones.json");
    std::fs::write(&path, "{ not json").unwrap();
    let err = JsonZoneStore::new(&path).load().unwrap_err();
    assert!(err.is_storage_error());
}

#[test]
fn test_parse_accepts_array_or_envelope() {
    let bare = r#"[{"id": "a", "name": "A", "perimeter": [[0,0],[1,0],[1,1]]}]"#;
    assert_eq!(parse_zones(bare).unwrap().len(), 1);

    let envelope = r#"{"zones": [{"id": "a", "name": "A", "perimeter": [[0,0],[1,0],[1,1]]}],
                       "exported_at": "2024-05-01T10:00:00Z"}"#;
    assert_eq!(parse_zones(envelope).unwrap()[0].id, "a");

    assert!(parse_zones(r#"{"areas": []}"#).is_err());
}

#[test]
fn test_export_then_import() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.json");
    let zones = vec![Zone::rectangle("front", 3.0, 2.0).with_priority(4)];
    export_zones(&zones, &path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("exported_at"));
    assert_eq!(import_zones(&path).unwrap(), zones);
}

#[test]
fn test_memory_stores() {
    let store = MemoryZoneStore::new();
    store.save(&[Zone::rectangle("a", 1.0, 1.0)]).unwrap();
    assert_eq!(store.snapshot().len(), 1);

    let locked = MemoryZoneStore::read_only(vec![Zone::rectangle("a", 1.0, 1.0)]);
    assert!(locked.save(&[]).unwrap_err().is_storage_error());
    assert_eq!(locked.load().unwrap().len(), 1);
}
