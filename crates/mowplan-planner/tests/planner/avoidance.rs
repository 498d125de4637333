use mowplan_core::{Obstacle, Path, Point};
use mowplan_planner::geometry::{circle_interval, point_in_polygon, Region};
use mowplan_planner::{CancelToken, Footprint, ObstacleAvoider};
use mowplan_settings::AvoidancePolicy;

fn lawn() -> Vec<Point> {
    vec![
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(10.0, 10.0),
        Point::new(0.0, 10.0),
    ]
}

fn straight_run(points: &[(f64, f64)]) -> Path {
    let mut path = Path::new();
    let mut iter = points.iter();
    if let Some(&(x, y)) = iter.next() {
        path.move_to(Point::new(x, y), 1.0);
    }
    for &(x, y) in iter {
        path.mow_to(Point::new(x, y), 1.0);
    }
    path
}

fn avoid(policy: AvoidancePolicy, path: &Path, obstacles: &[Obstacle]) -> Path {
    let lawn = lawn();
    ObstacleAvoider::new(0.2, 0.5, policy)
        .avoid(path, obstacles, Some(lawn.as_slice()), &CancelToken::new())
        .unwrap()
}

#[test]
fn test_segment_inside_obstacle_is_removed() {
    let path = straight_run(&[(4.8, 5.0), (5.2, 5.0)]);
    let obstacles = vec![Obstacle::circle("rock", Point::new(5.0, 5.0), 1.0)];
    let out = avoid(AvoidancePolicy::Split, &path, &obstacles);
    assert_eq!(out.mowing_segment_count(), 0);
    assert!(out
        .points()
        .iter()
        .all(|p| p.distance_to(&Point::new(5.0, 5.0)) >= 1.2));
}

#[test]
fn test_split_keeps_clearance() {
    let center = Point::new(5.0, 5.0);
    let path = straight_run(&[(0.5, 5.0), (9.5, 5.0)]);
    let obstacles = vec![Obstacle::circle("tree", center, 1.0)];
    let out = avoid(AvoidancePolicy::Split, &path, &obstacles);

    for p in out.points() {
        assert!(p.distance_to(&center) >= 1.2, "{} too close", p);
        assert!(point_in_polygon(p, &lawn()));
    }
    for s in out.segments().filter(|s| s.mowing_active) {
        assert!(circle_interval(s.start, s.end, center, 1.2).is_none());
    }
    // both sides of the tree are still mowed
    assert_eq!(out.mowing_segment_count(), 2);
    assert!((out.mowing_length() - (9.0 - 2.4)).abs() < 0.01);
    // and the gap is bridged by a detour
    assert!(out.segments().filter(|s| !s.mowing_active).count() > 2);
}

#[test]
fn test_drop_discards_crossing_segments() {
    let path = straight_run(&[(0.5, 5.0), (3.0, 5.0), (7.0, 5.0), (9.5, 5.0)]);
    let obstacles = vec![Obstacle::circle("tree", Point::new(5.0, 5.0), 1.0)];
    let out = avoid(AvoidancePolicy::Drop, &path, &obstacles);
    assert_eq!(out.mowing_segment_count(), 2);
    assert!((out.mowing_length() - 5.0).abs() < 1e-9);
}

#[test]
fn test_polygon_obstacle_margin() {
    let bed = Obstacle::polygon(
        "bed",
        vec![
            Point::new(4.0, 4.0),
            Point::new(6.0, 4.0),
            Point::new(6.0, 6.0),
            Point::new(4.0, 6.0),
        ],
    )
    .with_margin(0.1);
    let footprint = Footprint::from_obstacle(&bed, 0.2).unwrap();
    let path = straight_run(&[(0.5, 5.0), (9.5, 5.0)]);
    let out = avoid(AvoidancePolicy::Split, &path, std::slice::from_ref(&bed));

    for p in out.points() {
        assert!(!footprint.contains(p), "{} inside the bed margin", p);
    }
    for s in out.segments().filter(|s| s.mowing_active) {
        assert!(footprint.intervals(s.start, s.end).is_empty());
    }
    assert!((out.mowing_length() - (9.0 - 2.6)).abs() < 0.01);
}

#[test]
fn test_dock_leg_is_routed_around_tree() {
    let center = Point::new(5.0, 5.0);
    let mut path = Path::new();
    path.move_to(Point::new(5.0, -2.0), 1.0);
    path.move_to(Point::new(5.0, 9.0), 1.0);
    path.mow_to(Point::new(9.0, 9.0), 1.0);
    let obstacles = vec![Obstacle::circle("tree", center, 1.0)];
    let out = avoid(AvoidancePolicy::Drop, &path, &obstacles);

    assert_eq!(out.first_position(), Some(Point::new(5.0, -2.0)));
    assert_eq!(out.mowing_segment_count(), 1);
    for s in out.segments() {
        assert!(
            circle_interval(s.start, s.end, center, 1.2 - 1e-6).is_none(),
            "{} -> {} crosses the tree",
            s.start,
            s.end
        );
    }
}

#[test]
fn test_unreachable_piece_is_skipped() {
    let strip = vec![
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(10.0, 1.0),
        Point::new(0.0, 1.0),
    ];
    let center = Point::new(5.0, 0.5);
    let path = straight_run(&[(0.5, 0.5), (9.5, 0.5)]);
    let obstacles = vec![Obstacle::circle("hedge", center, 0.5)];
    let out = ObstacleAvoider::new(0.2, 0.5, AvoidancePolicy::Split)
        .avoid(&path, &obstacles, Some(strip.as_slice()), &CancelToken::new())
        .unwrap();

    for s in out.segments() {
        assert!(circle_interval(s.start, s.end, center, 0.7 - 1e-6).is_none());
    }
    // only the piece before the hedge is reachable
    assert_eq!(out.mowing_segment_count(), 1);
    assert!((out.mowing_length() - 3.8).abs() < 0.01);
}

#[test]
fn test_unreliable_obstacles_are_ignored() {
    let path = straight_run(&[(0.5, 5.0), (9.5, 5.0)]);
    let obstacles = vec![Obstacle::circle("ghost", Point::new(5.0, 5.0), 1.0).with_confidence(0.2)];
    let out = avoid(AvoidancePolicy::Split, &path, &obstacles);
    assert_eq!(out, path);
}

#[test]
fn test_cancelled_avoidance() {
    let path = straight_run(&[(0.5, 5.0), (9.5, 5.0)]);
    let obstacles = vec![Obstacle::circle("tree", Point::new(5.0, 5.0), 1.0)];
    let cancel = CancelToken::new();
    cancel.cancel();
    let err = ObstacleAvoider::new(0.2, 0.5, AvoidancePolicy::Split)
        .avoid(&path, &obstacles, None, &cancel)
        .unwrap_err();
    assert!(err.is_cancelled());
}
