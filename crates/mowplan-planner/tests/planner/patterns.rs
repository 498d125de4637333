use mowplan_core::{MowingPattern, Obstacle, Path, Point, Zone};
use mowplan_planner::geometry::{distance_to_polygon, point_in_polygon, Region};
use mowplan_planner::{classify, generate, inflate_obstacles, CancelToken, Footprint, PatternContext};
use mowplan_settings::PatternSettings;
use std::f64::consts::PI;

const WIDTH: f64 = 0.3;

fn run(zone: &Zone, footprints: &[Footprint], settings: &PatternSettings, seed: u64) -> (Path, MowingPattern) {
    let cancel = CancelToken::new();
    let ctx = PatternContext::new(zone, footprints, WIDTH, settings, &cancel).with_seed(seed);
    let generated = generate(zone.pattern, &ctx).unwrap();
    (generated.path, generated.pattern)
}

fn plan(zone: &Zone) -> (Path, MowingPattern) {
    run(zone, &[], &PatternSettings::default(), 1)
}

fn within(path: &Path, boundary: &[Point]) -> bool {
    path.points()
        .iter()
        .all(|p| point_in_polygon(*p, boundary) || distance_to_polygon(*p, boundary) < 1e-6)
}

fn circle_zone(radius: f64) -> Zone {
    let perimeter = (0..48)
        .map(|i| {
            let a = 2.0 * PI * i as f64 / 48.0;
            Point::new(10.0 + radius * a.cos(), 10.0 + radius * a.sin())
        })
        .collect();
    Zone::new("round", "Round bed", perimeter)
}

fn l_zone() -> Zone {
    Zone::new(
        "l",
        "L lawn",
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 3.0),
            Point::new(5.0, 3.0),
            Point::new(5.0, 8.0),
            Point::new(0.0, 8.0),
        ],
    )
}

#[test]
fn test_parallel_swath_count_and_spacing() {
    let zone = Zone::rectangle("sq", 10.0, 10.0);
    let (path, pattern) = plan(&zone);
    assert_eq!(pattern, MowingPattern::Parallel);

    let effective = zone.effective_spacing(WIDTH);
    let bound = (10f64.hypot(10.0) / effective).ceil() as usize;
    let swaths: Vec<_> = path.segments().filter(|s| s.mowing_active).collect();
    assert!(swaths.len() >= 38 && swaths.len() <= bound, "{} swaths", swaths.len());

    let mut rows: Vec<f64> = swaths.iter().map(|s| s.start.y).collect();
    rows.sort_by(|a, b| a.partial_cmp(b).unwrap());
    for pair in rows.windows(2) {
        assert!(pair[1] - pair[0] <= effective + 1e-9);
    }
    assert!(swaths.iter().all(|s| (s.start.y - s.end.y).abs() < 1e-9));
    assert!(within(&path, &zone.perimeter));
}

#[test]
fn test_parallel_is_boustrophedon() {
    let (path, _) = plan(&Zone::rectangle("sq", 4.0, 4.0));
    let swaths: Vec<_> = path.segments().filter(|s| s.mowing_active).collect();
    for pair in swaths.windows(2) {
        let first = pair[0].end.x - pair[0].start.x;
        let second = pair[1].end.x - pair[1].start.x;
        assert!(first * second < 0.0);
    }
    // swath ends are joined by blade-off moves
    let transits = path.segments().filter(|s| !s.mowing_active).count();
    assert_eq!(transits, swaths.len() - 1);
}

#[test]
fn test_parallel_follows_direction() {
    let zone = Zone::rectangle("sq", 10.0, 10.0).with_direction(30.0);
    let (path, _) = plan(&zone);
    let axis = Point::new(30f64.to_radians().cos(), 30f64.to_radians().sin());
    for s in path.segments().filter(|s| s.mowing_active) {
        assert!((s.end - s.start).cross(axis).abs() < 1e-9);
    }
    assert!(within(&path, &zone.perimeter));
}

#[test]
fn test_parallel_avoids_footprints() {
    let zone = Zone::rectangle("sq", 10.0, 10.0);
    let obstacles = vec![Obstacle::circle("tree", Point::new(5.0, 5.0), 1.0)];
    let footprints = inflate_obstacles(&obstacles, 0.2, 0.5);
    let (path, _) = run(&zone, &footprints, &PatternSettings::default(), 1);
    for s in path.segments().filter(|s| s.mowing_active) {
        assert!(footprints[0].intervals(s.start, s.end).is_empty());
    }
    for p in path.points() {
        assert!(p.distance_to(&Point::new(5.0, 5.0)) >= 1.2 - 1e-9);
    }
}

#[test]
fn test_zigzag_runs_across_the_long_side() {
    let tall = Zone::rectangle("tall", 4.0, 12.0).with_pattern(MowingPattern::Zigzag);
    let (path, _) = plan(&tall);
    assert!(path
        .segments()
        .filter(|s| s.mowing_active)
        .all(|s| (s.start.y - s.end.y).abs() < 1e-9));

    let wide = Zone::rectangle("wide", 12.0, 4.0).with_pattern(MowingPattern::Zigzag);
    let (path, _) = plan(&wide);
    assert!(path
        .segments()
        .filter(|s| s.mowing_active)
        .all(|s| (s.start.x - s.end.x).abs() < 1e-9));
}

#[test]
fn test_grid_has_both_directions() {
    let zone = Zone::rectangle("g", 5.0, 5.0).with_pattern(MowingPattern::Grid);
    let (path, pattern) = plan(&zone);
    assert_eq!(pattern, MowingPattern::Grid);
    let mowing: Vec<_> = path.segments().filter(|s| s.mowing_active).collect();
    let horizontal = mowing.iter().filter(|s| (s.start.y - s.end.y).abs() < 1e-9).count();
    let vertical = mowing.iter().filter(|s| (s.start.x - s.end.x).abs() < 1e-9).count();
    assert_eq!(horizontal, vertical);
    assert_eq!(horizontal + vertical, mowing.len());
}

#[test]
fn test_divide_and_conquer_halves() {
    let zone = Zone::rectangle("d", 5.0, 5.0).with_pattern(MowingPattern::DivideAndConquer);
    let (grid_path, _) = plan(&zone.clone().with_pattern(MowingPattern::Grid));
    let (path, _) = plan(&zone);
    assert!(path.len() < grid_path.len());
    let mowing: Vec<_> = path.segments().filter(|s| s.mowing_active).collect();
    assert!(mowing.iter().any(|s| (s.start.y - s.end.y).abs() < 1e-9));
    assert!(mowing.iter().any(|s| (s.start.x - s.end.x).abs() < 1e-9));
}

#[test]
fn test_spiral_stays_inside_and_runs_inward() {
    let zone = circle_zone(5.0).with_pattern(MowingPattern::Spiral);
    let center = Point::new(10.0, 10.0);
    let (path, _) = plan(&zone);
    assert!(path.mowing_segment_count() > 100);
    assert!(within(&path, &zone.perimeter));
    let first = path.first_position().unwrap();
    let last = path.last_position().unwrap();
    assert!(first.distance_to(&center) > last.distance_to(&center));

    let settings = PatternSettings {
        reverse_spiral: true,
        ..PatternSettings::default()
    };
    let (path, _) = run(&zone, &[], &settings, 1);
    let first = path.first_position().unwrap();
    let last = path.last_position().unwrap();
    assert!(first.distance_to(&center) < last.distance_to(&center));
}

#[test]
fn test_spiral_skips_footprints() {
    let zone = circle_zone(5.0).with_pattern(MowingPattern::Spiral);
    let obstacles = vec![Obstacle::circle("bird-bath", Point::new(12.0, 10.0), 0.5)];
    let footprints = inflate_obstacles(&obstacles, 0.2, 0.5);
    let (path, _) = run(&zone, &footprints, &PatternSettings::default(), 1);
    for p in path.points() {
        assert!(!footprints[0].contains(p), "{} inside footprint", p);
    }
}

#[test]
fn test_perimeter_first_loops_then_fills() {
    let zone = Zone::rectangle("p", 10.0, 10.0).with_pattern(MowingPattern::PerimeterFirst);
    let settings = PatternSettings::default();
    let (path, _) = plan(&zone);
    let mowing: Vec<_> = path.segments().filter(|s| s.mowing_active).collect();

    // two loops of four edges at edge speed come first
    assert!(mowing[..8].iter().all(|s| (s.speed - settings.edge_speed).abs() < 1e-9));
    let first = mowing[0];
    assert!((first.start.y - 0.135).abs() < 1e-9 || (first.start.x - 0.135).abs() < 1e-9);
    assert!(mowing[8..]
        .iter()
        .all(|s| (s.speed - settings.mowing_speed).abs() < 1e-9));
    assert!(mowing.len() > 8);
    assert!(within(&path, &zone.perimeter));
}

#[test]
fn test_perimeter_first_skips_degenerate_offsets() {
    let zone = Zone::rectangle("tiny", 0.5, 0.5).with_pattern(MowingPattern::PerimeterFirst);
    let (path, _) = plan(&zone);
    let mowing: Vec<_> = path.segments().filter(|s| s.mowing_active).collect();
    // only the first loop fits
    assert_eq!(mowing.len(), 4);
}

#[test]
fn test_adaptive_selection() {
    assert_eq!(classify(&Zone::rectangle("r", 10.0, 8.0).perimeter), MowingPattern::Parallel);
    assert_eq!(classify(&l_zone().perimeter), MowingPattern::PerimeterFirst);
    assert_eq!(classify(&circle_zone(5.0).perimeter), MowingPattern::Spiral);
    assert_eq!(classify(&Zone::rectangle("strip", 2.0, 12.0).perimeter), MowingPattern::Parallel);

    let zone = Zone::rectangle("r", 10.0, 8.0).with_pattern(MowingPattern::Adaptive);
    let (path, pattern) = plan(&zone);
    assert_eq!(pattern, MowingPattern::Parallel);
    assert!(path.mowing_segment_count() > 0);

    let (_, pattern) = plan(&l_zone().with_pattern(MowingPattern::Adaptive));
    assert_eq!(pattern, MowingPattern::PerimeterFirst);
}

#[test]
fn test_adaptive_lawn_with_narrow_arm_is_filled() {
    let perimeter = vec![
        Point::new(0.0, 0.0),
        Point::new(20.0, 0.0),
        Point::new(20.0, 20.0),
        Point::new(10.3, 20.0),
        Point::new(10.3, 30.0),
        Point::new(9.7, 30.0),
        Point::new(9.7, 20.0),
        Point::new(0.0, 20.0),
    ];
    assert_eq!(classify(&perimeter), MowingPattern::PerimeterFirst);

    let zone = Zone::new("arm", "Lawn with path", perimeter).with_pattern(MowingPattern::Adaptive);
    let (adaptive, pattern) = plan(&zone);
    assert_eq!(pattern, MowingPattern::PerimeterFirst);

    let (parallel, _) = plan(&zone.clone().with_pattern(MowingPattern::Parallel));
    assert!(
        adaptive.mowing_length() > 0.8 * parallel.mowing_length(),
        "{:.1} m vs {:.1} m",
        adaptive.mowing_length(),
        parallel.mowing_length()
    );
    assert!(within(&adaptive, &zone.perimeter));
}

#[test]
fn test_random_is_seeded() {
    let zone = Zone::rectangle("r", 6.0, 6.0).with_pattern(MowingPattern::Random);
    let settings = PatternSettings::default();
    let (a, pattern) = run(&zone, &[], &settings, 42);
    let (b, _) = run(&zone, &[], &settings, 42);
    let (c, _) = run(&zone, &[], &settings, 43);
    assert_eq!(pattern, MowingPattern::Random);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(within(&a, &zone.perimeter));

    let points = a.points();
    for (i, p) in points.iter().enumerate() {
        for q in &points[i + 1..] {
            assert!(p.distance_to(q) >= settings.random_walk_step_m);
        }
    }
}

#[test]
fn test_random_falls_back_when_crowded() {
    let zone = Zone::rectangle("tiny", 0.3, 0.3).with_pattern(MowingPattern::Random);
    let (path, pattern) = plan(&zone);
    assert_eq!(pattern, MowingPattern::Parallel);
    assert!(path.mowing_segment_count() > 0);
}
