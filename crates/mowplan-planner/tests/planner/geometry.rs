use mowplan_core::Point;
use mowplan_planner::geometry::{
    clip_line_to_boundary, clip_swath, convex_hull, distance_to_polygon, inside_intervals,
    offset_polygon_inward, point_in_polygon, polygon_area, Bounds,
};
use proptest::prelude::*;

fn square(size: f64) -> Vec<Point> {
    vec![
        Point::new(0.0, 0.0),
        Point::new(size, 0.0),
        Point::new(size, size),
        Point::new(0.0, size),
    ]
}

fn u_shape() -> Vec<Point> {
    vec![
        Point::new(0.0, 0.0),
        Point::new(9.0, 0.0),
        Point::new(9.0, 6.0),
        Point::new(6.0, 6.0),
        Point::new(6.0, 2.0),
        Point::new(3.0, 2.0),
        Point::new(3.0, 6.0),
        Point::new(0.0, 6.0),
    ]
}

#[test]
fn test_unit_square_area() {
    assert_eq!(polygon_area(&square(1.0)), 1.0);
    assert_eq!(polygon_area(&square(1.0)[..2]), 0.0);
}

#[test]
fn test_point_in_polygon() {
    let poly = square(10.0);
    assert!(point_in_polygon(Point::new(5.0, 5.0), &poly));
    assert!(!point_in_polygon(Point::new(50.0, 5.0), &poly));
    assert!(!point_in_polygon(Point::new(-0.1, 5.0), &poly));
    assert!(!point_in_polygon(Point::new(5.0, 5.0), &poly[..2]));

    // edge points: whatever the answer, it never changes
    for p in [Point::new(0.0, 5.0), Point::new(10.0, 5.0), Point::new(5.0, 0.0)] {
        let first = point_in_polygon(p, &poly);
        for _ in 0..10 {
            assert_eq!(point_in_polygon(p, &poly), first);
        }
    }
}

#[test]
fn test_concave_intervals() {
    let intervals = inside_intervals(Point::new(-1.0, 4.0), Point::new(10.0, 4.0), &u_shape());
    assert_eq!(intervals.len(), 2);
    let pieces = clip_swath::<Vec<Point>>(Point::new(-1.0, 4.0), Point::new(10.0, 4.0), &u_shape(), &[]);
    assert_eq!(pieces.len(), 2);
    assert!(pieces[0].0.approx_eq(&Point::new(0.0, 4.0), 1e-9));
    assert!(pieces[0].1.approx_eq(&Point::new(3.0, 4.0), 1e-9));
    assert!(pieces[1].0.approx_eq(&Point::new(6.0, 4.0), 1e-9));
    assert!(pieces[1].1.approx_eq(&Point::new(9.0, 4.0), 1e-9));
}

#[test]
fn test_clip_line_cases() {
    let boundary = square(10.0);
    let obstacle = vec![
        Point::new(4.0, 4.0),
        Point::new(6.0, 4.0),
        Point::new(6.0, 6.0),
        Point::new(4.0, 6.0),
    ];

    // both outside, crossing
    let clipped = clip_line_to_boundary(Point::new(-5.0, 1.0), Point::new(15.0, 1.0), &boundary, &[]);
    assert_eq!(clipped.len(), 2);
    assert!(clipped[0].approx_eq(&Point::new(0.0, 1.0), 1e-9));
    assert!(clipped[1].approx_eq(&Point::new(10.0, 1.0), 1e-9));

    // both outside, missing
    assert!(clip_line_to_boundary(Point::new(-5.0, 20.0), Point::new(15.0, 20.0), &boundary, &[]).is_empty());

    // one end inside
    let clipped = clip_line_to_boundary(Point::new(5.0, 1.0), Point::new(15.0, 1.0), &boundary, &[]);
    assert_eq!(clipped.len(), 2);
    assert!(clipped[0].approx_eq(&Point::new(5.0, 1.0), 1e-9));
    assert!(clipped[1].approx_eq(&Point::new(10.0, 1.0), 1e-9));

    // both inside, split around the obstacle
    let clipped = clip_line_to_boundary(
        Point::new(1.0, 5.0),
        Point::new(9.0, 5.0),
        &boundary,
        std::slice::from_ref(&obstacle),
    );
    assert_eq!(clipped.len(), 4);
    assert!(clipped[1].approx_eq(&Point::new(4.0, 5.0), 1e-9));
    assert!(clipped[2].approx_eq(&Point::new(6.0, 5.0), 1e-9));

    // both ends in the same obstacle
    assert!(clip_line_to_boundary(
        Point::new(4.5, 5.0),
        Point::new(5.5, 5.0),
        &boundary,
        std::slice::from_ref(&obstacle),
    )
    .is_empty());
}

#[test]
fn test_offset_of_concave_shape() {
    let inner = offset_polygon_inward(&u_shape(), 0.5);
    assert_eq!(inner.len(), 8);
    assert!(polygon_area(&inner) < polygon_area(&u_shape()));
    assert!(inner.iter().all(|p| point_in_polygon(*p, &u_shape())));
    // the arms are 3 m wide
    assert!(offset_polygon_inward(&u_shape(), 1.6).is_empty());
}

#[test]
fn test_bounds() {
    let bounds = Bounds::from_points(&u_shape()).unwrap();
    assert_eq!(bounds.width(), 9.0);
    assert_eq!(bounds.height(), 6.0);
    assert!(Bounds::from_points(&[]).is_none());
}

/// Polygon through `points` ordered by angle around their mean, which is
/// simple for points in general position
fn star_polygon(points: &[Point]) -> Vec<Point> {
    let n = points.len() as f64;
    let mean = points.iter().fold(Point::ORIGIN, |acc, p| acc + *p) * (1.0 / n);
    let mut ordered = points.to_vec();
    ordered.sort_by(|a, b| {
        let angle_a = (a.y - mean.y).atan2(a.x - mean.x);
        let angle_b = (b.y - mean.y).atan2(b.x - mean.x);
        angle_a.partial_cmp(&angle_b).unwrap_or(std::cmp::Ordering::Equal)
    });
    ordered
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_hull_contains_every_point(
        coords in prop::collection::vec((-100.0f64..100.0, -100.0f64..100.0), 3..40)
    ) {
        let points: Vec<Point> = coords.into_iter().map(Point::from).collect();
        let hull = convex_hull(&points);
        for p in &points {
            prop_assert!(
                point_in_polygon(*p, &hull) || distance_to_polygon(*p, &hull) < 1e-6,
                "{} outside hull", p
            );
        }
    }

    #[test]
    fn prop_hull_area_bounds_polygon_area(
        coords in prop::collection::vec((-100.0f64..100.0, -100.0f64..100.0), 3..40)
    ) {
        let points: Vec<Point> = coords.into_iter().map(Point::from).collect();
        let polygon = star_polygon(&points);
        let hull = convex_hull(&points);
        prop_assert!(polygon_area(&hull) + 1e-6 >= polygon_area(&polygon));
    }
}
