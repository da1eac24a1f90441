// tests/turtle_walk.rs
use data_walker::{Mapping, TURN_ANGLE, walk, walk_points};
use glam::Vec3;

fn close(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-5
}

#[test]
fn empty_stream_is_just_the_origin() {
    assert_eq!(walk_points(&[], &Mapping::IDENTITY, 1), vec![Vec3::ZERO]);
}

#[test]
fn rotations_add_no_points() {
    let path = walk(&[6, 7, 8, 9, 10, 11], &Mapping::IDENTITY, 1);
    assert_eq!(path.points, vec![Vec3::ZERO]);
}

#[test]
fn axis_translations_in_identity_frame() {
    // +X, +Y, +Z with no rotation in between.
    let points = walk_points(&[0, 2, 4], &Mapping::IDENTITY, 1);
    assert_eq!(
        points,
        vec![
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
        ]
    );
}

#[test]
fn walks_are_deterministic() {
    let symbols: Vec<u8> = (0..10_000u32).map(|i| ((i * 7 + i / 13) % 12) as u8).collect();
    for mapping in [Mapping::IDENTITY, Mapping::SPIRAL, Mapping::STOCK_OPT] {
        for stride in [1, 3, 17] {
            let a = walk(&symbols, &mapping, stride);
            let b = walk(&symbols, &mapping, stride);
            assert_eq!(a, b);
        }
    }
}

#[test]
fn orientation_stays_unit_length() {
    let symbols: Vec<u8> = (0..50_000u32).map(|i| (6 + (i * 5 + i / 7) % 6) as u8).collect();
    let path = walk(&symbols, &Mapping::IDENTITY, 1);
    assert!((path.orientation.length() - 1.0).abs() < 1e-6);
}

#[test]
fn translation_follows_the_local_frame() {
    // Turn +15 degrees about Y, then step along local +X.
    let points = walk_points(&[8, 0], &Mapping::IDENTITY, 1);
    assert_eq!(points.len(), 2);
    let expected = Vec3::new(TURN_ANGLE.cos(), 0.0, -TURN_ANGLE.sin());
    assert!(close(points[1], expected), "{:?}", points[1]);
}

#[test]
fn new_turns_compose_on_the_left() {
    // Rx then Ry: orientation = Ry * Rx, so local +X maps to Ry * X.
    // Composing on the right would give (c, s^2, -s c) instead.
    let points = walk_points(&[6, 8, 0], &Mapping::IDENTITY, 1);
    let (s, c) = TURN_ANGLE.sin_cos();
    assert!(close(points[1], Vec3::new(c, 0.0, -s)), "{:?}", points[1]);
    assert!(!close(points[1], Vec3::new(c, s * s, -s * c)));
}

#[test]
fn six_turns_make_a_right_angle() {
    let mut symbols = vec![10u8; 6]; // +Z six times = 90 degrees
    symbols.push(0);
    let points = walk_points(&symbols, &Mapping::IDENTITY, 1);
    assert!(close(points[1], Vec3::Y), "{:?}", points[1]);

    let mut symbols = vec![11u8; 6]; // -Z
    symbols.push(0);
    let points = walk_points(&symbols, &Mapping::IDENTITY, 1);
    assert!(close(points[1], Vec3::NEG_Y), "{:?}", points[1]);
}

#[test]
fn mapping_reinterprets_symbols() {
    // Spiral sends symbol 1 to action 2 (+Y).
    let points = walk_points(&[1], &Mapping::SPIRAL, 1);
    assert_eq!(points, vec![Vec3::ZERO, Vec3::Y]);
}

#[test]
fn stride_thins_the_walk() {
    let symbols = vec![0u8; 100];
    let points = walk_points(&symbols, &Mapping::IDENTITY, 10);
    assert_eq!(points.len(), 11);
    assert_eq!(points[10], Vec3::new(10.0, 0.0, 0.0));
}
