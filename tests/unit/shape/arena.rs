use super::*;
use crate::foundation::clock::ManualClock;
use crate::foundation::color::Color;
use crate::foundation::core::{Canvas, Point};

fn arena() -> (ShapeArena, Surface) {
    let surface = Surface::new(Canvas::new(320, 240), Color(0x1a1a2e));
    let clock = ManualClock::new(0.0).clock();
    (ShapeArena::new(&surface, &clock), surface)
}

fn spawn_at(arena: &mut ShapeArena, x: f64, y: f64) -> ShapeId {
    let id = arena.spawn(Geometry::circle(20.0));
    arena[id].set_position(Point::new(x, y));
    id
}

#[test]
fn spawn_mounts_and_remove_unmounts() {
    let (mut arena, surface) = arena();
    let a = spawn_at(&mut arena, 0.0, 0.0);
    let b = spawn_at(&mut arena, 10.0, 0.0);
    assert_eq!(surface.child_count(), 2);
    assert_eq!(arena.len(), 2);

    assert!(arena.remove(a));
    assert!(!arena.remove(a));
    assert!(!arena.contains(a));
    assert_eq!(surface.child_count(), 1);

    arena.destroy_all();
    assert!(arena.is_empty());
    assert!(!arena.contains(b));
    assert_eq!(surface.child_count(), 0);
}

#[test]
fn bound_line_tracks_shapes_on_render() {
    let (mut arena, _) = arena();
    let a = spawn_at(&mut arena, 0.0, 0.0);
    let b = spawn_at(&mut arena, 100.0, 0.0);
    let line = arena.spawn_line(1.5, a, b).unwrap();
    assert_eq!(
        arena[line].endpoints(),
        Some((Point::new(0.0, 0.0), Point::new(100.0, 0.0)))
    );

    arena[b].set_position(Point::new(100.0, 100.0));
    arena.render(line);
    assert_eq!(
        arena[line].endpoints(),
        Some((Point::new(0.0, 0.0), Point::new(100.0, 100.0)))
    );
    assert_eq!(
        arena[line].graphic().read(|g| g.origin()),
        Point::new(50.0, 50.0)
    );
}

#[test]
fn mutating_a_bound_line_uses_current_endpoints() {
    let (mut arena, _) = arena();
    let a = spawn_at(&mut arena, 0.0, 0.0);
    let b = spawn_at(&mut arena, 100.0, 0.0);
    let line = arena.spawn_line(1.5, a, b).unwrap();

    arena[b].set_position(Point::new(100.0, 100.0));
    arena[line].set_opacity(0.5);
    assert_eq!(
        arena[line].endpoints(),
        Some((Point::new(0.0, 0.0), Point::new(100.0, 100.0)))
    );
    assert_eq!(
        arena[line].graphic().read(|g| g.origin()),
        Point::new(50.0, 50.0)
    );

    arena[a].set_position(Point::new(20.0, 20.0));
    let [shape, _] = arena.pair_mut(line, b).unwrap();
    shape.set_fill(Color(0xff0000));
    assert_eq!(
        arena[line].graphic().read(|g| g.origin()),
        Point::new(60.0, 60.0)
    );
}

#[test]
fn line_keeps_last_endpoints_when_a_bound_shape_is_removed() {
    let (mut arena, _) = arena();
    let a = spawn_at(&mut arena, 0.0, 0.0);
    let b = spawn_at(&mut arena, 40.0, 30.0);
    let line = arena.spawn_line(1.0, a, b).unwrap();

    arena.remove(b);
    arena[a].set_position(Point::new(-10.0, -10.0));
    arena.render_all();
    assert_eq!(
        arena[line].endpoints(),
        Some((Point::new(0.0, 0.0), Point::new(40.0, 30.0)))
    );
}

#[test]
fn set_points_unbinds() {
    let (mut arena, _) = arena();
    let a = spawn_at(&mut arena, 0.0, 0.0);
    let b = spawn_at(&mut arena, 10.0, 0.0);
    let line = arena.spawn_line(1.0, a, b).unwrap();

    arena[line]
        .set_points(Point::new(1.0, 1.0), Point::new(2.0, 2.0))
        .unwrap();
    assert!(arena[line].line().unwrap().binding().is_none());

    arena[b].set_position(Point::new(200.0, 0.0));
    arena.render(line);
    assert_eq!(
        arena[line].endpoints(),
        Some((Point::new(1.0, 1.0), Point::new(2.0, 2.0)))
    );
}

#[test]
fn binding_rejects_foreign_ids_and_non_lines() {
    let (mut arena, _) = arena();
    let a = spawn_at(&mut arena, 0.0, 0.0);
    let b = spawn_at(&mut arena, 10.0, 0.0);
    let gone = spawn_at(&mut arena, 20.0, 0.0);
    arena.remove(gone);

    assert!(arena.spawn_line(1.0, a, gone).is_err());
    assert!(arena.bind_line(a, a, b).is_err());
}

#[test]
fn pairwise_queries() {
    let (mut arena, _) = arena();
    let a = spawn_at(&mut arena, 0.0, 0.0);
    let b = spawn_at(&mut arena, 30.0, 0.0);
    let c = spawn_at(&mut arena, 50.0, 0.0);

    assert!(arena.intersects(a, b));
    assert!(!arena.intersects(a, c));
    assert_eq!(arena.distance(a, c), Some(50.0));

    let [sa, sb] = arena.pair_mut(a, b).unwrap();
    std::mem::swap(&mut sa.velocity, &mut sb.velocity);
    assert!(arena.pair_mut(a, a).is_none());

    arena.remove(c);
    assert!(!arena.intersects(a, c));
    assert_eq!(arena.distance(a, c), None);
}
