use patrol_core::{Obstacle, Rect, Vec2};
use proptest::prelude::*;

fn rect() -> impl Strategy<Value = Rect> {
    (-20.0f32..20.0, -20.0f32..20.0, 0.1f32..10.0, 0.1f32..10.0)
        .prop_map(|(x, z, w, h)| Rect::new(x, x + w, z, z + h))
}

proptest! {
    #[test]
    fn face_normal_is_unit(rect in rect(), u in 0.0f32..1.0, v in 0.0f32..1.0) {
        let p = Vec2::new(
            rect.min_x + (rect.max_x - rect.min_x) * u,
            rect.min_z + (rect.max_z - rect.min_z) * v,
        );
        let n = rect.face_normal(p);
        prop_assert!((n.length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn ray_from_inside_hits_at_zero(
        rect in rect(),
        u in 0.01f32..0.99,
        v in 0.01f32..0.99,
        angle in 0.0f32..6.28,
    ) {
        let origin = Vec2::new(
            rect.min_x + (rect.max_x - rect.min_x) * u,
            rect.min_z + (rect.max_z - rect.min_z) * v,
        );
        let dir = Vec2::Z.rotate_y(angle);
        prop_assert_eq!(rect.ray_entry(origin, dir, 1.0), Some(0.0));
    }

    #[test]
    fn ray_hit_point_lies_on_the_rectangle(rect in rect(), angle in 0.0f32..6.28) {
        let center = rect.center();
        let dir = Vec2::Z.rotate_y(angle);
        let origin = center - dir * 50.0;
        let t = rect.ray_entry(origin, dir, 100.0);
        prop_assert!(t.is_some());
        let hit = origin + dir * t.unwrap_or_default();
        prop_assert!(rect.expand(1e-2).contains(hit));
    }
}

#[test]
fn expanded_obstacle_grows_every_side() {
    let obstacle = Obstacle::new(4.0, -1.0, 8.0, 1.2);
    let rect = obstacle.expanded(0.25);
    assert_eq!(rect, Rect::new(-0.25, 8.25, -1.85, -0.15));
    assert!((obstacle.coarse_extent() - 4.0).abs() < 1e-6);
}

#[test]
fn invalid_obstacles_are_detected() {
    assert!(Obstacle::new(0.0, 0.0, 1.0, 1.0).is_valid());
    assert!(!Obstacle::new(f32::NAN, 0.0, 1.0, 1.0).is_valid());
    assert!(!Obstacle::new(0.0, 0.0, -1.0, 1.0).is_valid());
    assert!(!Obstacle::new(0.0, 0.0, 1.0, f32::INFINITY).is_valid());
}

#[test]
fn clamp_and_containment_agree() {
    let rect = Rect::new(-1.0, 1.0, -2.0, 2.0);
    let p = rect.clamp(Vec2::new(5.0, -5.0));
    assert_eq!(p, Vec2::new(1.0, -2.0));
    assert!(rect.contains(p));
    assert!(!rect.contains_strict(p));
}
