//! Narrow phase - exact shape tests producing contact manifolds.
//!
//! `collide` dispatches on the collider pair. Every result is normalized so
//! the normal points from A to B. `collide` only reports overlap, so its
//! depths are non-negative; `collide_within` also keeps shapes up to
//! `margin` apart, reporting the gap as a negative penetration.

mod box_box;
mod circle;
mod manifold;

pub use manifold::{ContactPoint, FeatureId, Manifold, MAX_CONTACT_POINTS};

use crate::domain::collider::Collider;
use crate::domain::handle::BodyHandle;
use crate::rigid_body::Body;

/// Test two bodies and return their contacts, or `None` if they don't touch.
pub fn collide(handle_a: BodyHandle, a: &Body, handle_b: BodyHandle, b: &Body) -> Option<Manifold> {
    collide_within(handle_a, a, handle_b, b, 0.0)
}

/// Like `collide`, but bodies up to `margin` apart still get contact points.
pub fn collide_within(
    handle_a: BodyHandle,
    a: &Body,
    handle_b: BodyHandle,
    b: &Body,
    margin: f32,
) -> Option<Manifold> {
    match (&a.collider, &b.collider) {
        (Collider::Box(ba), Collider::Box(bb)) => {
            box_box::collide_boxes(handle_a, a, ba.half_extents, handle_b, b, bb.half_extents, margin)
        }
        (Collider::Box(ba), Collider::Circle(cb)) => {
            circle::collide_box_circle(handle_a, a, ba.half_extents, handle_b, b, cb.radius, margin)
        }
        (Collider::Circle(ca), Collider::Box(bb)) => {
            // Solve as box-vs-circle, then hand the roles back
            let mut m = circle::collide_box_circle(
                handle_b,
                b,
                bb.half_extents,
                handle_a,
                a,
                ca.radius,
                margin,
            )?;
            let mut flipped = Manifold::new(handle_a, handle_b, -m.normal);
            for p in m.points_mut() {
                p.feature.flip();
                flipped.push(*p);
            }
            Some(flipped)
        }
        (Collider::Circle(ca), Collider::Circle(cb)) => {
            circle::collide_circles(handle_a, a, ca.radius, handle_b, b, cb.radius, margin)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::handle::ArenaHandle;
    use crate::rigid_body::{BodyDescriptor, Vec2};

    fn handles() -> (BodyHandle, BodyHandle) {
        (BodyHandle::from_parts(0, 0), BodyHandle::from_parts(1, 0))
    }

    fn body_at(collider: Collider, x: f32, y: f32, angle: f32) -> Body {
        Body::new(&BodyDescriptor::dynamic(collider, Vec2::new(x, y)).with_angle(angle))
    }

    #[test]
    fn box_resting_on_ground_gets_two_points() {
        let (ha, hb) = handles();
        let ground = body_at(Collider::cuboid(10.0, 0.5), 0.0, 0.0, 0.0);
        let block = body_at(Collider::cuboid(0.5, 0.5), 0.0, 0.98, 0.0);

        let m = collide(ha, &ground, hb, &block).expect("boxes overlap");
        assert_eq!(m.len(), 2);
        assert!((m.normal.y - 1.0).abs() < 1e-6, "normal {:?}", m.normal);
        for p in m.points() {
            assert!((p.penetration - 0.02).abs() < 1e-4, "depth {}", p.penetration);
            assert!(p.penetration >= 0.0);
        }
        // Features differ so warm starting can tell the points apart
        assert_ne!(m.points()[0].feature.key(), m.points()[1].feature.key());
    }

    #[test]
    fn separated_boxes_do_not_collide() {
        let (ha, hb) = handles();
        let a = body_at(Collider::cuboid(0.5, 0.5), 0.0, 0.0, 0.0);
        let b = body_at(Collider::cuboid(0.5, 0.5), 1.2, 0.0, 0.0);
        assert!(collide(ha, &a, hb, &b).is_none());
    }

    #[test]
    fn rotated_box_corner_gives_single_point() {
        let (ha, hb) = handles();
        let ground = body_at(Collider::cuboid(5.0, 0.5), 0.0, 0.0, 0.0);
        // Diamond balanced on its corner, corner dipping 0.05 into the ground
        let h = 0.5 * std::f32::consts::SQRT_2;
        let block =
            body_at(Collider::cuboid(0.5, 0.5), 0.0, 0.5 + h - 0.05, std::f32::consts::FRAC_PI_4);

        let m = collide(ha, &ground, hb, &block).expect("corner overlap");
        assert_eq!(m.len(), 1);
        assert!((m.points()[0].penetration - 0.05).abs() < 1e-3);
        assert!(m.normal.y > 0.99);
    }

    #[test]
    fn exact_tie_prefers_body_a_face() {
        let (ha, hb) = handles();
        // Identical boxes overlapping straight up: both x and y faces of A and
        // B give the same separation on the y axis; A must provide the normal.
        let a = body_at(Collider::cuboid(0.5, 0.5), 0.0, 0.0, 0.0);
        let b = body_at(Collider::cuboid(0.5, 0.5), 0.0, 0.9, 0.0);
        let m1 = collide(ha, &a, hb, &b).expect("overlap");
        let m2 = collide(ha, &a, hb, &b).expect("overlap");
        assert_eq!(m1, m2);
        assert!((m1.normal.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn circle_box_normal_points_from_circle_to_box() {
        let (ha, hb) = handles();
        let ball = body_at(Collider::circle(0.5), 0.0, 0.95, 0.0);
        let ground = body_at(Collider::cuboid(2.0, 0.5), 0.0, 0.0, 0.0);

        let m = collide(ha, &ball, hb, &ground).expect("overlap");
        assert_eq!(m.body_a, ha);
        assert_eq!(m.body_b, hb);
        assert!((m.normal.y + 1.0).abs() < 1e-6);
        assert!((m.points()[0].penetration - 0.05).abs() < 1e-5);
    }

    #[test]
    fn boxes_within_margin_get_speculative_points() {
        let (ha, hb) = handles();
        let ground = body_at(Collider::cuboid(10.0, 0.5), 0.0, 0.0, 0.0);
        let block = body_at(Collider::cuboid(0.5, 0.5), 0.0, 1.005, 0.0);
        assert!(collide(ha, &ground, hb, &block).is_none());

        let m = collide_within(ha, &ground, hb, &block, 0.01).expect("within margin");
        assert_eq!(m.len(), 2);
        assert!((m.normal.y - 1.0).abs() < 1e-6);
        for p in m.points() {
            assert!((p.penetration + 0.005).abs() < 1e-4, "depth {}", p.penetration);
        }
        assert!(collide_within(ha, &ground, hb, &block, 0.004).is_none());
    }

    #[test]
    fn circle_box_margin_survives_role_swap() {
        let (ha, hb) = handles();
        let ball = body_at(Collider::circle(0.5), 0.0, 1.005, 0.0);
        let ground = body_at(Collider::cuboid(2.0, 0.5), 0.0, 0.0, 0.0);
        let m = collide_within(ha, &ball, hb, &ground, 0.01).expect("within margin");
        assert!((m.normal.y + 1.0).abs() < 1e-6);
        assert!((m.points()[0].penetration + 0.005).abs() < 1e-5);
    }

    #[test]
    fn touching_counts_as_contact() {
        let (ha, hb) = handles();
        let a = body_at(Collider::circle(0.5), 0.0, 0.0, 0.0);
        let b = body_at(Collider::circle(0.5), 1.0, 0.0, 0.0);
        let m = collide(ha, &a, hb, &b).expect("touching");
        assert_eq!(m.points()[0].penetration, 0.0);
    }
}
