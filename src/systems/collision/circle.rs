//! Closed-form tests for pairs involving a circle.
//!
//! Shapes up to `margin` apart still produce a point, with the gap as a
//! negative penetration.

use crate::domain::handle::BodyHandle;
use crate::rigid_body::{Body, Vec2};

use super::manifold::{ContactPoint, FeatureId, Manifold};

const COINCIDENT_EPSILON: f32 = 1e-6;

fn single_point(
    handle_a: BodyHandle,
    handle_b: BodyHandle,
    normal: Vec2,
    position: Vec2,
    penetration: f32,
    region: u8,
    margin: f32,
) -> Manifold {
    let mut manifold = Manifold::new(handle_a, handle_b, normal);
    manifold.push(ContactPoint {
        position,
        penetration: penetration.max(-margin),
        feature: FeatureId::single(region),
        normal_impulse: 0.0,
        tangent_impulse: 0.0,
    });
    manifold
}

pub(super) fn collide_circles(
    handle_a: BodyHandle,
    a: &Body,
    radius_a: f32,
    handle_b: BodyHandle,
    b: &Body,
    radius_b: f32,
    margin: f32,
) -> Option<Manifold> {
    let d = b.position - a.position;
    let dist_sq = d.length_squared();
    let radii = radius_a + radius_b;
    let reach = radii + margin;
    if dist_sq > reach * reach {
        return None;
    }

    let dist = dist_sq.sqrt();
    // Concentric circles have no preferred direction; push B up
    let normal = if dist > COINCIDENT_EPSILON { d * (1.0 / dist) } else { Vec2::new(0.0, 1.0) };

    let surface_a = a.position + normal * radius_a;
    let surface_b = b.position - normal * radius_b;
    let position = (surface_a + surface_b) * 0.5;

    Some(single_point(handle_a, handle_b, normal, position, radii - dist, 0, margin))
}

/// Box A against circle B.
pub(super) fn collide_box_circle(
    handle_a: BodyHandle,
    a: &Body,
    half: Vec2,
    handle_b: BodyHandle,
    b: &Body,
    radius: f32,
    margin: f32,
) -> Option<Manifold> {
    let center = a.rotation.inv_rotate(b.position - a.position);
    let clamped = Vec2::new(center.x.clamp(-half.x, half.x), center.y.clamp(-half.y, half.y));

    let (local_normal, surface_local, penetration, sx, sy) = if clamped == center {
        // Center inside the box: leave through the nearest face
        let dx = half.x - center.x.abs();
        let dy = half.y - center.y.abs();
        if dx <= dy {
            let s = if center.x < 0.0 { -1.0 } else { 1.0 };
            (Vec2::new(s, 0.0), Vec2::new(s * half.x, center.y), dx + radius, s as i8, 0)
        } else {
            let s = if center.y < 0.0 { -1.0 } else { 1.0 };
            (Vec2::new(0.0, s), Vec2::new(center.x, s * half.y), dy + radius, 0, s as i8)
        }
    } else {
        let delta = center - clamped;
        let dist_sq = delta.length_squared();
        let reach = radius + margin;
        if dist_sq > reach * reach {
            return None;
        }
        let dist = dist_sq.sqrt();
        let sx = if clamped.x >= half.x { 1 } else if clamped.x <= -half.x { -1 } else { 0 };
        let sy = if clamped.y >= half.y { 1 } else if clamped.y <= -half.y { -1 } else { 0 };
        (delta * (1.0 / dist), clamped, radius - dist, sx, sy)
    };

    let normal = a.rotation.rotate(local_normal);
    let surface_a = a.world_point(surface_local);
    let surface_b = b.position - normal * radius;
    let position = (surface_a + surface_b) * 0.5;

    // Voronoi region of the box the center fell in, 0..=8
    let region = ((sx + 1) * 3 + (sy + 1)) as u8;

    Some(single_point(handle_a, handle_b, normal, position, penetration, region, margin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::collider::Collider;
    use crate::domain::handle::ArenaHandle;
    use crate::rigid_body::BodyDescriptor;

    fn body(collider: Collider, x: f32, y: f32) -> Body {
        Body::new(&BodyDescriptor::dynamic(collider, Vec2::new(x, y)))
    }

    fn handles() -> (BodyHandle, BodyHandle) {
        (BodyHandle::from_parts(0, 0), BodyHandle::from_parts(1, 0))
    }

    #[test]
    fn circles_report_depth_along_center_line() {
        let (ha, hb) = handles();
        let a = body(Collider::circle(1.0), 0.0, 0.0);
        let b = body(Collider::circle(0.5), 1.25, 0.0);
        let m = collide_circles(ha, &a, 1.0, hb, &b, 0.5, 0.0).expect("overlap");
        assert_eq!(m.len(), 1);
        assert!((m.normal.x - 1.0).abs() < 1e-6);
        assert!((m.points()[0].penetration - 0.25).abs() < 1e-6);
        assert!((m.points()[0].position.x - 0.875).abs() < 1e-6);
    }

    #[test]
    fn separated_circles_do_not_collide() {
        let (ha, hb) = handles();
        let a = body(Collider::circle(1.0), 0.0, 0.0);
        let b = body(Collider::circle(1.0), 2.5, 0.0);
        assert!(collide_circles(ha, &a, 1.0, hb, &b, 1.0, 0.0).is_none());
    }

    #[test]
    fn concentric_circles_get_finite_normal() {
        let (ha, hb) = handles();
        let a = body(Collider::circle(1.0), 0.0, 0.0);
        let b = body(Collider::circle(1.0), 0.0, 0.0);
        let m = collide_circles(ha, &a, 1.0, hb, &b, 1.0, 0.0).expect("overlap");
        assert!(m.normal.is_finite());
        assert!((m.points()[0].penetration - 2.0).abs() < 1e-6);
    }

    #[test]
    fn circle_resting_on_box_top() {
        let (ha, hb) = handles();
        let a = body(Collider::cuboid(2.0, 0.5), 0.0, 0.0);
        let b = body(Collider::circle(0.5), 0.3, 0.95);
        let m = collide_box_circle(ha, &a, Vec2::new(2.0, 0.5), hb, &b, 0.5, 0.0).expect("overlap");
        assert!((m.normal.y - 1.0).abs() < 1e-6);
        assert!((m.points()[0].penetration - 0.05).abs() < 1e-5);
    }

    #[test]
    fn circle_center_inside_box_exits_through_nearest_face() {
        let (ha, hb) = handles();
        let a = body(Collider::cuboid(2.0, 1.0), 0.0, 0.0);
        let b = body(Collider::circle(0.25), 1.8, 0.0);
        let m = collide_box_circle(ha, &a, Vec2::new(2.0, 1.0), hb, &b, 0.25, 0.0).expect("overlap");
        assert!((m.normal.x - 1.0).abs() < 1e-6);
        assert!((m.points()[0].penetration - 0.45).abs() < 1e-5);
    }

    #[test]
    fn circle_near_corner_misses() {
        let (ha, hb) = handles();
        let a = body(Collider::cuboid(1.0, 1.0), 0.0, 0.0);
        // Inside the AABB overlap but outside the rounded corner
        let b = body(Collider::circle(0.5), 1.4, 1.4);
        assert!(collide_box_circle(ha, &a, Vec2::new(1.0, 1.0), hb, &b, 0.5, 0.0).is_none());
    }

    #[test]
    fn gap_within_margin_is_kept_as_negative_depth() {
        let (ha, hb) = handles();
        let a = body(Collider::circle(1.0), 0.0, 0.0);
        let b = body(Collider::circle(1.0), 2.005, 0.0);
        assert!(collide_circles(ha, &a, 1.0, hb, &b, 1.0, 0.0).is_none());
        let m = collide_circles(ha, &a, 1.0, hb, &b, 1.0, 0.01).expect("within margin");
        assert!((m.points()[0].penetration + 0.005).abs() < 1e-5);

        let ground = body(Collider::cuboid(2.0, 0.5), 0.0, 0.0);
        let ball = body(Collider::circle(0.5), 0.0, 1.005);
        let m = collide_box_circle(ha, &ground, Vec2::new(2.0, 0.5), hb, &ball, 0.5, 0.01).expect("within margin");
        assert!((m.points()[0].penetration + 0.005).abs() < 1e-5);
        assert!(collide_box_circle(ha, &ground, Vec2::new(2.0, 0.5), hb, &ball, 0.5, 0.004).is_none());
    }
}
