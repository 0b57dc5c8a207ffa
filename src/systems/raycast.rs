//! Ray queries against body shapes.
//!
//! The broad phase supplies candidates whose fat box the ray crosses; each
//! candidate is then tested exactly. A ray starting inside a shape hits it
//! at distance 0 with the normal facing back along the ray.

use crate::domain::collider::Collider;
use crate::domain::handle::BodyHandle;
use crate::rigid_body::{Body, Vec2};
use crate::spatial::{BodyStore, Bvh};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub body: BodyHandle,
    pub point: Vec2,
    /// Surface normal at the hit, facing the ray origin
    pub normal: Vec2,
    pub distance: f32,
}

/// Closest hit along `origin + t * direction`, `t` in `[0, max_distance]`.
///
/// `direction` need not be normalized; a zero direction hits nothing. Ties
/// go to the lower handle.
pub fn raycast(
    bodies: &BodyStore,
    bvh: &Bvh,
    origin: Vec2,
    direction: Vec2,
    max_distance: f32,
) -> Option<RayHit> {
    if !origin.is_finite() || !(max_distance >= 0.0) {
        return None;
    }
    let dir = direction.try_normalize()?;

    let mut best: Option<RayHit> = None;
    for handle in bvh.ray_candidates(origin, dir, max_distance) {
        let Some(body) = bodies.get(handle) else {
            continue;
        };
        let Some((distance, normal)) = ray_shape(body, origin, dir, max_distance) else {
            continue;
        };
        // Candidates arrive in handle order, so strict < keeps the lower handle on ties
        if best.map_or(true, |b| distance < b.distance) {
            best = Some(RayHit { body: handle, point: origin + dir * distance, normal, distance });
        }
    }
    best
}

/// Exact test against one body. `dir` must be unit length.
pub fn ray_shape(body: &Body, origin: Vec2, dir: Vec2, max_distance: f32) -> Option<(f32, Vec2)> {
    match body.collider {
        Collider::Circle(c) => ray_circle(body.position, c.radius, origin, dir, max_distance),
        Collider::Box(b) => {
            // Work in the box frame, rotate the normal back out
            let local_origin = body.rotation.inv_rotate(origin - body.position);
            let local_dir = body.rotation.inv_rotate(dir);
            let (t, n) = ray_box_local(b.half_extents, local_origin, local_dir, max_distance)?;
            Some((t, body.rotation.rotate(n)))
        }
    }
}

fn ray_circle(
    center: Vec2,
    radius: f32,
    origin: Vec2,
    dir: Vec2,
    max_distance: f32,
) -> Option<(f32, Vec2)> {
    let m = origin - center;
    let c = m.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some((0.0, -dir));
    }
    let b = m.dot(dir);
    if b > 0.0 {
        return None;
    }
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    if t > max_distance {
        return None;
    }
    let point = origin + dir * t;
    let normal = (point - center).try_normalize().unwrap_or(-dir);
    Some((t.max(0.0), normal))
}

fn ray_box_local(h: Vec2, origin: Vec2, dir: Vec2, max_distance: f32) -> Option<(f32, Vec2)> {
    if origin.x.abs() <= h.x && origin.y.abs() <= h.y {
        return Some((0.0, -dir));
    }

    let mut t_min = 0.0f32;
    let mut t_max = max_distance;
    let mut normal = Vec2::ZERO;

    for axis in 0..2 {
        let (o, d, half) = if axis == 0 { (origin.x, dir.x, h.x) } else { (origin.y, dir.y, h.y) };
        if d.abs() <= f32::EPSILON {
            if o.abs() > half {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let mut t1 = (-half - o) * inv;
        let mut t2 = (half - o) * inv;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        // Entering through the face opposite the travel direction
        let face = -d.signum();
        if t1 > t_min {
            t_min = t1;
            normal = if axis == 0 { Vec2::new(face, 0.0) } else { Vec2::new(0.0, face) };
        }
        t_max = t_max.min(t2);
        if t_min > t_max {
            return None;
        }
    }

    if normal == Vec2::ZERO {
        return None;
    }
    Some((t_min, normal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rigid_body::BodyDescriptor;

    fn world(descs: &[BodyDescriptor]) -> (BodyStore, Bvh) {
        let mut store = BodyStore::new();
        let mut bvh = Bvh::default();
        for d in descs {
            let h = store.create(d);
            let aabb = store.get(h).map(|b| b.aabb()).expect("just created");
            bvh.insert(h, aabb);
        }
        (store, bvh)
    }

    #[test]
    fn hits_nearest_body() {
        let (store, bvh) = world(&[
            BodyDescriptor::fixed(Collider::circle(1.0), Vec2::new(10.0, 0.0)),
            BodyDescriptor::fixed(Collider::cuboid(0.5, 0.5), Vec2::new(5.0, 0.0)),
        ]);
        let hit = raycast(&store, &bvh, Vec2::zero(), Vec2::new(1.0, 0.0), 100.0).expect("hit");
        assert!((hit.distance - 4.5).abs() < 1e-5);
        assert!((hit.normal.x + 1.0).abs() < 1e-6);
        assert!((hit.point.x - 4.5).abs() < 1e-5);
    }

    #[test]
    fn circle_hit_point_and_normal() {
        let (store, bvh) =
            world(&[BodyDescriptor::fixed(Collider::circle(1.0), Vec2::new(0.0, 5.0))]);
        let hit = raycast(&store, &bvh, Vec2::zero(), Vec2::new(0.0, 2.0), 10.0).expect("hit");
        assert!((hit.distance - 4.0).abs() < 1e-5);
        assert!((hit.normal.y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn zero_direction_and_short_rays_miss() {
        let (store, bvh) =
            world(&[BodyDescriptor::fixed(Collider::circle(1.0), Vec2::new(5.0, 0.0))]);
        assert!(raycast(&store, &bvh, Vec2::zero(), Vec2::zero(), 100.0).is_none());
        assert!(raycast(&store, &bvh, Vec2::zero(), Vec2::new(1.0, 0.0), 3.0).is_none());
    }

    #[test]
    fn axis_parallel_ray_past_box_is_finite_miss() {
        let (store, bvh) =
            world(&[BodyDescriptor::fixed(Collider::cuboid(1.0, 1.0), Vec2::new(5.0, 0.0))]);
        assert!(raycast(&store, &bvh, Vec2::new(0.0, 2.0), Vec2::new(1.0, 0.0), 100.0).is_none());
        let hit = raycast(&store, &bvh, Vec2::new(5.0, 10.0), Vec2::new(0.0, -1.0), 100.0)
            .expect("straight down onto the box");
        assert!((hit.distance - 9.0).abs() < 1e-5);
        assert!((hit.normal.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rotated_box_normal_is_in_world_space() {
        let (store, bvh) = world(&[BodyDescriptor::fixed(Collider::cuboid(1.0, 1.0), Vec2::zero())
            .with_angle(std::f32::consts::FRAC_PI_4)]);
        let hit = raycast(&store, &bvh, Vec2::new(-5.0, -5.0), Vec2::new(1.0, 1.0), 100.0)
            .expect("hit");
        // Diagonal ray meets the middle of the lower-left edge
        let expected = 5.0 * std::f32::consts::SQRT_2 - 1.0;
        assert!((hit.distance - expected).abs() < 1e-4, "distance {}", hit.distance);
        let d = -std::f32::consts::FRAC_1_SQRT_2;
        assert!((hit.normal.x - d).abs() < 1e-4 && (hit.normal.y - d).abs() < 1e-4);
    }

    #[test]
    fn tie_goes_to_lower_handle() {
        let (store, bvh) = world(&[
            BodyDescriptor::fixed(Collider::circle(1.0), Vec2::new(5.0, 0.0)),
            BodyDescriptor::fixed(Collider::circle(1.0), Vec2::new(5.0, 0.0)),
        ]);
        let hit = raycast(&store, &bvh, Vec2::zero(), Vec2::new(1.0, 0.0), 100.0).expect("hit");
        let first = store.iter().next().map(|(h, _)| h).expect("body");
        assert_eq!(hit.body, first);
    }
}
