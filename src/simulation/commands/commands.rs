use crate::domain::handle::BodyHandle;
use crate::rigid_body::{Rot, Vec2};

use super::WorldCore;

pub(super) fn set_transform(world: &mut WorldCore, handle: BodyHandle, position: Vec2, angle: f32) -> bool {
    if !position.is_finite() || !angle.is_finite() {
        return false;
    }
    let Some(body) = world.rigid_bodies.body_mut(handle) else {
        return false;
    };
    body.position = position;
    body.rotation = Rot::from_angle(angle);
    true
}

pub(super) fn set_linear_velocity(world: &mut WorldCore, handle: BodyHandle, velocity: Vec2) -> bool {
    if !velocity.is_finite() {
        return false;
    }
    let Some(body) = world.rigid_bodies.body_mut(handle) else {
        return false;
    };
    if !body.is_static {
        body.linear_velocity = velocity;
    }
    true
}

pub(super) fn set_angular_velocity(world: &mut WorldCore, handle: BodyHandle, velocity: f32) -> bool {
    if !velocity.is_finite() {
        return false;
    }
    let Some(body) = world.rigid_bodies.body_mut(handle) else {
        return false;
    };
    if !body.is_static {
        body.angular_velocity = velocity;
    }
    true
}

/// Impulse applied at a world point
pub(super) fn apply_impulse(world: &mut WorldCore, handle: BodyHandle, impulse: Vec2, point: Vec2) -> bool {
    if !impulse.is_finite() || !point.is_finite() {
        return false;
    }
    let Some(body) = world.rigid_bodies.body_mut(handle) else {
        return false;
    };
    let r = point - body.position;
    body.apply_impulse(impulse, r);
    true
}

pub(super) fn clear(world: &mut WorldCore) {
    world.rigid_bodies.clear();
    world.frame = 0;
    world.accumulator = 0.0;
}
