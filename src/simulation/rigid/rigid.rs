use crate::domain::error::{PhysicsError, PhysicsResult};
use crate::domain::handle::{BodyHandle, JointHandle};
use crate::rigid_body::{BodyDescriptor, Vec2};
use crate::systems::joints::{Joint, JointDescriptor, Motor};

use super::WorldCore;

pub(super) fn create_body(world: &mut WorldCore, desc: &BodyDescriptor) -> PhysicsResult<BodyHandle> {
    world.rigid_bodies.create_body(desc)
}

pub(super) fn create_body_json(world: &mut WorldCore, json: &str) -> PhysicsResult<BodyHandle> {
    let desc = BodyDescriptor::from_json(json)?;
    world.rigid_bodies.create_body(&desc)
}

pub(super) fn destroy_body(world: &mut WorldCore, handle: BodyHandle) -> bool {
    world.rigid_bodies.destroy_body(handle)
}

pub(super) fn create_joint(world: &mut WorldCore, desc: &JointDescriptor) -> PhysicsResult<JointHandle> {
    world.rigid_bodies.create_joint(desc).map_err(|e| {
        console_warn!("joint rejected: {}", e);
        e
    })
}

/// Revolute joint pinned at a world point, anchors derived from current poses.
pub(super) fn create_revolute_at(
    world: &mut WorldCore,
    body_a: BodyHandle,
    body_b: BodyHandle,
    world_anchor: Vec2,
) -> PhysicsResult<JointHandle> {
    let (Some(a), Some(b)) = (world.rigid_bodies.body(body_a), world.rigid_bodies.body(body_b)) else {
        return Err(PhysicsError::InvalidJoint { reason: "joint references a dead body" });
    };
    let anchor_a = a.rotation.inv_rotate(world_anchor - a.position);
    let anchor_b = b.rotation.inv_rotate(world_anchor - b.position);
    create_joint(world, &JointDescriptor::revolute(body_a, body_b, anchor_a, anchor_b))
}

pub(super) fn destroy_joint(world: &mut WorldCore, handle: JointHandle) -> bool {
    world.rigid_bodies.destroy_joint(handle)
}

pub(super) fn set_joint_motor(world: &mut WorldCore, handle: JointHandle, motor: Option<Motor>) -> bool {
    if let Some(m) = motor {
        if !m.speed.is_finite() || !(m.max_torque >= 0.0 && m.max_torque.is_finite()) {
            return false;
        }
    }
    match world.rigid_bodies.joint_mut(handle) {
        Some(Joint::Revolute(joint)) => {
            joint.motor = motor;
            true
        }
        _ => false,
    }
}
