use std::collections::BTreeMap;

use crate::domain::error::{PhysicsError, PhysicsResult};
use crate::domain::handle::{BodyHandle, JointHandle};
use crate::rigid_body::{Body, BodyDescriptor, Vec2};
use crate::spatial::arena::Arena;
use crate::spatial::{Aabb, BodyStore, Bvh};
use crate::systems::collision::Manifold;
use crate::systems::joints::{Joint, JointDescriptor};
use crate::systems::raycast::{self, RayHit};
use crate::systems::solver::{Arbiter, ArbiterKey, Constraint, StepContext};

use super::collision::narrow_phase;

/// Counters from one solve, reported through perf stats
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SolveStats {
    pub contact_points: u32,
    pub skipped_constraints: u32,
}

/// Owns bodies, joints, the broad phase and the persistent contacts.
///
/// The step is split into phases so the caller can time each one; they must
/// run in the order listed in `step`.
#[derive(Clone, Debug, Default)]
pub struct RigidBodySystem {
    bodies: BodyStore,
    bvh: Bvh,
    joints: Arena<JointHandle, Joint>,
    arbiters: BTreeMap<ArbiterKey, Arbiter>,
}

impl RigidBodySystem {
    pub fn new() -> Self {
        Self::default()
    }

    // === Bodies ===

    pub fn create_body(&mut self, desc: &BodyDescriptor) -> PhysicsResult<BodyHandle> {
        desc.validate()?;
        let handle = self.bodies.create(desc);
        if let Some(body) = self.bodies.get(handle) {
            self.bvh.insert(handle, body.aabb());
        }
        Ok(handle)
    }

    /// Remove a body. Joints attached to it go inert and are dropped at the
    /// start of the next step.
    pub fn destroy_body(&mut self, handle: BodyHandle) -> bool {
        if !self.bodies.destroy(handle) {
            return false;
        }
        self.bvh.remove(handle);
        self.arbiters.retain(|&(a, b), _| a != handle && b != handle);
        true
    }

    pub fn is_alive(&self, handle: BodyHandle) -> bool {
        self.bodies.is_alive(handle)
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle)
    }

    /// Mutable access for between-step edits. Pose changes are picked up by
    /// the broad phase on the next step.
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle)
    }

    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &Body)> + '_ {
        self.bodies.iter()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    // === Joints ===

    pub fn create_joint(&mut self, desc: &JointDescriptor) -> PhysicsResult<JointHandle> {
        let (Some(a), Some(b)) = (self.bodies.get(desc.body_a), self.bodies.get(desc.body_b)) else {
            return Err(PhysicsError::InvalidJoint { reason: "joint references a dead body" });
        };
        let joint = Joint::from_descriptor(desc, a, b)?;
        Ok(self.joints.insert(joint))
    }

    pub fn destroy_joint(&mut self, handle: JointHandle) -> bool {
        self.joints.remove(handle).is_some()
    }

    pub fn joint(&self, handle: JointHandle) -> Option<&Joint> {
        self.joints.get(handle)
    }

    pub fn joint_mut(&mut self, handle: JointHandle) -> Option<&mut Joint> {
        self.joints.get_mut(handle)
    }

    pub fn joints(&self) -> impl Iterator<Item = (JointHandle, &Joint)> + '_ {
        self.joints.iter()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    // === Queries ===

    pub fn contacts(&self) -> impl Iterator<Item = &Manifold> + '_ {
        self.arbiters.values().map(|a| a.manifold())
    }

    pub fn contact_count(&self) -> usize {
        self.arbiters.values().map(|a| a.manifold().len()).sum()
    }

    pub fn raycast(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<RayHit> {
        raycast::raycast(&self.bodies, &self.bvh, origin, direction, max_distance)
    }

    /// Bodies whose exact bounds overlap `aabb`, in handle order
    pub fn query_aabb(&self, aabb: &Aabb) -> Vec<BodyHandle> {
        self.bvh
            .query(aabb)
            .into_iter()
            .filter(|&h| self.bodies.get(h).map_or(false, |b| b.aabb().overlaps(aabb)))
            .collect()
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
        self.bvh.clear();
        self.joints.clear();
        self.arbiters.clear();
    }

    // === Step phases ===

    /// Run every phase once with no timing.
    pub fn step(&mut self, ctx: &StepContext, gravity: Vec2, iterations: u32) -> SolveStats {
        self.prune_dead();
        let pairs = self.update_broad_phase();
        let manifolds = self.collide(&pairs, ctx.contact_margin);
        self.merge_contacts(manifolds, ctx.warm_starting);
        self.integrate_velocities(gravity, ctx.dt);
        let stats = self.solve(ctx, iterations);
        self.integrate_positions(ctx.dt);
        stats
    }

    /// Drop joints and contacts that reference destroyed bodies.
    ///
    /// Returns the number of joints removed.
    pub fn prune_dead(&mut self) -> usize {
        let bodies = &self.bodies;
        let dead: Vec<JointHandle> = self
            .joints
            .iter()
            .filter(|(_, j)| {
                let (a, b) = j.bodies();
                !bodies.is_alive(a) || !bodies.is_alive(b)
            })
            .map(|(h, _)| h)
            .collect();
        for &h in dead.iter() {
            self.joints.remove(h);
        }
        self.arbiters.retain(|&(a, b), _| bodies.is_alive(a) && bodies.is_alive(b));

        if !dead.is_empty() {
            console_log!("pruned {} joint(s) attached to destroyed bodies", dead.len());
        }
        dead.len()
    }

    /// Refit the tree with exact bounds and return candidate pairs.
    ///
    /// Pairs of two static bodies are dropped; nothing can move them.
    pub fn update_broad_phase(&mut self) -> Vec<(BodyHandle, BodyHandle)> {
        for (handle, body) in self.bodies.iter() {
            self.bvh.update(handle, body.aabb());
        }

        let bodies = &self.bodies;
        let mut pairs = self.bvh.query_pairs();
        pairs.retain(|&(a, b)| match (bodies.get(a), bodies.get(b)) {
            (Some(ba), Some(bb)) => !(ba.is_static && bb.is_static),
            _ => false,
        });
        pairs
    }

    pub fn collide(&self, pairs: &[(BodyHandle, BodyHandle)], margin: f32) -> Vec<Manifold> {
        narrow_phase(&self.bodies, pairs, margin)
    }

    /// Replace the contact set with this frame's manifolds.
    ///
    /// Returns how many points were warm started from last frame.
    pub fn merge_contacts(&mut self, manifolds: Vec<Manifold>, warm_starting: bool) -> usize {
        let mut previous = std::mem::take(&mut self.arbiters);
        let mut carried = 0;

        for manifold in manifolds {
            let key = (manifold.body_a, manifold.body_b);
            let arbiter = match previous.remove(&key) {
                Some(mut arbiter) => {
                    carried += arbiter.update(manifold, warm_starting);
                    arbiter
                }
                None => {
                    let (Some(a), Some(b)) = (self.bodies.get(key.0), self.bodies.get(key.1)) else {
                        continue;
                    };
                    Arbiter::new(manifold, a, b)
                }
            };
            self.arbiters.insert(key, arbiter);
        }
        carried
    }

    pub fn integrate_velocities(&mut self, gravity: Vec2, dt: f32) {
        for (_, body) in self.bodies.iter_mut() {
            if body.is_static {
                continue;
            }
            body.linear_velocity += gravity * dt;
        }
    }

    /// Pre-step, warm start and iterate. Joints go before contacts in every pass.
    pub fn solve(&mut self, ctx: &StepContext, iterations: u32) -> SolveStats {
        let mut stats = SolveStats::default();
        let bodies = &mut self.bodies;

        if !ctx.warm_starting {
            for (_, joint) in self.joints.iter_mut() {
                joint.reset_impulse();
            }
            for arbiter in self.arbiters.values_mut() {
                arbiter.reset_impulse();
            }
        }

        for (_, joint) in self.joints.iter_mut() {
            let (a, b) = joint.bodies();
            let Some((ba, bb)) = bodies.pair_mut(a, b) else {
                continue;
            };
            if !joint.pre_step(ctx, ba, bb) {
                stats.skipped_constraints += 1;
            }
        }
        for arbiter in self.arbiters.values_mut() {
            let (a, b) = arbiter.key();
            let Some((ba, bb)) = bodies.pair_mut(a, b) else {
                continue;
            };
            arbiter.pre_step(ctx, ba, bb);
            stats.skipped_constraints += arbiter.skipped();
            stats.contact_points += arbiter.manifold().len() as u32;
        }

        if ctx.warm_starting {
            for (_, joint) in self.joints.iter() {
                let (a, b) = joint.bodies();
                if let Some((ba, bb)) = bodies.pair_mut(a, b) {
                    joint.warm_start(ba, bb);
                }
            }
            for arbiter in self.arbiters.values() {
                let (a, b) = arbiter.key();
                if let Some((ba, bb)) = bodies.pair_mut(a, b) {
                    arbiter.warm_start(ba, bb);
                }
            }
        }

        for _ in 0..iterations {
            for (_, joint) in self.joints.iter_mut() {
                let (a, b) = joint.bodies();
                if let Some((ba, bb)) = bodies.pair_mut(a, b) {
                    joint.apply_impulse(ctx, ba, bb);
                }
            }
            for arbiter in self.arbiters.values_mut() {
                let (a, b) = arbiter.key();
                if let Some((ba, bb)) = bodies.pair_mut(a, b) {
                    arbiter.apply_impulse(ctx, ba, bb);
                }
            }
        }

        stats
    }

    pub fn integrate_positions(&mut self, dt: f32) {
        for (_, body) in self.bodies.iter_mut() {
            body.integrate_position(dt);
        }
    }

    /// Contact velocity error left by the last solve
    pub fn residual_velocity_error(&self) -> f32 {
        self.arbiters
            .values()
            .filter_map(|arbiter| {
                let (a, b) = arbiter.key();
                Some(arbiter.residual(self.bodies.get(a)?, self.bodies.get(b)?))
            })
            .sum()
    }
}
