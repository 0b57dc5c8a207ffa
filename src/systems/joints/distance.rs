use crate::rigid_body::{Body, Vec2};
use crate::systems::solver::{inverse_mass, Constraint, StepContext};

use super::JointAnchors;

/// Anchors closer than this give no usable axis
const MIN_AXIS_LENGTH: f32 = 1e-6;

/// Rigid rod between two anchors.
#[derive(Clone, Debug)]
pub struct DistanceJoint {
    pub anchors: JointAnchors,
    pub rest_length: f32,

    // Solver cache, rebuilt every pre-step
    r1: Vec2,
    r2: Vec2,
    axis: Vec2,
    mass: f32,
    bias: f32,
    active: bool,
    /// Accumulated impulse along `axis`
    impulse: f32,
}

impl DistanceJoint {
    pub fn new(anchors: JointAnchors, rest_length: f32) -> Self {
        Self {
            anchors,
            rest_length,
            r1: Vec2::ZERO,
            r2: Vec2::ZERO,
            axis: Vec2::ZERO,
            mass: 0.0,
            bias: 0.0,
            active: false,
            impulse: 0.0,
        }
    }

    pub fn impulse(&self) -> f32 {
        self.impulse
    }
}

impl Constraint for DistanceJoint {
    fn pre_step(&mut self, ctx: &StepContext, a: &Body, b: &Body) -> bool {
        let (r1, r2) = self.anchors.offsets(a, b);
        let d = (b.position + r2) - (a.position + r1);
        let length = d.length();
        self.active = false;

        if length < MIN_AXIS_LENGTH || !length.is_finite() {
            return false;
        }
        let axis = d * (1.0 / length);

        let cr1 = r1.cross(axis);
        let cr2 = r2.cross(axis);
        let k = a.inv_mass + b.inv_mass + a.inv_inertia * cr1 * cr1 + b.inv_inertia * cr2 * cr2;
        let Some(mass) = inverse_mass(k) else {
            return false;
        };

        self.r1 = r1;
        self.r2 = r2;
        self.axis = axis;
        self.mass = mass;
        self.bias = ctx.position_bias(length - self.rest_length);
        self.active = true;
        true
    }

    fn warm_start(&self, a: &mut Body, b: &mut Body) {
        if !self.active {
            return;
        }
        let p = self.axis * self.impulse;
        a.apply_impulse(-p, self.r1);
        b.apply_impulse(p, self.r2);
    }

    fn apply_impulse(&mut self, _ctx: &StepContext, a: &mut Body, b: &mut Body) {
        if !self.active {
            return;
        }
        let dv = b.velocity_at(self.r2) - a.velocity_at(self.r1);
        let cdot = dv.dot(self.axis);
        let impulse = -self.mass * (cdot + self.bias);
        self.impulse += impulse;

        let p = self.axis * impulse;
        a.apply_impulse(-p, self.r1);
        b.apply_impulse(p, self.r2);
    }

    fn reset_impulse(&mut self) {
        self.impulse = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::collider::Collider;
    use crate::domain::config::SimulationConfig;
    use crate::domain::handle::{ArenaHandle, BodyHandle};
    use crate::rigid_body::BodyDescriptor;

    fn anchors() -> JointAnchors {
        JointAnchors {
            body_a: BodyHandle::from_parts(0, 0),
            body_b: BodyHandle::from_parts(1, 0),
            local_anchor_a: Vec2::zero(),
            local_anchor_b: Vec2::zero(),
        }
    }

    #[test]
    fn coincident_anchors_are_skipped_without_nan() {
        let mut a = Body::new(&BodyDescriptor::fixed(Collider::circle(0.5), Vec2::zero()));
        let mut b = Body::new(&BodyDescriptor::dynamic(Collider::circle(0.5), Vec2::zero()));
        let mut joint = DistanceJoint::new(anchors(), 1.0);
        let ctx = StepContext::new(1.0 / 60.0, &SimulationConfig::default());

        assert!(!joint.pre_step(&ctx, &a, &b));
        joint.warm_start(&mut a, &mut b);
        joint.apply_impulse(&ctx, &mut a, &mut b);
        assert!(b.linear_velocity.is_finite());
        assert!(joint.impulse().is_finite());
    }

    #[test]
    fn removes_separating_velocity_along_axis() {
        let mut a = Body::new(&BodyDescriptor::fixed(Collider::circle(0.5), Vec2::zero()));
        let mut b = Body::new(
            &BodyDescriptor::dynamic(Collider::circle(0.5), Vec2::new(2.0, 0.0))
                .with_velocity(Vec2::new(3.0, 1.0), 0.0),
        );
        let mut joint = DistanceJoint::new(anchors(), 2.0);
        let ctx = StepContext::new(1.0 / 60.0, &SimulationConfig::default());

        assert!(joint.pre_step(&ctx, &a, &b));
        joint.apply_impulse(&ctx, &mut a, &mut b);
        assert!(b.linear_velocity.x.abs() < 1e-5);
        // Perpendicular motion is free
        assert!((b.linear_velocity.y - 1.0).abs() < 1e-5);
    }
}
