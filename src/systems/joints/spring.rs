use crate::rigid_body::{Body, Vec2};
use crate::systems::solver::{inverse_mass, Constraint, StepContext};

use super::JointAnchors;

const MIN_AXIS_LENGTH: f32 = 1e-6;

/// Soft distance constraint.
///
/// Solved as an implicit spring-damper: the stiffness and damping turn into a
/// softness term `gamma` and a bias proportional to the length error. The
/// impulse is never clamped, so the spring both pushes and pulls. The bias is
/// the spring force itself and stays on even without position correction.
#[derive(Clone, Debug)]
pub struct SpringJoint {
    pub anchors: JointAnchors,
    pub rest_length: f32,
    pub stiffness: f32,
    pub damping: f32,

    r1: Vec2,
    r2: Vec2,
    axis: Vec2,
    mass: f32,
    gamma: f32,
    bias: f32,
    active: bool,
    impulse: f32,
}

impl SpringJoint {
    pub fn new(anchors: JointAnchors, rest_length: f32, stiffness: f32, damping: f32) -> Self {
        Self {
            anchors,
            rest_length,
            stiffness,
            damping,
            r1: Vec2::ZERO,
            r2: Vec2::ZERO,
            axis: Vec2::ZERO,
            mass: 0.0,
            gamma: 0.0,
            bias: 0.0,
            active: false,
            impulse: 0.0,
        }
    }

    pub fn impulse(&self) -> f32 {
        self.impulse
    }
}

impl Constraint for SpringJoint {
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
        if inverse_mass(k).is_none() {
            return false;
        }

        // gamma = 1 / (h (c + h k)), bias = C h k gamma
        let softness = ctx.dt * (self.damping + ctx.dt * self.stiffness);
        let gamma = if softness > 0.0 { 1.0 / softness } else { 0.0 };
        let error = length - self.rest_length;

        self.r1 = r1;
        self.r2 = r2;
        self.axis = axis;
        self.gamma = gamma;
        self.bias = error * ctx.dt * self.stiffness * gamma;
        // A spring with neither stiffness nor damping is inert
        self.mass = if gamma > 0.0 { 1.0 / (k + gamma) } else { 0.0 };
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
        let impulse = -self.mass * (cdot + self.bias + self.gamma * self.impulse);
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

    fn setup(offset: f32) -> (Body, Body, SpringJoint) {
        let a = Body::new(&BodyDescriptor::fixed(Collider::circle(0.5), Vec2::zero()));
        let b = Body::new(&BodyDescriptor::dynamic(Collider::circle(0.5), Vec2::new(offset, 0.0)));
        let anchors = JointAnchors {
            body_a: BodyHandle::from_parts(0, 0),
            body_b: BodyHandle::from_parts(1, 0),
            local_anchor_a: Vec2::zero(),
            local_anchor_b: Vec2::zero(),
        };
        (a, b, SpringJoint::new(anchors, 2.0, 50.0, 0.0))
    }

    #[test]
    fn stretched_spring_pulls_back() {
        let (mut a, mut b, mut spring) = setup(3.0);
        let ctx = StepContext::new(1.0 / 60.0, &SimulationConfig::default());
        assert!(spring.pre_step(&ctx, &a, &b));
        spring.apply_impulse(&ctx, &mut a, &mut b);
        assert!(b.linear_velocity.x < 0.0);
        assert!(spring.impulse() < 0.0);
    }

    #[test]
    fn compressed_spring_pushes_out() {
        let (mut a, mut b, mut spring) = setup(1.0);
        let ctx = StepContext::new(1.0 / 60.0, &SimulationConfig::default());
        spring.pre_step(&ctx, &a, &b);
        spring.apply_impulse(&ctx, &mut a, &mut b);
        assert!(b.linear_velocity.x > 0.0);
    }

    #[test]
    fn stiffness_acts_without_position_correction() {
        let (mut a, mut b, mut spring) = setup(3.0);
        let config = SimulationConfig { position_correction: false, ..SimulationConfig::default() };
        let ctx = StepContext::new(1.0 / 60.0, &config);
        spring.pre_step(&ctx, &a, &b);
        spring.apply_impulse(&ctx, &mut a, &mut b);
        assert!(b.linear_velocity.x < 0.0);
    }
}
