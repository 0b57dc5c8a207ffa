use serde::{Deserialize, Serialize};

use crate::rigid_body::{Body, Mat22, Vec2};
use crate::systems::solver::{inverse_mass, Constraint, StepContext};

use super::JointAnchors;

/// Drives the relative angular velocity toward `speed` (rad/s) using at
/// most `max_torque` (N·m).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Motor {
    pub speed: f32,
    pub max_torque: f32,
}

/// Pin joint: both anchors share one world point, rotation is free.
#[derive(Clone, Debug)]
pub struct RevoluteJoint {
    pub anchors: JointAnchors,
    pub motor: Option<Motor>,

    r1: Vec2,
    r2: Vec2,
    mass: Mat22,
    bias: Vec2,
    active: bool,
    impulse: Vec2,

    motor_mass: f32,
    motor_impulse: f32,
}

impl RevoluteJoint {
    pub fn new(anchors: JointAnchors, motor: Option<Motor>) -> Self {
        Self {
            anchors,
            motor,
            r1: Vec2::ZERO,
            r2: Vec2::ZERO,
            mass: Mat22::default(),
            bias: Vec2::ZERO,
            active: false,
            impulse: Vec2::ZERO,
            motor_mass: 0.0,
            motor_impulse: 0.0,
        }
    }

    pub fn impulse(&self) -> Vec2 {
        self.impulse
    }

    pub fn motor_impulse(&self) -> f32 {
        self.motor_impulse
    }

    fn solve_motor(&mut self, ctx: &StepContext, a: &mut Body, b: &mut Body) {
        let Some(motor) = self.motor else {
            return;
        };
        if self.motor_mass <= 0.0 {
            return;
        }
        let cdot = b.angular_velocity - a.angular_velocity - motor.speed;
        let max_impulse = motor.max_torque * ctx.dt;
        let old = self.motor_impulse;
        self.motor_impulse = (old - self.motor_mass * cdot).clamp(-max_impulse, max_impulse);
        let impulse = self.motor_impulse - old;

        a.apply_angular_impulse(-impulse);
        b.apply_angular_impulse(impulse);
    }
}

impl Constraint for RevoluteJoint {
    fn pre_step(&mut self, ctx: &StepContext, a: &Body, b: &Body) -> bool {
        let (r1, r2) = self.anchors.offsets(a, b);
        self.active = false;

        let inv_mass = a.inv_mass + b.inv_mass;
        let k1 = Mat22::new(Vec2::new(inv_mass, 0.0), Vec2::new(0.0, inv_mass));
        let k2 = Mat22::new(
            Vec2::new(a.inv_inertia * r1.y * r1.y, -a.inv_inertia * r1.x * r1.y),
            Vec2::new(-a.inv_inertia * r1.x * r1.y, a.inv_inertia * r1.x * r1.x),
        );
        let k3 = Mat22::new(
            Vec2::new(b.inv_inertia * r2.y * r2.y, -b.inv_inertia * r2.x * r2.y),
            Vec2::new(-b.inv_inertia * r2.x * r2.y, b.inv_inertia * r2.x * r2.x),
        );
        let Some(mass) = (k1 + k2 + k3).invert() else {
            return false;
        };

        let dp = (b.position + r2) - (a.position + r1);

        self.r1 = r1;
        self.r2 = r2;
        self.mass = mass;
        self.bias = Vec2::new(ctx.position_bias(-dp.x), ctx.position_bias(-dp.y));
        self.motor_mass = inverse_mass(a.inv_inertia + b.inv_inertia).unwrap_or(0.0);
        self.active = true;
        true
    }

    fn warm_start(&self, a: &mut Body, b: &mut Body) {
        if !self.active {
            return;
        }
        a.apply_impulse(-self.impulse, self.r1);
        b.apply_impulse(self.impulse, self.r2);
        if self.motor.is_some() {
            a.apply_angular_impulse(-self.motor_impulse);
            b.apply_angular_impulse(self.motor_impulse);
        }
    }

    fn apply_impulse(&mut self, ctx: &StepContext, a: &mut Body, b: &mut Body) {
        if !self.active {
            return;
        }
        self.solve_motor(ctx, a, b);

        let dv = b.velocity_at(self.r2) - a.velocity_at(self.r1);
        let impulse = self.mass.mul_vec(self.bias - dv);
        self.impulse += impulse;

        a.apply_impulse(-impulse, self.r1);
        b.apply_impulse(impulse, self.r2);
    }

    fn reset_impulse(&mut self) {
        self.impulse = Vec2::ZERO;
        self.motor_impulse = 0.0;
    }
}
