//! Joints - constraints between two bodies, solved alongside contacts.
//!
//! A joint stores body handles plus anchors in each body's local frame. The
//! owning system resolves the handles each step; a joint whose body is gone
//! is left out of the solve and removed at the start of the next step.

mod distance;
mod revolute;
mod spring;

pub use distance::DistanceJoint;
pub use revolute::{Motor, RevoluteJoint};
pub use spring::SpringJoint;

use serde::{Deserialize, Serialize};

use crate::domain::error::{PhysicsError, PhysicsResult};
use crate::domain::handle::BodyHandle;
use crate::rigid_body::{Body, Vec2};
use crate::systems::solver::{Constraint, StepContext};

/// Handles and local anchors shared by every joint type
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JointAnchors {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub local_anchor_a: Vec2,
    pub local_anchor_b: Vec2,
}

impl JointAnchors {
    /// World-space anchor offsets from each center of mass
    #[inline]
    pub(crate) fn offsets(&self, a: &Body, b: &Body) -> (Vec2, Vec2) {
        (a.rotation.rotate(self.local_anchor_a), b.rotation.rotate(self.local_anchor_b))
    }

    pub fn world_anchors(&self, a: &Body, b: &Body) -> (Vec2, Vec2) {
        (a.world_point(self.local_anchor_a), b.world_point(self.local_anchor_b))
    }
}

/// Type-specific joint parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum JointKind {
    /// Keep anchors `rest_length` apart; `None` uses the distance at creation.
    #[serde(rename_all = "camelCase")]
    Distance {
        #[serde(default)]
        rest_length: Option<f32>,
    },
    /// Pin anchors together, optionally driven by a motor.
    #[serde(rename_all = "camelCase")]
    Revolute {
        #[serde(default)]
        motor: Option<Motor>,
    },
    /// Soft distance constraint: stiffness in N/m, damping in N·s/m.
    #[serde(rename_all = "camelCase")]
    Spring {
        #[serde(default)]
        rest_length: Option<f32>,
        stiffness: f32,
        #[serde(default)]
        damping: f32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JointDescriptor {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub local_anchor_a: Vec2,
    pub local_anchor_b: Vec2,
    pub kind: JointKind,
}

impl JointDescriptor {
    pub fn distance(body_a: BodyHandle, body_b: BodyHandle, anchor_a: Vec2, anchor_b: Vec2) -> Self {
        Self {
            body_a,
            body_b,
            local_anchor_a: anchor_a,
            local_anchor_b: anchor_b,
            kind: JointKind::Distance { rest_length: None },
        }
    }

    pub fn revolute(body_a: BodyHandle, body_b: BodyHandle, anchor_a: Vec2, anchor_b: Vec2) -> Self {
        Self {
            body_a,
            body_b,
            local_anchor_a: anchor_a,
            local_anchor_b: anchor_b,
            kind: JointKind::Revolute { motor: None },
        }
    }

    pub fn spring(
        body_a: BodyHandle,
        body_b: BodyHandle,
        anchor_a: Vec2,
        anchor_b: Vec2,
        stiffness: f32,
        damping: f32,
    ) -> Self {
        Self {
            body_a,
            body_b,
            local_anchor_a: anchor_a,
            local_anchor_b: anchor_b,
            kind: JointKind::Spring { rest_length: None, stiffness, damping },
        }
    }

    /// Override the rest length (distance and spring joints only)
    pub fn with_rest_length(mut self, length: f32) -> Self {
        match &mut self.kind {
            JointKind::Distance { rest_length } | JointKind::Spring { rest_length, .. } => {
                *rest_length = Some(length);
            }
            JointKind::Revolute { .. } => {}
        }
        self
    }

    /// Attach a motor (revolute joints only)
    pub fn with_motor(mut self, speed: f32, max_torque: f32) -> Self {
        if let JointKind::Revolute { motor } = &mut self.kind {
            *motor = Some(Motor { speed, max_torque });
        }
        self
    }

    fn anchors(&self) -> JointAnchors {
        JointAnchors {
            body_a: self.body_a,
            body_b: self.body_b,
            local_anchor_a: self.local_anchor_a,
            local_anchor_b: self.local_anchor_b,
        }
    }

    fn validate(&self) -> PhysicsResult<()> {
        if self.body_a == self.body_b {
            return Err(PhysicsError::InvalidJoint { reason: "a joint needs two distinct bodies" });
        }
        if !self.local_anchor_a.is_finite() || !self.local_anchor_b.is_finite() {
            return Err(PhysicsError::InvalidJoint { reason: "anchors must be finite" });
        }
        let non_negative = |v: f32| v >= 0.0 && v.is_finite();
        match self.kind {
            JointKind::Distance { rest_length } => {
                if !rest_length.map_or(true, non_negative) {
                    return Err(PhysicsError::InvalidJoint { reason: "rest length must be non-negative" });
                }
            }
            JointKind::Revolute { motor } => {
                if let Some(m) = motor {
                    if !m.speed.is_finite() || !non_negative(m.max_torque) {
                        return Err(PhysicsError::InvalidJoint {
                            reason: "motor needs a finite speed and non-negative torque",
                        });
                    }
                }
            }
            JointKind::Spring { rest_length, stiffness, damping } => {
                if !rest_length.map_or(true, non_negative) {
                    return Err(PhysicsError::InvalidJoint { reason: "rest length must be non-negative" });
                }
                if !non_negative(stiffness) || !non_negative(damping) {
                    return Err(PhysicsError::InvalidJoint {
                        reason: "stiffness and damping must be non-negative",
                    });
                }
            }
        }
        Ok(())
    }
}

/// A live joint with its solver state
#[derive(Clone, Debug)]
pub enum Joint {
    Distance(DistanceJoint),
    Revolute(RevoluteJoint),
    Spring(SpringJoint),
}

impl Joint {
    /// Build a joint against the current poses of its bodies.
    pub fn from_descriptor(desc: &JointDescriptor, a: &Body, b: &Body) -> PhysicsResult<Self> {
        desc.validate()?;
        let anchors = desc.anchors();
        let (pa, pb) = anchors.world_anchors(a, b);
        let current = (pb - pa).length();

        Ok(match desc.kind {
            JointKind::Distance { rest_length } => {
                Joint::Distance(DistanceJoint::new(anchors, rest_length.unwrap_or(current)))
            }
            JointKind::Revolute { motor } => Joint::Revolute(RevoluteJoint::new(anchors, motor)),
            JointKind::Spring { rest_length, stiffness, damping } => Joint::Spring(SpringJoint::new(
                anchors,
                rest_length.unwrap_or(current),
                stiffness,
                damping,
            )),
        })
    }

    pub fn anchors(&self) -> &JointAnchors {
        match self {
            Joint::Distance(j) => &j.anchors,
            Joint::Revolute(j) => &j.anchors,
            Joint::Spring(j) => &j.anchors,
        }
    }

    pub fn bodies(&self) -> (BodyHandle, BodyHandle) {
        let anchors = self.anchors();
        (anchors.body_a, anchors.body_b)
    }

    fn constraint_mut(&mut self) -> &mut dyn Constraint {
        match self {
            Joint::Distance(j) => j,
            Joint::Revolute(j) => j,
            Joint::Spring(j) => j,
        }
    }

    fn constraint(&self) -> &dyn Constraint {
        match self {
            Joint::Distance(j) => j,
            Joint::Revolute(j) => j,
            Joint::Spring(j) => j,
        }
    }
}

impl Constraint for Joint {
    fn pre_step(&mut self, ctx: &StepContext, a: &Body, b: &Body) -> bool {
        self.constraint_mut().pre_step(ctx, a, b)
    }

    fn warm_start(&self, a: &mut Body, b: &mut Body) {
        self.constraint().warm_start(a, b)
    }

    fn apply_impulse(&mut self, ctx: &StepContext, a: &mut Body, b: &mut Body) {
        self.constraint_mut().apply_impulse(ctx, a, b)
    }

    fn reset_impulse(&mut self) {
        self.constraint_mut().reset_impulse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::collider::Collider;
    use crate::domain::handle::ArenaHandle;
    use crate::rigid_body::BodyDescriptor;

    fn h(i: u32) -> BodyHandle {
        BodyHandle::from_parts(i, 0)
    }

    #[test]
    fn rest_length_defaults_to_current_distance() {
        let a = Body::new(&BodyDescriptor::fixed(Collider::circle(0.1), Vec2::new(0.0, 5.0)));
        let b = Body::new(&BodyDescriptor::dynamic(Collider::circle(0.1), Vec2::new(3.0, 1.0)));
        let desc = JointDescriptor::distance(h(0), h(1), Vec2::zero(), Vec2::zero());
        match Joint::from_descriptor(&desc, &a, &b).expect("valid joint") {
            Joint::Distance(j) => assert!((j.rest_length - 5.0).abs() < 1e-5),
            other => panic!("unexpected joint {:?}", other),
        }
    }

    #[test]
    fn rejects_self_joint_and_negative_parameters() {
        let a = Body::new(&BodyDescriptor::dynamic(Collider::circle(0.1), Vec2::zero()));
        let self_joint = JointDescriptor::distance(h(0), h(0), Vec2::zero(), Vec2::zero());
        assert!(matches!(
            Joint::from_descriptor(&self_joint, &a, &a),
            Err(PhysicsError::InvalidJoint { .. })
        ));

        let bad_spring = JointDescriptor::spring(h(0), h(1), Vec2::zero(), Vec2::zero(), -1.0, 0.0);
        assert!(Joint::from_descriptor(&bad_spring, &a, &a).is_err());

        let bad_rest =
            JointDescriptor::distance(h(0), h(1), Vec2::zero(), Vec2::zero()).with_rest_length(-2.0);
        assert!(Joint::from_descriptor(&bad_rest, &a, &a).is_err());
    }

    #[test]
    fn joint_kind_json_shape() {
        let kind: JointKind =
            serde_json::from_str(r#"{"type":"spring","stiffness":40.0,"damping":1.5}"#).expect("parse");
        assert_eq!(kind, JointKind::Spring { rest_length: None, stiffness: 40.0, damping: 1.5 });

        let kind: JointKind =
            serde_json::from_str(r#"{"type":"revolute","motor":{"speed":2.0,"maxTorque":10.0}}"#)
                .expect("parse");
        assert_eq!(kind, JointKind::Revolute { motor: Some(Motor { speed: 2.0, max_torque: 10.0 }) });
    }
}
