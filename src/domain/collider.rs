//! Collider shapes and their persistence format.
//!
//! Level storage keeps each collider as a tagged object:
//!
//! ```json
//! { "type": "BoxCollider", "collider": { "halfExtents": { "x": 0.5, "y": 0.5 } } }
//! { "type": "CircleCollider", "collider": { "radius": 0.25 } }
//! ```
//!
//! The `type` string selects the variant; anything else fails to parse.

use serde::{Deserialize, Serialize};

use crate::domain::error::{PhysicsError, PhysicsResult};
use crate::rigid_body::{Rot, Vec2};
use crate::spatial::aabb::Aabb;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxCollider {
    pub half_extents: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleCollider {
    pub radius: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "collider")]
pub enum Collider {
    #[serde(rename = "BoxCollider")]
    Box(BoxCollider),
    #[serde(rename = "CircleCollider")]
    Circle(CircleCollider),
}

impl Collider {
    pub fn cuboid(half_width: f32, half_height: f32) -> Self {
        Collider::Box(BoxCollider { half_extents: Vec2::new(half_width, half_height) })
    }

    pub fn circle(radius: f32) -> Self {
        Collider::Circle(CircleCollider { radius })
    }

    pub fn from_json(json: &str) -> PhysicsResult<Self> {
        let collider: Collider = serde_json::from_str(json)?;
        collider.validate()?;
        Ok(collider)
    }

    pub fn to_json(&self) -> PhysicsResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn validate(&self) -> PhysicsResult<()> {
        let ok = match self {
            Collider::Box(b) => {
                b.half_extents.is_finite() && b.half_extents.x > 0.0 && b.half_extents.y > 0.0
            }
            Collider::Circle(c) => c.radius.is_finite() && c.radius > 0.0,
        };
        if ok {
            Ok(())
        } else {
            Err(PhysicsError::InvalidCollider {
                reason: "dimensions must be positive and finite",
            })
        }
    }

    pub fn area(&self) -> f32 {
        match self {
            Collider::Box(b) => 4.0 * b.half_extents.x * b.half_extents.y,
            Collider::Circle(c) => std::f32::consts::PI * c.radius * c.radius,
        }
    }

    /// Rotational inertia about the centroid for a given mass
    pub fn inertia(&self, mass: f32) -> f32 {
        match self {
            // m * (w² + h²) / 12 with w = 2hx, h = 2hy
            Collider::Box(b) => {
                let h = b.half_extents;
                mass * (h.x * h.x + h.y * h.y) / 3.0
            }
            Collider::Circle(c) => 0.5 * mass * c.radius * c.radius,
        }
    }

    /// Exact world-space bounds at the given pose
    pub fn aabb(&self, position: Vec2, rotation: Rot) -> Aabb {
        match self {
            Collider::Box(b) => {
                let h = b.half_extents;
                let m = rotation.to_mat22().abs();
                Aabb::from_center(position, m.mul_vec(h))
            }
            Collider::Circle(c) => Aabb::from_center(position, Vec2::new(c.radius, c.radius)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_json_layout() {
        let json = Collider::cuboid(0.5, 1.25).to_json().unwrap();
        assert_eq!(
            json,
            r#"{"type":"BoxCollider","collider":{"halfExtents":{"x":0.5,"y":1.25}}}"#
        );
    }

    #[test]
    fn circle_json_layout() {
        let json = Collider::circle(2.0).to_json().unwrap();
        assert_eq!(json, r#"{"type":"CircleCollider","collider":{"radius":2.0}}"#);
    }

    #[test]
    fn unknown_type_is_an_error() {
        let err = Collider::from_json(r#"{"type":"PolygonCollider","collider":{}}"#);
        assert!(matches!(err, Err(PhysicsError::ColliderFormat(_))));
    }

    #[test]
    fn non_positive_dimensions_are_rejected() {
        let err = Collider::from_json(r#"{"type":"CircleCollider","collider":{"radius":0.0}}"#);
        assert!(matches!(err, Err(PhysicsError::InvalidCollider { .. })));
    }

    #[test]
    fn rotated_box_bounds_grow() {
        let c = Collider::cuboid(1.0, 1.0);
        let aabb = c.aabb(Vec2::zero(), Rot::from_angle(std::f32::consts::FRAC_PI_4));
        let expected = std::f32::consts::SQRT_2;
        assert!((aabb.max.x - expected).abs() < 1e-5);
        assert!((aabb.min.y + expected).abs() < 1e-5);
    }
}
