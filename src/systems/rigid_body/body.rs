use serde::{Deserialize, Serialize};

use crate::domain::collider::Collider;
use crate::domain::error::{PhysicsError, PhysicsResult};
use crate::spatial::aabb::Aabb;

use super::vec2::{Rot, Vec2};

/// Surface response parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Material {
    /// Coulomb friction coefficient
    pub friction: f32,
    /// Bounciness (0.0 = no bounce, 1.0 = full elastic)
    pub restitution: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self { friction: 0.5, restitution: 0.0 }
    }
}

/// Everything needed to create a body.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyDescriptor {
    pub position: Vec2,
    #[serde(default)]
    pub angle: f32,
    #[serde(default)]
    pub linear_velocity: Vec2,
    #[serde(default)]
    pub angular_velocity: f32,
    #[serde(flatten)]
    pub collider: Collider,
    #[serde(default)]
    pub material: Material,
    /// Mass per unit area; ignored for static bodies
    #[serde(default = "default_density")]
    pub density: f32,
    #[serde(default)]
    pub is_static: bool,
}

fn default_density() -> f32 {
    1.0
}

fn invalid(reason: &str) -> PhysicsError {
    PhysicsError::InvalidDescriptor { reason: reason.to_string() }
}

impl BodyDescriptor {
    pub fn dynamic(collider: Collider, position: Vec2) -> Self {
        Self {
            position,
            angle: 0.0,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            collider,
            material: Material::default(),
            density: default_density(),
            is_static: false,
        }
    }

    pub fn fixed(collider: Collider, position: Vec2) -> Self {
        Self { is_static: true, ..Self::dynamic(collider, position) }
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_velocity(mut self, linear: Vec2, angular: f32) -> Self {
        self.linear_velocity = linear;
        self.angular_velocity = angular;
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    /// Parse a level entry. Shape problems surface as `ColliderFormat`,
    /// everything else that fails to parse as `InvalidDescriptor`.
    pub fn from_json(json: &str) -> PhysicsResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json).map_err(|e| invalid(&e.to_string()))?;
        Collider::deserialize(&value)?;
        let desc = BodyDescriptor::deserialize(value).map_err(|e| invalid(&e.to_string()))?;
        desc.validate()?;
        Ok(desc)
    }

    pub fn validate(&self) -> PhysicsResult<()> {
        self.collider.validate()?;
        if !self.position.is_finite() || !self.angle.is_finite() {
            return Err(invalid("pose must be finite"));
        }
        if !self.linear_velocity.is_finite() || !self.angular_velocity.is_finite() {
            return Err(invalid("velocity must be finite"));
        }
        if !self.is_static && !(self.density > 0.0 && self.density.is_finite()) {
            return Err(invalid("dynamic bodies need a positive density"));
        }
        if !(self.material.friction >= 0.0 && self.material.friction.is_finite()) {
            return Err(invalid("friction must be non-negative"));
        }
        if !(0.0..=1.0).contains(&self.material.restitution) {
            return Err(invalid("restitution must be in [0, 1]"));
        }
        Ok(())
    }
}

/// Rigid Body - moves as a single unit
#[derive(Clone, Debug)]
pub struct Body {
    // === Physics State ===
    /// World position (center of mass)
    pub position: Vec2,
    pub rotation: Rot,
    pub linear_velocity: Vec2,
    pub angular_velocity: f32,

    // === Mass properties (zero for static bodies) ===
    pub inv_mass: f32,
    pub inv_inertia: f32,

    pub material: Material,
    pub collider: Collider,
    pub is_static: bool,
}

impl Body {
    /// Build a body from a descriptor that already passed `validate`.
    pub fn new(desc: &BodyDescriptor) -> Self {
        let (inv_mass, inv_inertia, linear_velocity, angular_velocity) = if desc.is_static {
            (0.0, 0.0, Vec2::ZERO, 0.0)
        } else {
            let mass = desc.density * desc.collider.area();
            let inertia = desc.collider.inertia(mass);
            (
                if mass > 0.0 { 1.0 / mass } else { 0.0 },
                if inertia > 0.0 { 1.0 / inertia } else { 0.0 },
                desc.linear_velocity,
                desc.angular_velocity,
            )
        };

        Self {
            position: desc.position,
            rotation: Rot::from_angle(desc.angle),
            linear_velocity,
            angular_velocity,
            inv_mass,
            inv_inertia,
            material: desc.material,
            collider: desc.collider,
            is_static: desc.is_static,
        }
    }

    pub fn angle(&self) -> f32 {
        self.rotation.angle()
    }

    pub fn aabb(&self) -> Aabb {
        self.collider.aabb(self.position, self.rotation)
    }

    /// Transform a local point to world coordinates
    #[inline]
    pub fn world_point(&self, local: Vec2) -> Vec2 {
        self.position + self.rotation.rotate(local)
    }

    /// Velocity of a point at offset `r` from the center of mass
    #[inline]
    pub fn velocity_at(&self, r: Vec2) -> Vec2 {
        self.linear_velocity + Vec2::scalar_cross(self.angular_velocity, r)
    }

    /// Apply impulse at offset `r` from the center of mass
    #[inline]
    pub fn apply_impulse(&mut self, impulse: Vec2, r: Vec2) {
        self.linear_velocity += impulse * self.inv_mass;
        self.angular_velocity += self.inv_inertia * r.cross(impulse);
    }

    /// Apply impulse at center of mass
    pub fn apply_linear_impulse(&mut self, impulse: Vec2) {
        self.linear_velocity += impulse * self.inv_mass;
    }

    pub fn apply_angular_impulse(&mut self, impulse: f32) {
        self.angular_velocity += self.inv_inertia * impulse;
    }

    /// Semi-implicit Euler: velocities were already updated, now move.
    pub fn integrate_position(&mut self, dt: f32) {
        if self.is_static {
            return;
        }
        self.position += self.linear_velocity * dt;
        self.rotation = self.rotation.integrate(self.angular_velocity * dt);
    }

    pub fn view(&self) -> BodyView {
        BodyView {
            position: self.position,
            angle: self.angle(),
            rotation: self.rotation,
            linear_velocity: self.linear_velocity,
            angular_velocity: self.angular_velocity,
            is_static: self.is_static,
            collider: self.collider,
        }
    }
}

/// Read-only snapshot handed to renderers and editors between steps
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyView {
    pub position: Vec2,
    pub angle: f32,
    pub rotation: Rot,
    pub linear_velocity: Vec2,
    pub angular_velocity: f32,
    pub is_static: bool,
    pub collider: Collider,
}
