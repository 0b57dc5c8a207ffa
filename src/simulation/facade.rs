use wasm_bindgen::prelude::*;

use crate::domain::handle::{BodyHandle, JointHandle};
use crate::rigid_body::{BodyDescriptor, Vec2};
use crate::systems::joints::{JointDescriptor, Motor};
use crate::Collider;

use super::perf_stats::PerfStats;
use super::WorldCore;

/// Closest ray hit, as seen from JavaScript
#[wasm_bindgen]
pub struct RaycastHit {
    body: u64,
    x: f32,
    y: f32,
    normal_x: f32,
    normal_y: f32,
    distance: f32,
}

#[wasm_bindgen]
impl RaycastHit {
    #[wasm_bindgen(getter)]
    pub fn body(&self) -> u64 { self.body }
    #[wasm_bindgen(getter)]
    pub fn x(&self) -> f32 { self.x }
    #[wasm_bindgen(getter)]
    pub fn y(&self) -> f32 { self.y }
    #[wasm_bindgen(getter)]
    pub fn normal_x(&self) -> f32 { self.normal_x }
    #[wasm_bindgen(getter)]
    pub fn normal_y(&self) -> f32 { self.normal_y }
    #[wasm_bindgen(getter)]
    pub fn distance(&self) -> f32 { self.distance }
}

/// Floats per body in `body_state`
const BODY_STATE_STRIDE: usize = 6;
/// Floats per contact point in `contact_points`
const CONTACT_STRIDE: usize = 5;

#[wasm_bindgen]
pub struct World {
    core: WorldCore,
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
impl World {
    /// Create an empty world with the default configuration
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self { core: WorldCore::new() }
    }

    #[wasm_bindgen(getter)]
    pub fn frame(&self) -> u64 { self.core.frame() }

    #[wasm_bindgen(getter)]
    pub fn body_count(&self) -> u32 { self.core.body_count() as u32 }

    #[wasm_bindgen(getter)]
    pub fn joint_count(&self) -> u32 { self.core.joint_count() as u32 }

    /// Enable or disable per-step perf metrics (adds timing overhead when enabled)
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        self.core.enable_perf_metrics(enabled);
    }

    /// Get last step perf snapshot (zeros when perf disabled)
    pub fn get_perf_stats(&self) -> PerfStats {
        self.core.get_perf_stats()
    }

    // === CONFIG ===

    pub fn load_config(&mut self, json: String) -> Result<(), JsValue> {
        self.core.load_config_json(&json).map_err(js_err)
    }

    pub fn config_json(&self) -> Result<String, JsValue> {
        self.core.config().to_json().map_err(js_err)
    }

    pub fn set_gravity(&mut self, x: f32, y: f32) {
        self.core.set_gravity(x, y);
    }

    pub fn set_velocity_iterations(&mut self, iterations: u32) {
        self.core.set_velocity_iterations(iterations);
    }

    pub fn set_warm_starting(&mut self, enabled: bool) {
        self.core.set_warm_starting(enabled);
    }

    pub fn set_position_correction(&mut self, enabled: bool) {
        self.core.set_position_correction(enabled);
    }

    pub fn set_accumulate_impulses(&mut self, enabled: bool) {
        self.core.set_accumulate_impulses(enabled);
    }

    // === BODIES ===

    /// Spawn a box with half extents (hx, hy). Returns the body handle bits.
    pub fn create_box(
        &mut self,
        x: f32,
        y: f32,
        hx: f32,
        hy: f32,
        angle: f32,
        is_static: bool,
    ) -> Result<u64, JsValue> {
        let collider = Collider::cuboid(hx, hy);
        self.spawn(collider, Vec2::new(x, y), angle, is_static)
    }

    /// Spawn a circle. Returns the body handle bits.
    pub fn create_circle(&mut self, x: f32, y: f32, radius: f32, is_static: bool) -> Result<u64, JsValue> {
        self.spawn(Collider::circle(radius), Vec2::new(x, y), 0.0, is_static)
    }

    /// Spawn from a body descriptor JSON (collider in level format)
    pub fn create_body_json(&mut self, json: String) -> Result<u64, JsValue> {
        self.core
            .create_body_json(&json)
            .map(BodyHandle::to_bits)
            .map_err(js_err)
    }

    pub fn destroy_body(&mut self, body: u64) -> bool {
        self.core.destroy_body(BodyHandle::from_bits(body))
    }

    pub fn is_alive(&self, body: u64) -> bool {
        self.core.is_alive(BodyHandle::from_bits(body))
    }

    /// `[x, y, angle, vx, vy, angular_velocity]`, empty for stale handles
    pub fn body_state(&self, body: u64) -> Vec<f32> {
        match self.core.body(BodyHandle::from_bits(body)) {
            Some(view) => {
                let mut out = Vec::with_capacity(BODY_STATE_STRIDE);
                out.extend_from_slice(&[
                    view.position.x,
                    view.position.y,
                    view.angle,
                    view.linear_velocity.x,
                    view.linear_velocity.y,
                    view.angular_velocity,
                ]);
                out
            }
            None => Vec::new(),
        }
    }

    /// Collider in level format, `None` for stale handles
    pub fn collider_json(&self, body: u64) -> Result<Option<String>, JsValue> {
        self.core
            .body(BodyHandle::from_bits(body))
            .map(|view| view.collider.to_json())
            .transpose()
            .map_err(js_err)
    }

    pub fn set_transform(&mut self, body: u64, x: f32, y: f32, angle: f32) -> bool {
        self.core.set_transform(BodyHandle::from_bits(body), Vec2::new(x, y), angle)
    }

    pub fn set_linear_velocity(&mut self, body: u64, vx: f32, vy: f32) -> bool {
        self.core.set_linear_velocity(BodyHandle::from_bits(body), Vec2::new(vx, vy))
    }

    pub fn set_angular_velocity(&mut self, body: u64, velocity: f32) -> bool {
        self.core.set_angular_velocity(BodyHandle::from_bits(body), velocity)
    }

    /// Impulse (ix, iy) applied at world point (px, py)
    pub fn apply_impulse(&mut self, body: u64, ix: f32, iy: f32, px: f32, py: f32) -> bool {
        self.core
            .apply_impulse(BodyHandle::from_bits(body), Vec2::new(ix, iy), Vec2::new(px, py))
    }

    // === JOINTS ===

    /// Anchors are in each body's local frame. Rest length is the current anchor distance.
    pub fn create_distance_joint(
        &mut self,
        body_a: u64,
        body_b: u64,
        ax: f32,
        ay: f32,
        bx: f32,
        by: f32,
    ) -> Result<u64, JsValue> {
        let desc = JointDescriptor::distance(
            BodyHandle::from_bits(body_a),
            BodyHandle::from_bits(body_b),
            Vec2::new(ax, ay),
            Vec2::new(bx, by),
        );
        self.joint(&desc)
    }

    /// Pin two bodies together at world point (x, y)
    pub fn create_revolute_joint(&mut self, body_a: u64, body_b: u64, x: f32, y: f32) -> Result<u64, JsValue> {
        self.core
            .create_revolute_joint_at(BodyHandle::from_bits(body_a), BodyHandle::from_bits(body_b), Vec2::new(x, y))
            .map(JointHandle::to_bits)
            .map_err(js_err)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_spring_joint(
        &mut self,
        body_a: u64,
        body_b: u64,
        ax: f32,
        ay: f32,
        bx: f32,
        by: f32,
        stiffness: f32,
        damping: f32,
    ) -> Result<u64, JsValue> {
        let desc = JointDescriptor::spring(
            BodyHandle::from_bits(body_a),
            BodyHandle::from_bits(body_b),
            Vec2::new(ax, ay),
            Vec2::new(bx, by),
            stiffness,
            damping,
        );
        self.joint(&desc)
    }

    pub fn set_joint_motor(&mut self, joint: u64, speed: f32, max_torque: f32) -> bool {
        self.core
            .set_joint_motor(JointHandle::from_bits(joint), Some(Motor { speed, max_torque }))
    }

    pub fn clear_joint_motor(&mut self, joint: u64) -> bool {
        self.core.set_joint_motor(JointHandle::from_bits(joint), None)
    }

    pub fn destroy_joint(&mut self, joint: u64) -> bool {
        self.core.destroy_joint(JointHandle::from_bits(joint))
    }

    /// `[ax, ay, bx, by]` world anchors, empty for stale handles
    pub fn joint_anchors(&self, joint: u64) -> Vec<f32> {
        match self.core.joint_anchors(JointHandle::from_bits(joint)) {
            Some((a, b)) => vec![a.x, a.y, b.x, b.y],
            None => Vec::new(),
        }
    }

    // === QUERIES ===

    pub fn raycast(&self, ox: f32, oy: f32, dx: f32, dy: f32, max_distance: f32) -> Option<RaycastHit> {
        self.core
            .raycast(Vec2::new(ox, oy), Vec2::new(dx, dy), max_distance)
            .map(|hit| RaycastHit {
                body: hit.body.to_bits(),
                x: hit.point.x,
                y: hit.point.y,
                normal_x: hit.normal.x,
                normal_y: hit.normal.y,
                distance: hit.distance,
            })
    }

    /// Handle bits of bodies whose bounds overlap the rectangle
    pub fn query_aabb(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<u64> {
        let aabb = crate::Aabb::new(Vec2::new(min_x, min_y), Vec2::new(max_x, max_y));
        self.core
            .query_aabb(&aabb)
            .into_iter()
            .map(BodyHandle::to_bits)
            .collect()
    }

    /// Flat `[x, y, nx, ny, penetration]` per contact point of the last step
    pub fn contact_points(&self) -> Vec<f32> {
        let contacts = self.core.contacts();
        let mut out = Vec::with_capacity(contacts.len() * 2 * CONTACT_STRIDE);
        for manifold in &contacts {
            for p in manifold.points() {
                out.extend_from_slice(&[
                    p.position.x,
                    p.position.y,
                    manifold.normal.x,
                    manifold.normal.y,
                    p.penetration,
                ]);
            }
        }
        out
    }

    // === STEPPING ===

    /// Step exactly `dt` seconds with the current configuration
    pub fn step(&mut self, dt: f32) {
        self.core.step_default(dt);
    }

    /// Feed elapsed frame time through the timestep policy; returns steps run
    pub fn advance(&mut self, elapsed: f32) -> u32 {
        self.core.advance(elapsed)
    }

    /// Remove every body and joint
    pub fn clear(&mut self) {
        self.core.clear();
    }
}

impl World {
    fn spawn(&mut self, collider: Collider, position: Vec2, angle: f32, is_static: bool) -> Result<u64, JsValue> {
        let desc = if is_static {
            BodyDescriptor::fixed(collider, position)
        } else {
            BodyDescriptor::dynamic(collider, position)
        };
        self.core
            .create_body(&desc.with_angle(angle))
            .map(BodyHandle::to_bits)
            .map_err(js_err)
    }

    fn joint(&mut self, desc: &JointDescriptor) -> Result<u64, JsValue> {
        self.core
            .create_joint(desc)
            .map(JointHandle::to_bits)
            .map_err(js_err)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
