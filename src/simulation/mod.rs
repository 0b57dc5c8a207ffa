//! World - owned simulation state and its public API.
//!
//! `WorldCore` is a plain Rust value: no globals, cloneable for save states.
//! `World` (facade.rs) wraps it for JavaScript. Handles returned here stay
//! valid until the body or joint is destroyed.

use crate::domain::config::SimulationConfig;
use crate::domain::error::PhysicsResult;
use crate::domain::handle::{BodyHandle, JointHandle};
use crate::rigid_body::{BodyDescriptor, BodyView, Vec2};
use crate::rigid_body_system::RigidBodySystem;
use crate::spatial::Aabb;
use crate::systems::collision::Manifold;
use crate::systems::joints::{Joint, JointDescriptor, Motor};
use crate::systems::raycast::RayHit;

#[path = "perf/perf_timer.rs"]
mod perf_timer;
#[path = "perf/perf_stats.rs"]
mod perf_stats;
#[path = "step/step.rs"]
mod step;
#[path = "commands/commands.rs"]
mod commands;
#[path = "rigid/rigid.rs"]
mod rigid;
#[path = "init/init.rs"]
mod init;
#[path = "init/settings.rs"]
mod settings;
mod facade;

pub use facade::{RaycastHit, World};
pub use perf_stats::PerfStats;

use perf_timer::PerfTimer;

/// The simulation world
#[derive(Clone)]
pub struct WorldCore {
    rigid_bodies: RigidBodySystem,

    // Settings
    config: SimulationConfig,

    // State
    frame: u64,
    /// Unsimulated time carried between `advance` calls
    accumulator: f32,

    // Perf metrics
    perf_enabled: bool,
    perf_stats: PerfStats,
}

impl Default for WorldCore {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldCore {
    /// Create an empty world with the default configuration
    pub fn new() -> Self {
        init::create_world_core(SimulationConfig::default())
    }

    pub fn with_config(config: SimulationConfig) -> PhysicsResult<Self> {
        config.validate()?;
        Ok(init::create_world_core(config))
    }

    pub fn frame(&self) -> u64 { self.frame }

    pub fn config(&self) -> &SimulationConfig { &self.config }

    pub fn set_config(&mut self, config: SimulationConfig) -> PhysicsResult<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn load_config_json(&mut self, json: &str) -> PhysicsResult<()> {
        settings::load_config_json(self, json)
    }

    /// Enable or disable per-step perf metrics (adds timing overhead when enabled)
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        settings::enable_perf_metrics(self, enabled);
    }

    /// Get last step perf snapshot (zeros when perf disabled)
    pub fn get_perf_stats(&self) -> PerfStats {
        settings::get_perf_stats(self)
    }

    pub fn set_gravity(&mut self, x: f32, y: f32) {
        settings::set_gravity(self, x, y);
    }

    /// Ignored when outside the accepted range
    pub fn set_velocity_iterations(&mut self, iterations: u32) {
        settings::set_velocity_iterations(self, iterations);
    }

    pub fn set_warm_starting(&mut self, enabled: bool) {
        settings::set_warm_starting(self, enabled);
    }

    pub fn set_position_correction(&mut self, enabled: bool) {
        settings::set_position_correction(self, enabled);
    }

    pub fn set_accumulate_impulses(&mut self, enabled: bool) {
        settings::set_accumulate_impulses(self, enabled);
    }

    // === BODIES ===

    pub fn create_body(&mut self, desc: &BodyDescriptor) -> PhysicsResult<BodyHandle> {
        rigid::create_body(self, desc)
    }

    /// Create a body from descriptor JSON (collider in the tagged format)
    pub fn create_body_json(&mut self, json: &str) -> PhysicsResult<BodyHandle> {
        rigid::create_body_json(self, json)
    }

    /// No-op (returns false) for stale handles
    pub fn destroy_body(&mut self, handle: BodyHandle) -> bool {
        rigid::destroy_body(self, handle)
    }

    pub fn body(&self, handle: BodyHandle) -> Option<BodyView> {
        self.rigid_bodies.body(handle).map(|b| b.view())
    }

    pub fn is_alive(&self, handle: BodyHandle) -> bool {
        self.rigid_bodies.is_alive(handle)
    }

    pub fn body_count(&self) -> usize {
        self.rigid_bodies.body_count()
    }

    /// Live body handles in slot order
    pub fn body_handles(&self) -> Vec<BodyHandle> {
        self.rigid_bodies.bodies().map(|(h, _)| h).collect()
    }

    pub fn set_transform(&mut self, handle: BodyHandle, position: Vec2, angle: f32) -> bool {
        commands::set_transform(self, handle, position, angle)
    }

    pub fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> bool {
        commands::set_linear_velocity(self, handle, velocity)
    }

    pub fn set_angular_velocity(&mut self, handle: BodyHandle, velocity: f32) -> bool {
        commands::set_angular_velocity(self, handle, velocity)
    }

    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec2, point: Vec2) -> bool {
        commands::apply_impulse(self, handle, impulse, point)
    }

    // === JOINTS ===

    pub fn create_joint(&mut self, desc: &JointDescriptor) -> PhysicsResult<JointHandle> {
        rigid::create_joint(self, desc)
    }

    pub fn create_revolute_joint_at(
        &mut self,
        body_a: BodyHandle,
        body_b: BodyHandle,
        world_anchor: Vec2,
    ) -> PhysicsResult<JointHandle> {
        rigid::create_revolute_at(self, body_a, body_b, world_anchor)
    }

    /// Attach, replace or remove the motor of a revolute joint.
    /// False for stale handles and other joint types.
    pub fn set_joint_motor(&mut self, handle: JointHandle, motor: Option<Motor>) -> bool {
        rigid::set_joint_motor(self, handle, motor)
    }

    pub fn destroy_joint(&mut self, handle: JointHandle) -> bool {
        rigid::destroy_joint(self, handle)
    }

    pub fn joint(&self, handle: JointHandle) -> Option<&Joint> {
        self.rigid_bodies.joint(handle)
    }

    pub fn joint_count(&self) -> usize {
        self.rigid_bodies.joint_count()
    }

    /// World-space anchor points of a joint
    pub fn joint_anchors(&self, handle: JointHandle) -> Option<(Vec2, Vec2)> {
        let joint = self.rigid_bodies.joint(handle)?;
        let anchors = joint.anchors();
        let a = self.rigid_bodies.body(anchors.body_a)?;
        let b = self.rigid_bodies.body(anchors.body_b)?;
        Some(anchors.world_anchors(a, b))
    }

    // === QUERIES ===

    pub fn raycast(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<RayHit> {
        self.rigid_bodies.raycast(origin, direction, max_distance)
    }

    pub fn query_aabb(&self, aabb: &Aabb) -> Vec<BodyHandle> {
        self.rigid_bodies.query_aabb(aabb)
    }

    /// Contacts from the last step, for debug drawing
    pub fn contacts(&self) -> Vec<Manifold> {
        self.rigid_bodies.contacts().copied().collect()
    }

    // === STEPPING ===

    /// Advance by exactly `dt` seconds. Non-positive or non-finite `dt` is
    /// ignored, as is a `config` that fails `validate`.
    pub fn step(&mut self, dt: f32, config: &SimulationConfig) {
        step::step(self, dt, config);
    }

    /// `step` with the world's own configuration
    pub fn step_default(&mut self, dt: f32) {
        let config = self.config.clone();
        step::step(self, dt, &config);
    }

    /// Feed elapsed wall time through the configured timestep policy.
    /// Returns the number of steps run.
    pub fn advance(&mut self, elapsed: f32) -> u32 {
        let config = self.config.clone();
        step::advance(self, elapsed, &config)
    }

    /// Copy of the full state, for replays and save states
    pub fn snapshot(&self) -> WorldCore {
        self.clone()
    }

    /// Remove every body and joint
    pub fn clear(&mut self) {
        commands::clear(self)
    }
}

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
