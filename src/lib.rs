//! Impulse Engine - 2D rigid-body physics core in WASM
//!
//! Boxes and circles, a BVH broad phase, box/circle contact generation and a
//! sequential-impulse solver with warm starting. Joints: distance, revolute
//! (with motor) and spring.
//!
//! Architecture:
//! - core/          - Logging macros
//! - domain/        - Handles, colliders, config, errors
//! - spatial/       - Arena, body store, AABB tree
//! - systems/       - Collision, solver, joints, raycast
//! - simulation/    - World state, stepping, JS facade

// Logging macros (must be first for macro export!)
#[macro_use]
pub mod core;
pub mod spatial;
pub mod domain;
pub mod systems;
pub mod simulation;

// Shorter paths for the two modules everything else leans on
pub use systems::rigid_body;
pub use systems::rigid_body_system;

use wasm_bindgen::prelude::*;

// Re-export wasm-bindgen-rayon for thread pool initialization
#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
pub use wasm_bindgen_rayon::init_thread_pool;

// Better error messages in debug mode
#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Initialize the engine
#[wasm_bindgen]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    console_log!("impulse engine {} initialized", env!("CARGO_PKG_VERSION"));
}

/// Get engine version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// Re-export main types
pub use domain::collider::{BoxCollider, CircleCollider, Collider};
pub use domain::config::{SimulationConfig, Timestep};
pub use domain::error::{PhysicsError, PhysicsResult};
pub use domain::handle::{BodyHandle, JointHandle};
pub use rigid_body::{Body, BodyDescriptor, BodyView, Material, Rot, Vec2};
pub use simulation::{PerfStats, RaycastHit, World, WorldCore};
pub use spatial::Aabb;
pub use systems::collision::{ContactPoint, Manifold};
pub use systems::joints::{Joint, JointDescriptor, JointKind, Motor};
pub use systems::raycast::RayHit;
