//! RigidBody - A solid body that moves as a unit
//!
//! The body stores its collider in local coordinates (relative to its center
//! of mass) and places it in the world with a position and a unit-complex
//! rotation.

mod vec2;
mod body;

pub use vec2::{Mat22, Rot, Vec2};
pub use body::{Body, BodyDescriptor, BodyView, Material};
