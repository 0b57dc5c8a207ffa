//! Spatial structures: bounds, the body arena and the broad-phase tree.

pub mod aabb;
pub mod arena;
pub mod body_store;
pub mod bvh;

pub use aabb::Aabb;
pub use body_store::BodyStore;
pub use bvh::Bvh;
