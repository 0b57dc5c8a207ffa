//! RigidBodySystem - bodies, joints and contacts advanced together.
//!
//! Per step: prune dead references, refit the BVH, collect candidate pairs,
//! run the narrow phase, merge contacts into persistent arbiters, integrate
//! gravity, solve joints and contacts, integrate positions.

mod collision;
mod system;

pub use system::{RigidBodySystem, SolveStats};
