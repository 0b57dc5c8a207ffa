//! Systems - everything that runs during a step.

pub mod collision;
pub mod joints;
pub mod raycast;
pub mod rigid_body;
pub mod rigid_body_system;
pub mod solver;
