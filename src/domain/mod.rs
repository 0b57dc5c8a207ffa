//! Domain types: colliders, configuration, handles, errors.

pub mod collider;
pub mod config;
pub mod error;
pub mod handle;
