//! Error type for fallible (non hot-path) engine operations.
//!
//! Per-step work never returns errors: stale handles yield `None`, degenerate
//! constraints are skipped. `PhysicsError` covers malformed input coming from
//! outside the engine (persistence, descriptors, configuration).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhysicsError {
    /// Collider JSON did not match `{ "type": ..., "collider": {...} }`
    /// or named an unknown collider type.
    #[error("collider format: {0}")]
    ColliderFormat(#[from] serde_json::Error),

    /// Collider dimensions are not positive and finite.
    #[error("invalid collider: {reason}")]
    InvalidCollider { reason: &'static str },

    /// Body JSON is malformed or describes an unusable body.
    #[error("invalid body descriptor: {reason}")]
    InvalidDescriptor { reason: String },

    /// Joint references a dead body or carries unusable parameters.
    #[error("invalid joint: {reason}")]
    InvalidJoint { reason: &'static str },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

pub type PhysicsResult<T> = Result<T, PhysicsError>;
