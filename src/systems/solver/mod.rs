//! Sequential-impulse solver shared by contacts and joints.
//!
//! Every constraint goes through the same three phases each step:
//! `pre_step` (effective mass, bias), `warm_start` (re-apply last frame's
//! accumulated impulse) and `apply_impulse` (one Gauss-Seidel pass, run
//! `velocity_iterations` times).

mod contact;

pub use contact::{Arbiter, ArbiterKey};

use crate::domain::config::SimulationConfig;
use crate::rigid_body::Body;

/// Effective masses at or below this are treated as degenerate
pub const MIN_EFFECTIVE_MASS_DENOM: f32 = 1e-9;

/// Per-step solver inputs (mirrors the config plus derived timing)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepContext {
    pub dt: f32,
    pub inv_dt: f32,
    pub bias_factor: f32,
    pub linear_slop: f32,
    pub restitution_threshold: f32,
    pub contact_margin: f32,
    pub warm_starting: bool,
    pub position_correction: bool,
    pub accumulate_impulses: bool,
}

impl StepContext {
    pub fn new(dt: f32, config: &SimulationConfig) -> Self {
        Self {
            dt,
            inv_dt: if dt > 0.0 { 1.0 / dt } else { 0.0 },
            bias_factor: config.bias_factor,
            linear_slop: config.linear_slop,
            restitution_threshold: config.restitution_threshold,
            contact_margin: config.contact_margin,
            warm_starting: config.warm_starting,
            position_correction: config.position_correction,
            accumulate_impulses: config.accumulate_impulses,
        }
    }

    /// Baumgarte velocity bias for a positional error, zero when correction is off
    #[inline]
    pub fn position_bias(&self, error: f32) -> f32 {
        if self.position_correction {
            self.bias_factor * self.inv_dt * error
        } else {
            0.0
        }
    }
}

/// Constraint - anything the solver can iterate on between two bodies
pub trait Constraint {
    /// Compute effective masses and bias. Returns `false` when the
    /// constraint is degenerate this frame and must be skipped.
    fn pre_step(&mut self, ctx: &StepContext, a: &Body, b: &Body) -> bool;

    /// Apply the impulse accumulated during the previous step.
    fn warm_start(&self, a: &mut Body, b: &mut Body);

    /// One velocity iteration.
    fn apply_impulse(&mut self, ctx: &StepContext, a: &mut Body, b: &mut Body);

    /// Forget accumulated impulses (warm starting off).
    fn reset_impulse(&mut self);
}

#[inline]
pub(crate) fn inverse_mass(k: f32) -> Option<f32> {
    if k > MIN_EFFECTIVE_MASS_DENOM && k.is_finite() {
        Some(1.0 / k)
    } else {
        None
    }
}
