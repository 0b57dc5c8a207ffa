//! Simulation configuration.
//!
//! Loaded from JSON (camelCase, every field optional) or built in code and
//! passed to `step`. `validate` rejects values the solver cannot run with.

use serde::{Deserialize, Serialize};

use crate::domain::error::{PhysicsError, PhysicsResult};
use crate::rigid_body::Vec2;

pub const DEFAULT_VELOCITY_ITERATIONS: u32 = 10;
pub const DEFAULT_BIAS_FACTOR: f32 = 0.2;
pub const DEFAULT_LINEAR_SLOP: f32 = 0.001;
pub const DEFAULT_RESTITUTION_THRESHOLD: f32 = 1.0;
pub const DEFAULT_CONTACT_MARGIN: f32 = 0.01;
const MAX_VELOCITY_ITERATIONS: u32 = 256;

/// How `advance` turns elapsed wall time into solver steps
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum Timestep {
    /// Accumulate elapsed time and run whole `dt` steps, at most `max_substeps` per call.
    #[serde(rename_all = "camelCase")]
    Fixed { dt: f32, max_substeps: u32 },
    /// One step of exactly the elapsed time.
    Variable,
}

impl Default for Timestep {
    fn default() -> Self {
        Timestep::Fixed { dt: 1.0 / 60.0, max_substeps: 8 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationConfig {
    pub gravity: Vec2,
    pub velocity_iterations: u32,
    pub warm_starting: bool,
    pub position_correction: bool,
    pub accumulate_impulses: bool,
    /// Baumgarte factor: fraction of positional error removed per step
    pub bias_factor: f32,
    /// Penetration allowed before position correction kicks in
    pub linear_slop: f32,
    /// Approach speed below which contacts do not bounce
    pub restitution_threshold: f32,
    /// Gap within which stepping keeps contacts as speculative points
    pub contact_margin: f32,
    pub timestep: Timestep,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -9.8),
            velocity_iterations: DEFAULT_VELOCITY_ITERATIONS,
            warm_starting: true,
            position_correction: true,
            accumulate_impulses: true,
            bias_factor: DEFAULT_BIAS_FACTOR,
            linear_slop: DEFAULT_LINEAR_SLOP,
            restitution_threshold: DEFAULT_RESTITUTION_THRESHOLD,
            contact_margin: DEFAULT_CONTACT_MARGIN,
            timestep: Timestep::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> PhysicsResult<Self> {
        let config: SimulationConfig = serde_json::from_str(json)
            .map_err(|e| PhysicsError::InvalidConfig { reason: e.to_string() })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> PhysicsResult<String> {
        serde_json::to_string(self).map_err(|e| PhysicsError::InvalidConfig { reason: e.to_string() })
    }

    pub fn validate(&self) -> PhysicsResult<()> {
        if !self.gravity.is_finite() {
            return Err(invalid("gravity must be finite"));
        }
        if self.velocity_iterations == 0 || self.velocity_iterations > MAX_VELOCITY_ITERATIONS {
            return Err(PhysicsError::InvalidConfig {
                reason: format!(
                    "velocityIterations must be in 1..={} (got {})",
                    MAX_VELOCITY_ITERATIONS, self.velocity_iterations
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.bias_factor) {
            return Err(invalid("biasFactor must be in [0, 1]"));
        }
        if !(self.linear_slop >= 0.0 && self.linear_slop.is_finite()) {
            return Err(invalid("linearSlop must be non-negative"));
        }
        if !(self.restitution_threshold >= 0.0 && self.restitution_threshold.is_finite()) {
            return Err(invalid("restitutionThreshold must be non-negative"));
        }
        if !(self.contact_margin >= 0.0 && self.contact_margin.is_finite()) {
            return Err(invalid("contactMargin must be non-negative"));
        }
        if let Timestep::Fixed { dt, max_substeps } = self.timestep {
            if !(dt > 0.0 && dt.is_finite()) {
                return Err(invalid("fixed timestep dt must be positive"));
            }
            if max_substeps == 0 {
                return Err(invalid("maxSubsteps must be at least 1"));
            }
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> PhysicsError {
    PhysicsError::InvalidConfig { reason: reason.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SimulationConfig::from_json(r#"{"velocityIterations": 4, "warmStarting": false}"#)
            .unwrap();
        assert_eq!(config.velocity_iterations, 4);
        assert!(!config.warm_starting);
        assert!(config.position_correction);
        assert_eq!(config.gravity, Vec2::new(0.0, -9.8));
    }

    #[test]
    fn timestep_modes_parse() {
        let config = SimulationConfig::from_json(r#"{"timestep": {"mode": "variable"}}"#).unwrap();
        assert_eq!(config.timestep, Timestep::Variable);
        let config = SimulationConfig::from_json(
            r#"{"timestep": {"mode": "fixed", "dt": 0.01, "maxSubsteps": 3}}"#,
        )
        .unwrap();
        assert_eq!(config.timestep, Timestep::Fixed { dt: 0.01, max_substeps: 3 });
    }

    #[test]
    fn zero_iterations_rejected() {
        let err = SimulationConfig::from_json(r#"{"velocityIterations": 0}"#);
        assert!(matches!(err, Err(PhysicsError::InvalidConfig { .. })));
    }

    #[test]
    fn negative_contact_margin_rejected() {
        let err = SimulationConfig::from_json(r#"{"contactMargin": -0.5}"#);
        assert!(matches!(err, Err(PhysicsError::InvalidConfig { .. })));
    }

    #[test]
    fn serialized_config_reads_back() {
        let mut config = SimulationConfig::default();
        config.contact_margin = 0.0;
        config.timestep = Timestep::Variable;
        let json = config.to_json().unwrap();
        assert!(json.contains(r#""contactMargin":0.0"#));
        assert_eq!(SimulationConfig::from_json(&json).unwrap(), config);
    }
}
