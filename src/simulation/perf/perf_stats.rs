use wasm_bindgen::prelude::*;

#[wasm_bindgen]
#[derive(Clone, Debug, Default)]
pub struct PerfStats {
    pub(super) step_ms: f64,
    pub(super) broad_phase_ms: f64,
    pub(super) narrow_phase_ms: f64,
    pub(super) solver_ms: f64,
    pub(super) integrate_ms: f64,
    pub(super) body_count: u32,
    pub(super) joint_count: u32,
    pub(super) pair_count: u32,
    pub(super) contact_count: u32,
    pub(super) warm_started_points: u32,
    pub(super) skipped_constraints: u32,
    pub(super) pruned_joints: u32,
    pub(super) residual_velocity_error: f32,
}

impl PerfStats {
    pub(crate) fn reset(&mut self) {
        *self = PerfStats::default();
    }
}

#[wasm_bindgen]
impl PerfStats {
    #[wasm_bindgen(getter)]
    pub fn step_ms(&self) -> f64 { self.step_ms }
    #[wasm_bindgen(getter)]
    pub fn broad_phase_ms(&self) -> f64 { self.broad_phase_ms }
    #[wasm_bindgen(getter)]
    pub fn narrow_phase_ms(&self) -> f64 { self.narrow_phase_ms }
    #[wasm_bindgen(getter)]
    pub fn solver_ms(&self) -> f64 { self.solver_ms }
    #[wasm_bindgen(getter)]
    pub fn integrate_ms(&self) -> f64 { self.integrate_ms }
    #[wasm_bindgen(getter)]
    pub fn body_count(&self) -> u32 { self.body_count }
    #[wasm_bindgen(getter)]
    pub fn joint_count(&self) -> u32 { self.joint_count }
    #[wasm_bindgen(getter)]
    pub fn pair_count(&self) -> u32 { self.pair_count }
    #[wasm_bindgen(getter)]
    pub fn contact_count(&self) -> u32 { self.contact_count }
    #[wasm_bindgen(getter)]
    pub fn warm_started_points(&self) -> u32 { self.warm_started_points }
    #[wasm_bindgen(getter)]
    pub fn skipped_constraints(&self) -> u32 { self.skipped_constraints }
    #[wasm_bindgen(getter)]
    pub fn pruned_joints(&self) -> u32 { self.pruned_joints }
    /// Contact velocity error left after the last solve
    #[wasm_bindgen(getter)]
    pub fn residual_velocity_error(&self) -> f32 { self.residual_velocity_error }
}
