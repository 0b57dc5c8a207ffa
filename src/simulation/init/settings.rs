use crate::domain::config::SimulationConfig;
use crate::domain::error::PhysicsResult;
use crate::rigid_body::Vec2;

use super::perf_stats::PerfStats;
use super::WorldCore;

pub(super) fn enable_perf_metrics(world: &mut WorldCore, enabled: bool) {
    world.perf_enabled = enabled;
    if !enabled {
        world.perf_stats.reset();
    }
}

pub(super) fn get_perf_stats(world: &WorldCore) -> PerfStats {
    if world.perf_enabled {
        world.perf_stats.clone()
    } else {
        PerfStats::default()
    }
}

pub(super) fn load_config_json(world: &mut WorldCore, json: &str) -> PhysicsResult<()> {
    match SimulationConfig::from_json(json) {
        Ok(config) => {
            world.config = config;
            world.accumulator = 0.0;
            Ok(())
        }
        Err(e) => {
            console_warn!("rejected simulation config: {}", e);
            Err(e)
        }
    }
}

pub(super) fn set_gravity(world: &mut WorldCore, x: f32, y: f32) {
    if x.is_finite() && y.is_finite() {
        world.config.gravity = Vec2::new(x, y);
    }
}

pub(super) fn set_velocity_iterations(world: &mut WorldCore, iterations: u32) {
    let mut config = world.config.clone();
    config.velocity_iterations = iterations;
    if config.validate().is_ok() {
        world.config = config;
    }
}

pub(super) fn set_warm_starting(world: &mut WorldCore, enabled: bool) {
    world.config.warm_starting = enabled;
}

pub(super) fn set_position_correction(world: &mut WorldCore, enabled: bool) {
    world.config.position_correction = enabled;
}

pub(super) fn set_accumulate_impulses(world: &mut WorldCore, enabled: bool) {
    world.config.accumulate_impulses = enabled;
}
