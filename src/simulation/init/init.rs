use crate::domain::config::SimulationConfig;
use crate::rigid_body_system::RigidBodySystem;

use super::perf_stats::PerfStats;
use super::WorldCore;

pub(super) fn create_world_core(config: SimulationConfig) -> WorldCore {
    WorldCore {
        rigid_bodies: RigidBodySystem::new(),
        config,
        frame: 0,
        accumulator: 0.0,
        perf_enabled: false,
        perf_stats: PerfStats::default(),
    }
}
