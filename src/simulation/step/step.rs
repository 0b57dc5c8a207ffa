use crate::domain::config::{SimulationConfig, Timestep};
use crate::systems::solver::StepContext;

use super::{PerfTimer, WorldCore};

pub(super) fn step(world: &mut WorldCore, dt: f32, config: &SimulationConfig) {
    if !(dt > 0.0 && dt.is_finite()) || config.validate().is_err() {
        return;
    }
    let ctx = StepContext::new(dt, config);
    let iterations = config.velocity_iterations;

    let perf_on = world.perf_enabled;
    if !perf_on {
        world.rigid_bodies.step(&ctx, config.gravity, iterations);
        world.frame += 1;
        return;
    }

    world.perf_stats.reset();
    let mut timer = PerfTimer::start();

    // === BROAD PHASE ===
    let pruned = world.rigid_bodies.prune_dead();
    let pairs = world.rigid_bodies.update_broad_phase();
    world.perf_stats.broad_phase_ms = timer.lap_ms();

    // === NARROW PHASE ===
    let manifolds = world.rigid_bodies.collide(&pairs, ctx.contact_margin);
    let carried = world.rigid_bodies.merge_contacts(manifolds, ctx.warm_starting);
    world.perf_stats.narrow_phase_ms = timer.lap_ms();

    // === SOLVER ===
    world.rigid_bodies.integrate_velocities(config.gravity, dt);
    let solve = world.rigid_bodies.solve(&ctx, iterations);
    world.perf_stats.solver_ms = timer.lap_ms();

    // === INTEGRATION ===
    world.rigid_bodies.integrate_positions(dt);
    world.perf_stats.integrate_ms = timer.lap_ms();

    // Position integration leaves velocities alone, so this still reflects the solve
    world.perf_stats.residual_velocity_error = world.rigid_bodies.residual_velocity_error();

    world.perf_stats.body_count = world.rigid_bodies.body_count() as u32;
    world.perf_stats.joint_count = world.rigid_bodies.joint_count() as u32;
    world.perf_stats.pair_count = pairs.len() as u32;
    world.perf_stats.contact_count = solve.contact_points;
    world.perf_stats.warm_started_points = carried as u32;
    world.perf_stats.skipped_constraints = solve.skipped_constraints;
    world.perf_stats.pruned_joints = pruned as u32;
    world.perf_stats.step_ms = timer.total_ms();

    world.frame += 1;
}

/// Turn elapsed wall time into solver steps according to `config.timestep`.
///
/// Returns the number of steps taken.
pub(super) fn advance(world: &mut WorldCore, elapsed: f32, config: &SimulationConfig) -> u32 {
    if !(elapsed > 0.0 && elapsed.is_finite()) {
        return 0;
    }
    match config.timestep {
        Timestep::Variable => {
            step(world, elapsed, config);
            1
        }
        Timestep::Fixed { dt, max_substeps } => {
            world.accumulator += elapsed;
            let mut steps = 0;
            while world.accumulator >= dt && steps < max_substeps {
                step(world, dt, config);
                world.accumulator -= dt;
                steps += 1;
            }
            // Falling behind: drop the backlog instead of spiraling
            if steps == max_substeps && world.accumulator >= dt {
                world.accumulator = 0.0;
            }
            steps
        }
    }
}
