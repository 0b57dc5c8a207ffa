use impulse_engine::{BodyDescriptor, Collider, Vec2, WorldCore};

#[test]
fn perf_smoke_step() {
    let mut world = WorldCore::new();
    world.enable_perf_metrics(true);
    world
        .create_body(&BodyDescriptor::fixed(Collider::cuboid(40.0, 0.5), Vec2::new(0.0, -0.5)))
        .expect("ground");
    for x in 0..16 {
        for y in 0..8 {
            let position = Vec2::new(x as f32 * 1.1 - 8.0, y as f32 * 1.05 + 0.5);
            let collider = if (x + y) % 2 == 0 { Collider::cuboid(0.5, 0.5) } else { Collider::circle(0.5) };
            world
                .create_body(&BodyDescriptor::dynamic(collider, position))
                .expect("valid body");
        }
    }
    for _ in 0..10 {
        world.step_default(1.0 / 60.0);
    }
    let stats = world.get_perf_stats();
    assert!(stats.step_ms() >= 0.0);
    assert_eq!(stats.body_count(), 129);
    assert!(stats.pair_count() > 0);
    assert!(stats.contact_count() > 0);
    assert!(stats.residual_velocity_error().is_finite());
}
