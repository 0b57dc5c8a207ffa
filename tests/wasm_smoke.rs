#![cfg(target_arch = "wasm32")]

use impulse_engine::World;
use wasm_bindgen_test::*;

#[wasm_bindgen_test]
fn facade_spawns_steps_and_reports() {
    let mut world = World::new();
    world.enable_perf_metrics(true);
    let ground = world.create_box(0.0, -0.5, 10.0, 0.5, 0.0, true).expect("ground");
    let crate_box = world.create_box(0.0, 0.5, 0.5, 0.5, 0.0, false).expect("box");

    for _ in 0..30 {
        world.step(1.0 / 60.0);
    }

    assert_eq!(world.body_count(), 2);
    assert!(world.is_alive(ground));
    assert_eq!(world.body_state(crate_box).len(), 6);
    assert!(world.get_perf_stats().contact_count() > 0);
    assert!(world.create_circle(0.0, 0.0, -1.0, false).is_err());

    assert!(world.destroy_body(crate_box));
    assert!(world.body_state(crate_box).is_empty());
}
