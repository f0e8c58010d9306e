use criterion::{criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use simulation::tick::simulate_tick_with_rng;
use simulation::world_init::create_initial_game_state_with_rng;

fn bench_full_tick(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let state = create_initial_game_state_with_rng(96, "Bench City", &mut rng);
    c.bench_function("simulate_tick_96x96", |b| {
        b.iter(|| simulate_tick_with_rng(&state, &mut rng));
    });
}

criterion_group!(benches, bench_full_tick);
criterion_main!(benches);
