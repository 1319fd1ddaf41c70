use rush_core::{build_app_with_config, drain_game_events, run_tick, GameConfig};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

fn bench_day(c: &mut Criterion) {
    let mut group = c.benchmark_group("day");

    // Shorter base rates keep the board crowded enough to stress timer churn.
    for base_rate in [1600.0f32, 800.0, 400.0] {
        group.bench_with_input(
            BenchmarkId::new("base_rate", base_rate as u32),
            &base_rate,
            |b, &base_rate| {
                b.iter_batched(
                    || {
                        let mut config = GameConfig::builtin();
                        config.spawn.base_rate = base_rate;
                        config.spawn.rate_floor = config.spawn.rate_floor.min(base_rate);
                        build_app_with_config(config)
                    },
                    |mut app| {
                        for _ in 0..900 {
                            run_tick(&mut app);
                            drain_game_events(&mut app);
                        }
                    },
                    BatchSize::SmallInput,
                )
            },
        );
    }

    group.finish();
}

criterion_group!(tick_benches, bench_day);
criterion_main!(tick_benches);
