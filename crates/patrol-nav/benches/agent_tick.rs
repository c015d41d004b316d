use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use patrol_core::{AgentId, Obstacle, Rect, TickContext, Vec3, Waypoint};
use patrol_nav::{Agent, AgentConfig, FloorView, NavTuning, NullEventSink};

fn make_obstacles(count: usize) -> Vec<Obstacle> {
    (0..count)
        .map(|i| {
            let x = -8.0 + (i % 8) as f32 * 2.2;
            let z = -8.0 + (i / 8) as f32 * 2.2;
            Obstacle::new(x, z, 1.2, 0.6)
        })
        .collect()
}

fn make_agent() -> Agent {
    let config = AgentConfig::new(
        "bench",
        Vec3::new(-9.0, 0.0, -9.0),
        vec![
            Waypoint::new(9.0, 0.0, 9.0),
            Waypoint::new(-9.0, 0.0, 9.0),
            Waypoint::new(9.0, 0.0, -9.0),
        ],
    );
    Agent::new(AgentId(0), config, &NavTuning::default()).expect("agent")
}

fn bench_agent_tick(c: &mut Criterion) {
    let bounds = Some(Rect::new(-10.0, 10.0, -10.0, 10.0));
    let dt = 1.0 / 60.0;

    let mut group = c.benchmark_group("patrol-nav/agent_tick");

    for &n in &[0usize, 16, 64] {
        let obstacles = make_obstacles(n);
        let mut agent = make_agent();
        let mut tick = 0u64;
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &_n| {
            b.iter(|| {
                tick += 1;
                let ctx = TickContext::new(tick, dt, tick as f64 * f64::from(dt));
                agent.tick(&ctx, &FloorView::new(&obstacles, bounds), &mut NullEventSink);
                black_box(agent.position());
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_agent_tick);
criterion_main!(benches);
