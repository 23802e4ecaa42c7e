use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use drone_sim::battery::PowerSupply;
use drone_sim::dispatch::PolicyKind;
use drone_sim::engine::run_simulation;
use drone_sim::models::{AssignmentConfig, ProfileConfig, SimConfig, StationConfig};
use drone_sim::station::CapacityMode;

const STATIONS: usize = 3;
const SERVERS: usize = 4;

fn build_config(dispatch: PolicyKind) -> SimConfig {
    let stations = (0..STATIONS)
        .map(|idx| StationConfig {
            power_supply: PowerSupply::W65,
            service_times: (0..SERVERS).map(|s| 10.0 + (idx + s) as f64).collect(),
            capacity: CapacityMode::Bounded(50),
            dispatch,
            max_recharge_cycles: None,
            activation_budget: None,
            working_slots: vec![[0.0, f64::INFINITY]],
            solar_panel: idx % 2 == 0,
        })
        .collect();

    SimConfig {
        stations,
        arrival_rate: 1.0,
        sim_time: 20_000.0,
        seed: 42,
        profile: ProfileConfig::Daily,
        assignment: AssignmentConfig::Random,
        relaunch_on_recharge: false,
    }
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");
    for policy in PolicyKind::ALL {
        let config = build_config(policy);
        group.bench_with_input(
            BenchmarkId::from_parameter(policy),
            &config,
            |bencher, config| bencher.iter(|| run_simulation(black_box(config)).unwrap()),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_engine);
criterion_main!(benches);
