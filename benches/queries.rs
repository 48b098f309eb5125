//! Performance benchmarks for loads and queries.
//!
//! Run with: `cargo bench --bench queries`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;

use social_graph_kernel::demo::{demo_user_name, generate_network, DemoConfig};
use social_graph_kernel::ingest;
use social_graph_kernel::{
    export_graph, mutual_friends, recommend, statistics, top_influencers, IngestLimits,
    SocialGraph,
};

fn network(users: usize) -> Vec<[String; 2]> {
    let config = DemoConfig {
        users,
        ..DemoConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(7);
    generate_network(&config, &mut rng)
}

fn build(rows: &[[String; 2]]) -> SocialGraph {
    ingest::build(rows, &IngestLimits::default())
        .expect("benchmark network fits default limits")
        .0
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");

    for users in [100usize, 1_000, 10_000] {
        let rows = network(users);
        group.throughput(Throughput::Elements(rows.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(users), &rows, |b, rows| {
            b.iter(|| build(black_box(rows)))
        });
    }

    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");

    for users in [100usize, 1_000, 10_000] {
        let graph = build(&network(users));
        let first = demo_user_name(0);
        let second = demo_user_name(1);

        group.bench_with_input(BenchmarkId::new("recommend", users), &graph, |b, g| {
            b.iter(|| recommend(g, black_box(&first), 10))
        });
        group.bench_with_input(BenchmarkId::new("mutual_friends", users), &graph, |b, g| {
            b.iter(|| mutual_friends(g, black_box(&first), black_box(&second)))
        });
        group.bench_with_input(BenchmarkId::new("top_influencers", users), &graph, |b, g| {
            b.iter(|| top_influencers(g, 10))
        });
        group.bench_with_input(BenchmarkId::new("statistics", users), &graph, |b, g| {
            b.iter(|| statistics(g))
        });
        group.bench_with_input(BenchmarkId::new("export_graph", users), &graph, |b, g| {
            b.iter(|| export_graph(g))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_load, bench_queries);
criterion_main!(benches);
