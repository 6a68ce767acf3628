//! Criterion micro-benchmarks for lattice and neighborhood operations.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use potts_core::Vec3;
use potts_lattice::{Boundary, HalfAxis, LatticeConfig, LatticeDescriptor, NeighborhoodSpec, Structure};

fn lattice(structure: Structure, extent: [u32; 3]) -> LatticeDescriptor {
    LatticeDescriptor::new(&LatticeConfig::new(structure, extent)).unwrap()
}

/// Benchmark: iterate the order-2 neighborhood of every site of a
/// 100×100 periodic square lattice.
fn bench_neighbors_square_10k(c: &mut Criterion) {
    let l = lattice(Structure::Square, [100, 100, 1]);
    let hood = l.resolve_neighborhood(&NeighborhoodSpec::Order(2)).unwrap();

    c.bench_function("neighbors_square_order2_10k", |b| {
        b.iter(|| {
            let mut n = 0usize;
            for site in l.sites() {
                n += l.neighbors(&hood, site).count();
            }
            black_box(n)
        });
    });
}

/// Benchmark: the same on a hexagonal lattice.
fn bench_neighbors_hex_10k(c: &mut Criterion) {
    let l = lattice(Structure::Hexagonal, [100, 100, 1]);
    let hood = l.resolve_neighborhood(&NeighborhoodSpec::Order(2)).unwrap();

    c.bench_function("neighbors_hex_order2_10k", |b| {
        b.iter(|| {
            let mut n = 0usize;
            for site in l.sites() {
                n += l.neighbors(&hood, site).count();
            }
            black_box(n)
        });
    });
}

/// Benchmark: order-1 neighborhood on a 32³ cubic lattice with noflux
/// z faces, so boundary offsets are dropped.
fn bench_neighbors_cubic_noflux(c: &mut Criterion) {
    let config = LatticeConfig::new(Structure::Cubic, [32, 32, 32])
        .with_boundary(HalfAxis::MinusZ, Boundary::NoFlux);
    let l = LatticeDescriptor::new(&config).unwrap();
    let hood = l.resolve_neighborhood(&NeighborhoodSpec::Order(1)).unwrap();

    c.bench_function("neighbors_cubic_noflux_32k", |b| {
        b.iter(|| {
            let mut n = 0usize;
            for site in l.sites() {
                n += l.neighbors(&hood, site).count();
            }
            black_box(n)
        });
    });
}

/// Benchmark: minimum-image distances between 1000 point pairs.
fn bench_node_distance(c: &mut Criterion) {
    let l = lattice(Structure::Square, [100, 100, 1]);
    let pairs: Vec<(Vec3, Vec3)> = (0u64..1000)
        .map(|i| {
            let a = (i.wrapping_mul(6364136223846793007) % 100) as f64;
            let b = (i.wrapping_mul(1442695040888963407) % 100) as f64;
            (Vec3::new(a, b, 0.0), Vec3::new(b, a, 0.0))
        })
        .collect();

    c.bench_function("node_distance_1k_pairs", |b| {
        b.iter(|| {
            for &(p, q) in &pairs {
                black_box(l.node_distance(p, q));
            }
        });
    });
}

criterion_group!(
    benches,
    bench_neighbors_square_10k,
    bench_neighbors_hex_10k,
    bench_neighbors_cubic_noflux,
    bench_node_distance
);
criterion_main!(benches);
