//! Integration tests: neighborhood sizes per structure and order, and
//! the interior neighbor count on large lattices.

use potts_core::Site;
use potts_lattice::{
    Boundary, HalfAxis, LatticeConfig, LatticeDescriptor, NeighborhoodSpec, Structure,
};

fn cumulative(structure: Structure) -> Vec<usize> {
    structure
        .per_order()
        .iter()
        .scan(0, |acc, n| {
            *acc += n;
            Some(*acc)
        })
        .collect()
}

#[test]
fn every_order_resolves_to_its_cumulative_size() {
    for structure in [
        Structure::Linear,
        Structure::Square,
        Structure::Hexagonal,
        Structure::Cubic,
    ] {
        for (k, expected) in cumulative(structure).into_iter().enumerate() {
            let extent = [16, 16, 16];
            let cfg = LatticeConfig::new(structure, extent)
                .with_neighborhood(NeighborhoodSpec::Order(k as u32 + 1));
            let lattice = LatticeDescriptor::new(&cfg).unwrap();
            assert_eq!(
                lattice.default_neighborhood().len(),
                expected,
                "{structure:?} order {}",
                k + 1
            );
            let center = lattice.site_at(lattice.site_count() / 2);
            assert_eq!(lattice.neighborhood(center).count(), expected);
        }
    }
}

#[test]
fn noflux_line_ends_lose_neighbors() {
    let cfg = LatticeConfig::new(Structure::Linear, [10, 1, 1])
        .with_boundary(HalfAxis::MinusX, Boundary::NoFlux)
        .with_neighborhood(NeighborhoodSpec::Order(2));
    let lattice = LatticeDescriptor::new(&cfg).unwrap();
    let ends: Vec<Site> = lattice.neighborhood(Site::new(0, 0, 0)).collect();
    assert_eq!(ends, vec![Site::new(1, 0, 0), Site::new(2, 0, 0)]);
    let near_end: Vec<Site> = lattice.neighborhood(Site::new(8, 0, 0)).collect();
    assert_eq!(near_end.len(), 3);
}

#[test]
fn flat_lattices_never_reach_into_z() {
    let cfg = LatticeConfig::new(Structure::Square, [4, 4, 1])
        .with_neighborhood(NeighborhoodSpec::Order(6));
    let lattice = LatticeDescriptor::new(&cfg).unwrap();
    for site in lattice.sites() {
        assert!(lattice.neighborhood(site).all(|n| n.z == 0));
    }
}
