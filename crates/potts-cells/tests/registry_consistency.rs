//! Property tests: incremental bookkeeping matches a full recompute.
//!
//! Random copy attempts are committed one by one; after every commit
//! the interface table must equal a from-scratch recount, every node
//! count must equal its owned-site set. On lattices without periodic
//! axes, centers must also match a recompute from the nodes (with
//! wrapping, a scattered cell has no well-defined minimum-image mean).

use std::sync::Arc;

use potts_cells::{CellRegistry, UpdateProposal};
use potts_core::{CellId, CellTypeId, Site};
use potts_lattice::{
    Boundary, HalfAxis, LatticeConfig, LatticeDescriptor, NeighborhoodSpec, Structure,
};
use proptest::prelude::*;

fn seeded_registry(config: LatticeConfig, hood: u32) -> CellRegistry {
    let lattice = LatticeDescriptor::new(&config).unwrap();
    let mut reg =
        CellRegistry::new(Arc::new(lattice), &NeighborhoodSpec::Order(hood), 4).unwrap();
    let a = reg.create_cell(CellTypeId(1));
    let b = reg.create_cell(CellTypeId(2));
    let s0 = reg.create_cell(CellTypeId(3));
    let s1 = reg.create_cell(CellTypeId(3));
    let sites: Vec<Site> = reg.lattice().sites().collect();
    for (i, site) in sites.into_iter().enumerate() {
        let owner = match i % 7 {
            0 | 1 => a,
            2 => b,
            3 => s0,
            4 => s1,
            _ => CellId::MEDIUM,
        };
        reg.assign(site, owner).unwrap();
    }
    reg.create_composite(CellTypeId(4), &[s0, s1]).unwrap();
    reg
}

fn closed_square(w: u32, h: u32) -> LatticeConfig {
    LatticeConfig::new(Structure::Square, [w, h, 1])
        .with_boundary(HalfAxis::MinusX, Boundary::NoFlux)
        .with_boundary(HalfAxis::MinusY, Boundary::NoFlux)
}

fn assert_consistent(reg: &CellRegistry) {
    assert_eq!(reg.interface_table(), reg.recomputed_interfaces());
    let mut owned = 0;
    for record in reg.cells() {
        let id = record.id();
        if reg.members(id).is_ok() {
            let sum: usize = reg
                .members(id)
                .unwrap()
                .iter()
                .map(|&m| reg.node_count(m).unwrap())
                .sum();
            assert_eq!(reg.node_count(id).unwrap(), sum);
            continue;
        }
        let nodes = reg.nodes(id).unwrap();
        assert_eq!(reg.node_count(id).unwrap(), nodes.len());
        for &site in nodes {
            assert_eq!(reg.cell_at(site), Ok(id));
        }
        owned += nodes.len();
        let periodic = (0..reg.lattice().dims()).any(|axis| reg.lattice().is_periodic(axis));
        if !id.is_medium() && !periodic {
            let drift = (reg.center(id).unwrap() - reg.recomputed_center(id).unwrap()).length();
            assert!(drift < 1e-6, "center drift {drift} on cell {id}");
        }
    }
    assert_eq!(owned, reg.lattice().site_count());
}

fn run_attempts(mut reg: CellRegistry, attempts: &[(usize, usize)]) {
    let offsets = reg.lattice().default_neighborhood().offsets().to_vec();
    for &(index, dir) in attempts {
        let focus = reg.lattice().site_at(index % reg.lattice().site_count());
        let Some(source) = reg.lattice().resolve(focus + offsets[dir % offsets.len()]) else {
            continue;
        };
        if let Some(proposal) = UpdateProposal::build(&reg, focus, source) {
            let predicted = proposal.node_count_after(&reg, proposal.gaining()).unwrap();
            reg.commit(&proposal).unwrap();
            assert_eq!(reg.node_count(proposal.gaining()).unwrap(), predicted);
            assert_consistent(&reg);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn square_moore_commits_stay_consistent(
        attempts in prop::collection::vec((0usize..10_000, 0usize..8), 1..60)
    ) {
        run_attempts(seeded_registry(LatticeConfig::new(Structure::Square, [7, 6, 1]), 2), &attempts);
    }

    #[test]
    fn hexagonal_commits_stay_consistent(
        attempts in prop::collection::vec((0usize..10_000, 0usize..6), 1..60)
    ) {
        run_attempts(seeded_registry(LatticeConfig::new(Structure::Hexagonal, [6, 6, 1]), 1), &attempts);
    }

    #[test]
    fn cubic_commits_stay_consistent(
        attempts in prop::collection::vec((0usize..10_000, 0usize..6), 1..40)
    ) {
        run_attempts(seeded_registry(LatticeConfig::new(Structure::Cubic, [4, 4, 4]), 1), &attempts);
    }

    #[test]
    fn tiny_periodic_ring_stays_consistent(
        attempts in prop::collection::vec((0usize..100, 0usize..2), 1..60)
    ) {
        run_attempts(seeded_registry(LatticeConfig::new(Structure::Linear, [3, 1, 1]), 1), &attempts);
    }

    #[test]
    fn closed_square_centers_track_nodes(
        attempts in prop::collection::vec((0usize..10_000, 0usize..8), 1..60)
    ) {
        run_attempts(seeded_registry(closed_square(7, 6), 2), &attempts);
    }
}

#[test]
fn seeded_layout_is_consistent() {
    assert_consistent(&seeded_registry(LatticeConfig::new(Structure::Square, [7, 6, 1]), 2));
    assert_consistent(&seeded_registry(closed_square(7, 6), 2));
}
