//! Lattice contract test helpers.
//!
//! These functions verify the invariants the cell registry relies on:
//! a complete canonical ordering and a symmetric neighbor relation
//! (with multiplicity), so interface counts stay symmetric.

use potts_core::Site;

use crate::descriptor::LatticeDescriptor;

fn multiplicity(sites: &[Site], target: Site) -> usize {
    sites.iter().filter(|s| **s == target).count()
}

/// Assert that `sites()` enumerates every index exactly once.
pub fn assert_canonical_ordering_complete(lattice: &LatticeDescriptor) {
    let sites: Vec<Site> = lattice.sites().collect();
    assert_eq!(sites.len(), lattice.site_count());
    for (i, site) in sites.iter().enumerate() {
        assert_eq!(lattice.index_of(*site), Some(i), "site {site} out of order");
    }
}

/// Whether `b` appears in N(a) exactly as often as `a` appears in N(b).
pub fn neighbor_relation_is_symmetric(lattice: &LatticeDescriptor) -> bool {
    lattice.sites().all(|a| {
        let na: Vec<Site> = lattice.neighborhood(a).collect();
        na.iter().all(|&b| {
            let nb: Vec<Site> = lattice.neighborhood(b).collect();
            multiplicity(&na, b) == multiplicity(&nb, a)
        })
    })
}

/// Assert that every neighbor lies on the lattice.
pub fn assert_neighbors_in_lattice(lattice: &LatticeDescriptor) {
    for site in lattice.sites() {
        for nb in lattice.neighborhood(site) {
            assert!(lattice.contains(nb), "neighbor {nb} of {site} off lattice");
        }
    }
}

/// Run every compliance check.
pub fn run_full_compliance(lattice: &LatticeDescriptor) {
    assert_canonical_ordering_complete(lattice);
    assert_neighbors_in_lattice(lattice);
    assert!(
        neighbor_relation_is_symmetric(lattice),
        "neighbor relation is not symmetric"
    );
}
