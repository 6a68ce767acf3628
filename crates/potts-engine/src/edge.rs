//! Boundary-site tracking for the edge-list stepper.

use indexmap::IndexSet;
use potts_cells::CellRegistry;
use potts_core::Site;
use potts_lattice::Neighborhood;
use potts_random::RandomSource;

/// Sites with at least one neighbor, over the update neighborhood, owned
/// by a different cell.
///
/// Only those sites can yield a non-trivial copy attempt. The set is
/// kept in insertion order so sampling is reproducible.
#[derive(Clone, Debug, Default)]
pub struct EdgeTracker {
    sites: IndexSet<usize>,
}

impl EdgeTracker {
    /// Scan the whole lattice.
    pub fn build(registry: &CellRegistry, hood: &Neighborhood) -> Self {
        let lattice = registry.lattice();
        let sites = (0..lattice.site_count())
            .filter(|&i| is_edge(registry, hood, lattice.site_at(i)))
            .collect();
        Self { sites }
    }

    /// Number of boundary sites.
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Whether no site touches another cell.
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Whether the site at canonical `index` is a boundary site.
    pub fn contains(&self, index: usize) -> bool {
        self.sites.contains(&index)
    }

    /// Re-examine `site` and its neighbors after `site` changed owner.
    pub fn update_around(&mut self, registry: &CellRegistry, hood: &Neighborhood, site: Site) {
        let lattice = registry.lattice();
        self.update_site(registry, hood, site);
        for nb in lattice.neighbors(hood, site) {
            self.update_site(registry, hood, nb);
        }
    }

    fn update_site(&mut self, registry: &CellRegistry, hood: &Neighborhood, site: Site) {
        let Some(index) = registry.lattice().index_of(site) else {
            return;
        };
        if is_edge(registry, hood, site) {
            self.sites.insert(index);
        } else {
            self.sites.swap_remove(&index);
        }
    }

    /// Draw a boundary site uniformly.
    pub fn pick(&self, registry: &CellRegistry, rng: &mut RandomSource) -> Option<Site> {
        if self.sites.is_empty() {
            return None;
        }
        let k = rng.bounded_int(self.sites.len() as u64 - 1) as usize;
        self.sites
            .get_index(k)
            .map(|&index| registry.lattice().site_at(index))
    }
}

fn is_edge(registry: &CellRegistry, hood: &Neighborhood, site: Site) -> bool {
    let Ok(owner) = registry.cell_at(site) else {
        return false;
    };
    registry
        .lattice()
        .neighbors(hood, site)
        .any(|nb| registry.cell_at(nb).is_ok_and(|o| o != owner))
}

#[cfg(test)]
mod tests {
    use super::*;
    use potts_cells::UpdateProposal;
    use potts_core::CellTypeId;
    use potts_lattice::NeighborhoodSpec;
    use potts_test_utils::{block, periodic_square};

    fn order1(reg: &CellRegistry) -> Neighborhood {
        reg.lattice()
            .resolve_neighborhood(&NeighborhoodSpec::Order(1))
            .unwrap()
    }

    #[test]
    fn uniform_lattice_has_no_edges() {
        let reg = periodic_square(6);
        let tracker = EdgeTracker::build(&reg, &order1(&reg));
        assert!(tracker.is_empty());
        let mut rng = RandomSource::from_seed(1);
        assert_eq!(tracker.pick(&reg, &mut rng), None);
    }

    #[test]
    fn block_boundary_is_tracked() {
        let mut reg = periodic_square(10);
        block(&mut reg, CellTypeId(1), 3..6, 3..6);
        let hood = order1(&reg);
        let tracker = EdgeTracker::build(&reg, &hood);
        // 8 rim sites of the block plus 12 medium sites facing it.
        assert_eq!(tracker.len(), 20);
        let center = reg.lattice().index_of(Site::new(4, 4, 0)).unwrap();
        assert!(!tracker.contains(center));
    }

    #[test]
    fn incremental_update_matches_rebuild() {
        let mut reg = periodic_square(10);
        block(&mut reg, CellTypeId(1), 3..6, 3..6);
        let hood = order1(&reg);
        let mut tracker = EdgeTracker::build(&reg, &hood);
        let moves = [
            (Site::new(6, 4, 0), Site::new(5, 4, 0)),
            (Site::new(4, 3, 0), Site::new(4, 2, 0)),
            (Site::new(7, 4, 0), Site::new(6, 4, 0)),
        ];
        for (focus, source) in moves {
            let p = UpdateProposal::build(&reg, focus, source).unwrap();
            reg.commit(&p).unwrap();
            tracker.update_around(&reg, &hood, focus);
            let fresh = EdgeTracker::build(&reg, &hood);
            let mut a: Vec<usize> = tracker.sites.iter().copied().collect();
            let mut b: Vec<usize> = fresh.sites.iter().copied().collect();
            a.sort_unstable();
            b.sort_unstable();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn picks_only_boundary_sites() {
        let mut reg = periodic_square(10);
        block(&mut reg, CellTypeId(1), 3..6, 3..6);
        let hood = order1(&reg);
        let tracker = EdgeTracker::build(&reg, &hood);
        let mut rng = RandomSource::from_seed(9);
        for _ in 0..200 {
            let site = tracker.pick(&reg, &mut rng).unwrap();
            let index = reg.lattice().index_of(site).unwrap();
            assert!(tracker.contains(index));
        }
    }
}
