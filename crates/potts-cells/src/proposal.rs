//! Immutable descriptions of one candidate copy attempt.

use potts_core::{CellId, RegistryError, Site, Vec3};
use smallvec::SmallVec;

use crate::registry::{CellRegistry, NeighborStats};

/// How a copy attempt changes cell membership.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// A cell grows into the medium.
    Add,
    /// The medium takes a site from a cell.
    Remove,
    /// One cell takes a site from another.
    AddAndRemove,
}

/// The part a cell plays in a proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellRole {
    /// The cell gains the focus site.
    Gains,
    /// The cell loses the focus site.
    Loses,
    /// A composite whose members trade the focus between themselves.
    Shifts,
}

/// One touched interface entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InterfaceEntry {
    /// The other cell.
    pub neighbor: CellId,
    /// Length in the committed state.
    pub before: u32,
    /// Length if the proposal were committed.
    pub after: u32,
}

/// Every interface entry of one cell that the proposal touches.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InterfaceChange {
    entries: SmallVec<[InterfaceEntry; 8]>,
}

impl InterfaceChange {
    fn from_deltas(registry: &CellRegistry, cell: CellId, deltas: &[(CellId, i64)]) -> Self {
        let entries = deltas
            .iter()
            .map(|&(neighbor, delta)| {
                let before = registry.interface_length(cell, neighbor);
                let after = i64::from(before) + delta;
                debug_assert!(after >= 0, "interface {cell}-{neighbor} would go negative");
                InterfaceEntry {
                    neighbor,
                    before,
                    after: after.max(0) as u32,
                }
            })
            .collect();
        Self { entries }
    }

    /// Touched entries in first-seen order.
    pub fn entries(&self) -> &[InterfaceEntry] {
        &self.entries
    }

    /// The entry for one neighbor, if touched.
    pub fn get(&self, neighbor: CellId) -> Option<&InterfaceEntry> {
        self.entries.iter().find(|e| e.neighbor == neighbor)
    }

    /// Net change of the cell's total interface length.
    pub fn total_delta(&self) -> i64 {
        self.entries
            .iter()
            .map(|e| i64::from(e.after) - i64::from(e.before))
            .sum()
    }
}

fn add_delta(deltas: &mut SmallVec<[(CellId, i64); 8]>, cell: CellId, delta: i64) {
    match deltas.iter_mut().find(|(c, _)| *c == cell) {
        Some(entry) => entry.1 += delta,
        None => deltas.push((cell, delta)),
    }
}

/// A candidate reassignment of the focus site to the owner of the
/// source site.
///
/// Built against the committed registry state. Holds only ids, never
/// references into the registry, so it can outlive the borrow it was
/// built from and be committed later (a stale proposal is then detected
/// by [`CellRegistry::commit`]).
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateProposal {
    focus: Site,
    focus_index: usize,
    source: Site,
    losing: CellId,
    gaining: CellId,
    kind: OperationKind,
    neighbors: NeighborStats,
    losing_change: InterfaceChange,
    gaining_change: InterfaceChange,
    losing_parent: Option<CellId>,
    gaining_parent: Option<CellId>,
}

impl UpdateProposal {
    /// Build the proposal copying the owner of `source` onto `focus`.
    ///
    /// Returns `None` when both sites have the same owner (a no-op) or
    /// either site is off the lattice.
    pub fn build(registry: &CellRegistry, focus: Site, source: Site) -> Option<Self> {
        let lattice = registry.lattice();
        let focus_index = lattice.index_of(focus)?;
        let losing = registry.cell_at_index(focus_index)?;
        let gaining = registry.cell_at_index(lattice.index_of(source)?)?;
        if losing == gaining {
            return None;
        }
        let kind = if losing.is_medium() {
            OperationKind::Add
        } else if gaining.is_medium() {
            OperationKind::Remove
        } else {
            OperationKind::AddAndRemove
        };

        let neighbors = registry.neighbor_stats(focus);
        let count_of = |cell: CellId| {
            neighbors
                .iter()
                .find(|(c, _)| *c == cell)
                .map_or(0, |&(_, n)| i64::from(n))
        };
        let mut losing_deltas = SmallVec::<[(CellId, i64); 8]>::new();
        let mut gaining_deltas = SmallVec::<[(CellId, i64); 8]>::new();
        for &(c, n) in &neighbors {
            if c != losing {
                add_delta(&mut losing_deltas, c, -i64::from(n));
            }
            if c != gaining {
                add_delta(&mut gaining_deltas, c, i64::from(n));
            }
        }
        // The focus now faces its former owner's sites from the other side.
        let n_losing = count_of(losing);
        if n_losing > 0 {
            add_delta(&mut losing_deltas, gaining, n_losing);
        }
        let n_gaining = count_of(gaining);
        if n_gaining > 0 {
            add_delta(&mut gaining_deltas, losing, -n_gaining);
        }

        Some(Self {
            focus,
            focus_index,
            source,
            losing,
            gaining,
            kind,
            losing_change: InterfaceChange::from_deltas(registry, losing, &losing_deltas),
            gaining_change: InterfaceChange::from_deltas(registry, gaining, &gaining_deltas),
            neighbors,
            losing_parent: registry.composite_of(losing),
            gaining_parent: registry.composite_of(gaining),
        })
    }

    /// The site changing owner.
    pub fn focus(&self) -> Site {
        self.focus
    }

    /// Canonical index of the focus.
    pub fn focus_index(&self) -> usize {
        self.focus_index
    }

    /// The neighbor whose owner is copied.
    pub fn source(&self) -> Site {
        self.source
    }

    /// Current owner of the focus.
    pub fn losing(&self) -> CellId {
        self.losing
    }

    /// Owner of the source, and new owner of the focus.
    pub fn gaining(&self) -> CellId {
        self.gaining
    }

    /// Operation classification.
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Owner counts around the focus (interface neighborhood), in
    /// first-seen order.
    pub fn neighbors(&self) -> &[(CellId, u32)] {
        &self.neighbors
    }

    /// How many focus neighbors `cell` owns.
    pub fn neighbor_count(&self, cell: CellId) -> u32 {
        self.neighbors
            .iter()
            .find(|(c, _)| *c == cell)
            .map_or(0, |&(_, n)| n)
    }

    /// Interface entries of the losing cell that change.
    pub fn losing_change(&self) -> &InterfaceChange {
        &self.losing_change
    }

    /// Interface entries of the gaining cell that change.
    pub fn gaining_change(&self) -> &InterfaceChange {
        &self.gaining_change
    }

    /// Composite parents of the losing and gaining cells, deduplicated.
    pub fn parents(&self) -> SmallVec<[CellId; 2]> {
        let mut out = SmallVec::new();
        for p in [self.losing_parent, self.gaining_parent].into_iter().flatten() {
            if !out.contains(&p) {
                out.push(p);
            }
        }
        out
    }

    /// The role `cell` plays, or `None` if it is not acting.
    pub fn role_of(&self, cell: CellId) -> Option<CellRole> {
        if cell == self.losing {
            return Some(CellRole::Loses);
        }
        if cell == self.gaining {
            return Some(CellRole::Gains);
        }
        let loses = self.losing_parent == Some(cell);
        let gains = self.gaining_parent == Some(cell);
        match (gains, loses) {
            (true, true) => Some(CellRole::Shifts),
            (true, false) => Some(CellRole::Gains),
            (false, true) => Some(CellRole::Loses),
            (false, false) => None,
        }
    }

    /// Acting cells in evaluation order: losing, gaining, then their
    /// composite parents.
    pub fn acting_cells(&self) -> SmallVec<[CellId; 4]> {
        let mut out = SmallVec::new();
        out.push(self.losing);
        out.push(self.gaining);
        out.extend(self.parents());
        out
    }

    fn touched_entry(&self, a: CellId, b: CellId) -> Option<&InterfaceEntry> {
        if a == self.losing {
            self.losing_change.get(b)
        } else if b == self.losing {
            self.losing_change.get(a)
        } else if a == self.gaining {
            self.gaining_change.get(b)
        } else if b == self.gaining {
            self.gaining_change.get(a)
        } else {
            None
        }
    }

    /// Interface length between `a` and `b` in the committed state.
    pub fn interface_before(&self, registry: &CellRegistry, a: CellId, b: CellId) -> u32 {
        registry.interface_length(a, b)
    }

    /// Interface length between `a` and `b` if committed.
    pub fn interface_after(&self, registry: &CellRegistry, a: CellId, b: CellId) -> u32 {
        self.touched_entry(a, b)
            .map_or_else(|| registry.interface_length(a, b), |e| e.after)
    }

    /// Total interface length of `cell` if committed.
    pub fn interface_total_after(
        &self,
        registry: &CellRegistry,
        cell: CellId,
    ) -> Result<u32, RegistryError> {
        let before = i64::from(registry.interface_total(cell)?);
        let delta = if cell == self.losing {
            self.losing_change.total_delta()
        } else if cell == self.gaining {
            self.gaining_change.total_delta()
        } else {
            self.losing_change
                .get(cell)
                .map_or(0, |e| i64::from(e.after) - i64::from(e.before))
                + self
                    .gaining_change
                    .get(cell)
                    .map_or(0, |e| i64::from(e.after) - i64::from(e.before))
        };
        Ok((before + delta).max(0) as u32)
    }

    /// Node count of `cell` if committed.
    pub fn node_count_after(
        &self,
        registry: &CellRegistry,
        cell: CellId,
    ) -> Result<usize, RegistryError> {
        let now = registry.node_count(cell)?;
        Ok(match self.role_of(cell) {
            Some(CellRole::Gains) => now + 1,
            Some(CellRole::Loses) => now.saturating_sub(1),
            Some(CellRole::Shifts) | None => now,
        })
    }

    /// Center of `cell` if committed, in lattice coordinates.
    pub fn center_after(&self, registry: &CellRegistry, cell: CellId) -> Result<Vec3, RegistryError> {
        if cell == self.losing {
            return registry.center_after_move(cell, self.focus, false).map(|(c, _)| c);
        }
        if cell == self.gaining {
            return registry.center_after_move(cell, self.focus, true).map(|(c, _)| c);
        }
        if self.role_of(cell).is_none() {
            return registry.center(cell);
        }
        let moved = [
            (self.losing, registry.center_after_move(self.losing, self.focus, false)?),
            (self.gaining, registry.center_after_move(self.gaining, self.focus, true)?),
        ];
        registry.composite_center_with(cell, |member, record| {
            moved
                .iter()
                .find(|(id, _)| *id == member)
                .map_or((record.center(), record.nodes().len()), |&(_, after)| after)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use potts_core::CellTypeId;
    use potts_lattice::{LatticeConfig, LatticeDescriptor, NeighborhoodSpec, Structure};
    use std::sync::Arc;

    fn square(n: u32) -> CellRegistry {
        let lattice = LatticeDescriptor::new(&LatticeConfig::new(Structure::Square, [n, n, 1])).unwrap();
        CellRegistry::new(Arc::new(lattice), &NeighborhoodSpec::Order(1), 0).unwrap()
    }

    #[test]
    fn same_owner_is_no_op() {
        let reg = square(5);
        assert!(UpdateProposal::build(&reg, Site::new(1, 1, 0), Site::new(2, 1, 0)).is_none());
    }

    #[test]
    fn kind_classification() {
        let mut reg = square(6);
        let a = reg.create_cell(CellTypeId(1));
        let b = reg.create_cell(CellTypeId(1));
        reg.assign(Site::new(2, 2, 0), a).unwrap();
        reg.assign(Site::new(3, 2, 0), b).unwrap();
        let add = UpdateProposal::build(&reg, Site::new(1, 2, 0), Site::new(2, 2, 0)).unwrap();
        assert_eq!(add.kind(), OperationKind::Add);
        let remove = UpdateProposal::build(&reg, Site::new(2, 2, 0), Site::new(1, 2, 0)).unwrap();
        assert_eq!(remove.kind(), OperationKind::Remove);
        let both = UpdateProposal::build(&reg, Site::new(2, 2, 0), Site::new(3, 2, 0)).unwrap();
        assert_eq!(both.kind(), OperationKind::AddAndRemove);
        assert_eq!(both.role_of(a), Some(CellRole::Loses));
        assert_eq!(both.role_of(b), Some(CellRole::Gains));
        assert_eq!(both.role_of(CellId::MEDIUM), None);
    }

    #[test]
    fn predicted_interfaces_match_commit() {
        let mut reg = square(8);
        let a = reg.create_cell(CellTypeId(1));
        let b = reg.create_cell(CellTypeId(1));
        for (x, y) in [(2, 2), (3, 2), (2, 3), (3, 3)] {
            reg.assign(Site::new(x, y, 0), a).unwrap();
        }
        for (x, y) in [(4, 2), (4, 3)] {
            reg.assign(Site::new(x, y, 0), b).unwrap();
        }
        let p = UpdateProposal::build(&reg, Site::new(3, 2, 0), Site::new(4, 2, 0)).unwrap();
        let predicted: Vec<(CellId, CellId, u32)> = [a, b, CellId::MEDIUM]
            .iter()
            .flat_map(|&x| [a, b, CellId::MEDIUM].map(move |y| (x, y)))
            .filter(|(x, y)| x != y)
            .map(|(x, y)| (x, y, p.interface_after(&reg, x, y)))
            .collect();
        let totals: Vec<u32> = [a, b]
            .iter()
            .map(|&c| p.interface_total_after(&reg, c).unwrap())
            .collect();
        let center = p.center_after(&reg, a).unwrap();
        reg.commit(&p).unwrap();
        for (x, y, len) in predicted {
            assert_eq!(reg.interface_length(x, y), len, "{x}-{y}");
        }
        assert_eq!(totals[0], reg.interface_total(a).unwrap());
        assert_eq!(totals[1], reg.interface_total(b).unwrap());
        assert!((reg.center(a).unwrap() - center).length() < 1e-12);
    }

    #[test]
    fn composite_roles() {
        let mut reg = square(10);
        let s0 = reg.create_cell(CellTypeId(2));
        let s1 = reg.create_cell(CellTypeId(2));
        reg.assign(Site::new(2, 2, 0), s0).unwrap();
        reg.assign(Site::new(3, 2, 0), s1).unwrap();
        let comp = reg.create_composite(CellTypeId(3), &[s0, s1]).unwrap();

        let shift = UpdateProposal::build(&reg, Site::new(2, 2, 0), Site::new(3, 2, 0)).unwrap();
        assert_eq!(shift.role_of(comp), Some(CellRole::Shifts));
        assert_eq!(shift.parents().as_slice(), &[comp]);
        assert_eq!(shift.acting_cells().as_slice(), &[s0, s1, comp]);
        assert_eq!(shift.node_count_after(&reg, comp).unwrap(), 2);

        let grow = UpdateProposal::build(&reg, Site::new(4, 2, 0), Site::new(3, 2, 0)).unwrap();
        assert_eq!(grow.role_of(comp), Some(CellRole::Gains));
        assert_eq!(grow.node_count_after(&reg, comp).unwrap(), 3);
        let center = grow.center_after(&reg, comp).unwrap();
        assert!((center - Vec3::new(3.0, 2.0, 0.0)).length() < 1e-12);
    }
}
