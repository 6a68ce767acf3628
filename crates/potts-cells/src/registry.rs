//! The authoritative site-to-cell map.

use std::collections::BTreeMap;
use std::sync::Arc;

use indexmap::IndexMap;
use indexmap::IndexSet;
use potts_core::{CellId, CellTypeId, RegistryError, Site, Vec3};
use potts_lattice::{LatticeDescriptor, LatticeError, Neighborhood, NeighborhoodSpec, Neighbors};
use smallvec::SmallVec;

use crate::hash::{fnv1a_u32, fnv1a_u64, FNV_OFFSET};
use crate::proposal::UpdateProposal;
use crate::record::{CellClass, CellKind, CellRecord, CompositeInfo};

/// Owner counts around one site, in first-seen order.
pub type NeighborStats = SmallVec<[(CellId, u32); 8]>;

/// Full interface table, keyed for order-independent comparison.
pub type InterfaceTable = BTreeMap<CellId, BTreeMap<CellId, u32>>;

/// Arena of cell records plus the ownership of every lattice site.
///
/// Interfaces count neighbor relations in the interface neighborhood:
/// `interface_length(a, b)` is the number of (site in `a`, neighbor in
/// `b`) pairs. The neighbor relation is symmetric, so the table is too.
/// The medium takes part in interface bookkeeping like any other cell
/// but has no center.
///
/// # Mutation
///
/// During a run, [`commit`](Self::commit) is the only mutator. The
/// setup operations ([`create_cell`](Self::create_cell),
/// [`create_composite`](Self::create_composite),
/// [`assign`](Self::assign), [`destroy`](Self::destroy)) keep every
/// cache consistent but are meant for building the initial layout.
#[derive(Clone, Debug)]
pub struct CellRegistry {
    lattice: Arc<LatticeDescriptor>,
    boundary: Neighborhood,
    owners: Vec<CellId>,
    cells: Vec<Option<CellRecord>>,
    recompute_interval: u32,
}

impl CellRegistry {
    /// A registry where the medium owns every site.
    ///
    /// `interface` selects the neighborhood interfaces are counted over.
    /// Every `recompute_interval` commits touching a cell, its center is
    /// recomputed from its nodes; 0 disables the recompute.
    pub fn new(
        lattice: Arc<LatticeDescriptor>,
        interface: &NeighborhoodSpec,
        recompute_interval: u32,
    ) -> Result<Self, LatticeError> {
        let boundary = lattice.resolve_neighborhood(interface)?;
        let mut medium = CellRecord::new(CellId::MEDIUM, CellTypeId::MEDIUM, CellKind::Medium);
        medium.nodes = lattice.sites().collect();
        Ok(Self {
            owners: vec![CellId::MEDIUM; lattice.site_count()],
            boundary,
            lattice,
            cells: vec![Some(medium)],
            recompute_interval,
        })
    }

    // ── Reads ───────────────────────────────────────────────────

    /// The lattice this registry covers.
    pub fn lattice(&self) -> &LatticeDescriptor {
        &self.lattice
    }

    /// Shared handle to the lattice.
    pub fn lattice_arc(&self) -> &Arc<LatticeDescriptor> {
        &self.lattice
    }

    /// The neighborhood interfaces are counted over.
    pub fn interface_neighborhood(&self) -> &Neighborhood {
        &self.boundary
    }

    /// Sites in the interface neighborhood of `site`.
    pub fn interface_sites(&self, site: Site) -> Neighbors<'_> {
        self.lattice.neighbors(&self.boundary, site)
    }

    /// Commits between full center recomputes (0 = never).
    pub fn recompute_interval(&self) -> u32 {
        self.recompute_interval
    }

    /// Owner of `site`.
    pub fn cell_at(&self, site: Site) -> Result<CellId, RegistryError> {
        self.lattice
            .index_of(site)
            .map(|i| self.owners[i])
            .ok_or(RegistryError::SiteOutOfLattice { site })
    }

    /// Owner of the site at canonical `index`.
    pub fn cell_at_index(&self, index: usize) -> Option<CellId> {
        self.owners.get(index).copied()
    }

    /// Owner of an already-resolved neighbor site.
    fn owner_of(&self, site: Site) -> CellId {
        self.lattice
            .index_of(site)
            .map_or(CellId::MEDIUM, |i| self.owners[i])
    }

    /// The record of a live cell.
    pub fn cell(&self, id: CellId) -> Result<&CellRecord, RegistryError> {
        self.cells
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or(RegistryError::NotFound { cell: id })
    }

    fn cell_mut(&mut self, id: CellId) -> Result<&mut CellRecord, RegistryError> {
        self.cells
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(RegistryError::NotFound { cell: id })
    }

    /// Whether `id` names a live cell.
    pub fn contains(&self, id: CellId) -> bool {
        self.cell(id).is_ok()
    }

    /// Fieldless class of a cell.
    pub fn class_of(&self, id: CellId) -> Result<CellClass, RegistryError> {
        self.cell(id).map(CellRecord::class)
    }

    /// Type of a cell.
    pub fn type_of(&self, id: CellId) -> Result<CellTypeId, RegistryError> {
        self.cell(id).map(CellRecord::cell_type)
    }

    /// Cached center, in lattice coordinates.
    pub fn center(&self, id: CellId) -> Result<Vec3, RegistryError> {
        self.cell(id).map(CellRecord::center)
    }

    /// Number of sites owned, summed over members for composites.
    pub fn node_count(&self, id: CellId) -> Result<usize, RegistryError> {
        let record = self.cell(id)?;
        match record.composite() {
            Some(info) => info
                .members
                .iter()
                .map(|&m| self.cell(m).map(|r| r.nodes.len()))
                .sum(),
            None => Ok(record.nodes.len()),
        }
    }

    /// Shared interface length between two cells. 0 when either is
    /// unknown or they do not touch.
    pub fn interface_length(&self, a: CellId, b: CellId) -> u32 {
        self.cell(a)
            .ok()
            .and_then(|r| r.interfaces.get(&b).copied())
            .unwrap_or(0)
    }

    /// Total interface length of a cell against all other cells.
    pub fn interface_total(&self, id: CellId) -> Result<u32, RegistryError> {
        self.cell(id).map(CellRecord::interface_total)
    }

    /// Every live cell, the medium first.
    pub fn cells(&self) -> impl Iterator<Item = &CellRecord> + '_ {
        self.cells.iter().flatten()
    }

    /// Number of live cells, the medium included.
    pub fn cell_count(&self) -> usize {
        self.cells().count()
    }

    /// Ids of live cells of one type.
    pub fn cells_of_type(&self, cell_type: CellTypeId) -> impl Iterator<Item = CellId> + '_ {
        self.cells()
            .filter(move |r| r.cell_type == cell_type)
            .map(|r| r.id)
    }

    /// Sites owned by a cell.
    pub fn nodes(&self, id: CellId) -> Result<&IndexSet<Site>, RegistryError> {
        self.cell(id).map(CellRecord::nodes)
    }

    /// Interface map of a cell.
    pub fn interfaces(&self, id: CellId) -> Result<&IndexMap<CellId, u32>, RegistryError> {
        self.cell(id).map(CellRecord::interfaces)
    }

    /// The composite a sub-cell belongs to.
    pub fn composite_of(&self, id: CellId) -> Option<CellId> {
        self.cell(id).ok().and_then(CellRecord::parent)
    }

    /// Members of a composite in chain order.
    pub fn members(&self, id: CellId) -> Result<&[CellId], RegistryError> {
        self.cell(id)?
            .composite()
            .map(|info| info.members.as_slice())
            .ok_or(RegistryError::NotComposite { cell: id })
    }

    /// Orientation of a sub-cell within its composite.
    pub fn orientation(&self, id: CellId) -> Option<Vec3> {
        let parent = self.composite_of(id)?;
        let info = self.cell(parent).ok()?.composite()?;
        let pos = info.members.iter().position(|&m| m == id)?;
        info.orientations.get(pos).copied()
    }

    /// Owner counts in the interface neighborhood of `site`, excluding
    /// `site` itself, in first-seen order.
    pub fn neighbor_stats(&self, site: Site) -> NeighborStats {
        let mut stats = NeighborStats::new();
        for nb in self.interface_sites(site) {
            if nb == site {
                continue;
            }
            let owner = self.owner_of(nb);
            match stats.iter_mut().find(|(c, _)| *c == owner) {
                Some(entry) => entry.1 += 1,
                None => stats.push((owner, 1)),
            }
        }
        stats
    }

    // ── Setup ───────────────────────────────────────────────────

    fn next_id(&self) -> CellId {
        CellId(self.cells.len() as u32)
    }

    /// Create an empty atomic cell.
    pub fn create_cell(&mut self, cell_type: CellTypeId) -> CellId {
        let id = self.next_id();
        self.cells
            .push(Some(CellRecord::new(id, cell_type, CellKind::Atomic)));
        id
    }

    /// Group existing atomic cells into a composite, in chain order.
    ///
    /// Members become sub-cells; their sites stay where they are.
    pub fn create_composite(
        &mut self,
        cell_type: CellTypeId,
        members: &[CellId],
    ) -> Result<CellId, RegistryError> {
        if members.is_empty() {
            return Err(RegistryError::EmptyComposite);
        }
        for (i, &m) in members.iter().enumerate() {
            if self.class_of(m)? != CellClass::Atomic || members[..i].contains(&m) {
                return Err(RegistryError::AlreadyMember { cell: m });
            }
        }
        let id = self.next_id();
        let info = CompositeInfo {
            members: members.to_vec(),
            orientations: vec![Vec3::ZERO; members.len()],
            reversed: false,
        };
        self.cells
            .push(Some(CellRecord::new(id, cell_type, CellKind::Composite(info))));
        for &m in members {
            self.cell_mut(m)?.kind = CellKind::SubCell { parent: id };
        }
        self.refresh_composite_center(id)?;
        Ok(id)
    }

    /// Set the chain direction flag of a composite.
    pub fn set_reversed(&mut self, id: CellId, reversed: bool) -> Result<(), RegistryError> {
        match &mut self.cell_mut(id)?.kind {
            CellKind::Composite(info) => {
                info.reversed = reversed;
                Ok(())
            }
            _ => Err(RegistryError::NotComposite { cell: id }),
        }
    }

    /// Hand `site` to `cell`, keeping interfaces and centers consistent.
    pub fn assign(&mut self, site: Site, cell: CellId) -> Result<(), RegistryError> {
        let index = self
            .lattice
            .index_of(site)
            .ok_or(RegistryError::SiteOutOfLattice { site })?;
        self.ensure_assignable(cell)?;
        let from = self.owners[index];
        if from == cell {
            return Ok(());
        }
        self.move_site(site, index, from, cell)?;
        for parent in [self.composite_of(from), self.composite_of(cell)]
            .into_iter()
            .flatten()
        {
            self.refresh_composite_center(parent)?;
        }
        Ok(())
    }

    /// Remove a cell, returning its sites to the medium.
    ///
    /// Destroying a composite destroys its members. Destroying the last
    /// member of a composite destroys the composite.
    pub fn destroy(&mut self, id: CellId) -> Result<(), RegistryError> {
        let kind = self.cell(id)?.kind.clone();
        match kind {
            CellKind::Medium => return Err(RegistryError::NotAssignable { cell: id }),
            CellKind::Composite(info) => {
                for m in info.members {
                    self.release_sites(m)?;
                    self.cells[m.index()] = None;
                }
            }
            CellKind::Atomic => self.release_sites(id)?,
            CellKind::SubCell { parent } => {
                self.release_sites(id)?;
                self.cells[id.index()] = None;
                let emptied = match &mut self.cell_mut(parent)?.kind {
                    CellKind::Composite(info) => {
                        if let Some(pos) = info.members.iter().position(|&m| m == id) {
                            info.members.remove(pos);
                            info.orientations.remove(pos);
                        }
                        info.members.is_empty()
                    }
                    _ => false,
                };
                if emptied {
                    self.cells[parent.index()] = None;
                    return Ok(());
                }
                return self.refresh_composite_center(parent);
            }
        }
        self.cells[id.index()] = None;
        Ok(())
    }

    fn release_sites(&mut self, id: CellId) -> Result<(), RegistryError> {
        let sites: Vec<Site> = self.nodes(id)?.iter().copied().collect();
        for site in sites {
            if let Some(index) = self.lattice.index_of(site) {
                self.move_site(site, index, id, CellId::MEDIUM)?;
            }
        }
        Ok(())
    }

    fn ensure_assignable(&self, id: CellId) -> Result<(), RegistryError> {
        match self.class_of(id)? {
            CellClass::Composite => Err(RegistryError::NotAssignable { cell: id }),
            _ => Ok(()),
        }
    }

    // ── Mutation ────────────────────────────────────────────────

    /// Apply a proposal: move the focus site from the losing to the
    /// gaining cell and apply the interface deltas the proposal
    /// precomputed.
    ///
    /// Fails with [`RegistryError::StaleProposal`] when the focus is no
    /// longer owned by the proposal's losing cell; nothing changes in
    /// that case. Composite geometry (centers, orientations) is left to
    /// the caller.
    pub fn commit(&mut self, proposal: &UpdateProposal) -> Result<(), RegistryError> {
        let site = proposal.focus();
        let index = self
            .lattice
            .index_of(site)
            .ok_or(RegistryError::SiteOutOfLattice { site })?;
        let found = self.owners[index];
        if found != proposal.losing() {
            return Err(RegistryError::StaleProposal {
                site,
                expected: proposal.losing(),
                found,
            });
        }
        let (losing, gaining) = (proposal.losing(), proposal.gaining());
        self.ensure_assignable(gaining)?;
        self.cell(losing)?;
        self.cell(gaining)?;
        for e in proposal.losing_change().entries() {
            self.adjust(losing, e.neighbor, i64::from(e.after) - i64::from(e.before))?;
        }
        // The losing/gaining entry appears in both changes.
        for e in proposal.gaining_change().entries() {
            if e.neighbor != losing {
                self.adjust(gaining, e.neighbor, i64::from(e.after) - i64::from(e.before))?;
            }
        }
        self.relocate(site, index, losing, gaining)
    }

    /// Reassign one site during setup. Interface deltas are derived from
    /// the current neighbor stats.
    fn move_site(
        &mut self,
        site: Site,
        index: usize,
        from: CellId,
        to: CellId,
    ) -> Result<(), RegistryError> {
        // Validate both ends before touching anything.
        self.cell(from)?;
        self.cell(to)?;
        let stats = self.neighbor_stats(site);
        for &(c, n) in &stats {
            if c != from {
                self.adjust(from, c, -i64::from(n))?;
            }
        }
        for &(c, n) in &stats {
            if c != to {
                self.adjust(to, c, i64::from(n))?;
            }
        }
        self.relocate(site, index, from, to)
    }

    /// Move ownership, node sets and centers. Interfaces are already
    /// adjusted.
    fn relocate(
        &mut self,
        site: Site,
        index: usize,
        from: CellId,
        to: CellId,
    ) -> Result<(), RegistryError> {
        self.owners[index] = to;
        let interval = self.recompute_interval;
        let lattice = Arc::clone(&self.lattice);
        let losing = self.cell_mut(from)?;
        let count = losing.nodes.len();
        losing.nodes.swap_remove(&site);
        if !from.is_medium() {
            (losing.node_sum, losing.center) =
                moved_center(&lattice, losing.node_sum, losing.center, count, site, false);
            tick_recompute(&lattice, losing, interval);
        }
        let gaining = self.cell_mut(to)?;
        let count = gaining.nodes.len();
        gaining.nodes.insert(site);
        if !to.is_medium() {
            (gaining.node_sum, gaining.center) =
                moved_center(&lattice, gaining.node_sum, gaining.center, count, site, true);
            tick_recompute(&lattice, gaining, interval);
        }
        Ok(())
    }

    /// Add `delta` to the symmetric interface entry between `a` and `b`.
    fn adjust(&mut self, a: CellId, b: CellId, delta: i64) -> Result<(), RegistryError> {
        if a == b || delta == 0 {
            return Ok(());
        }
        bump(&mut self.cell_mut(a)?.interfaces, b, delta);
        bump(&mut self.cell_mut(b)?.interfaces, a, delta);
        Ok(())
    }

    // ── Composite geometry ──────────────────────────────────────

    /// Node-weighted mean of the member centers of a composite,
    /// unwrapped along the chain on periodic axes.
    pub fn member_weighted_center(&self, composite: CellId) -> Result<Vec3, RegistryError> {
        self.composite_center_with(composite, |_, r| (r.center, r.nodes.len()))
    }

    /// Like [`member_weighted_center`](Self::member_weighted_center) but
    /// with each member's `(center, node count)` supplied by `part`.
    pub(crate) fn composite_center_with<F>(
        &self,
        composite: CellId,
        mut part: F,
    ) -> Result<Vec3, RegistryError>
    where
        F: FnMut(CellId, &CellRecord) -> (Vec3, usize),
    {
        let members = self.members(composite)?;
        let mut parts = Vec::with_capacity(members.len());
        for &m in members {
            parts.push(part(m, self.cell(m)?));
        }
        Ok(chain_center(&self.lattice, &parts))
    }

    fn refresh_composite_center(&mut self, composite: CellId) -> Result<(), RegistryError> {
        let center = self.member_weighted_center(composite)?;
        self.cell_mut(composite)?.center = center;
        Ok(())
    }

    /// Store freshly computed composite geometry.
    pub fn update_composite_geometry(
        &mut self,
        composite: CellId,
        center: Vec3,
        orientations: Vec<Vec3>,
    ) -> Result<(), RegistryError> {
        let record = self.cell_mut(composite)?;
        match &mut record.kind {
            CellKind::Composite(info) => {
                debug_assert_eq!(info.members.len(), orientations.len());
                info.orientations = orientations;
                record.center = center;
                Ok(())
            }
            _ => Err(RegistryError::NotComposite { cell: composite }),
        }
    }

    /// Center of a cell after gaining or losing `site`, without
    /// committing anything.
    pub(crate) fn center_after_move(
        &self,
        id: CellId,
        site: Site,
        gains: bool,
    ) -> Result<(Vec3, usize), RegistryError> {
        let record = self.cell(id)?;
        let count = record.nodes.len();
        if id.is_medium() {
            return Ok((record.center, if gains { count + 1 } else { count.saturating_sub(1) }));
        }
        let (_, center) =
            moved_center(&self.lattice, record.node_sum, record.center, count, site, gains);
        Ok((center, if gains { count + 1 } else { count.saturating_sub(1) }))
    }

    // ── Diagnostics ─────────────────────────────────────────────

    /// The incrementally maintained interface table.
    pub fn interface_table(&self) -> InterfaceTable {
        self.cells()
            .filter(|r| !r.interfaces.is_empty())
            .map(|r| (r.id, r.interfaces.iter().map(|(&k, &v)| (k, v)).collect()))
            .collect()
    }

    /// Interface table recomputed from scratch over every site.
    pub fn recomputed_interfaces(&self) -> InterfaceTable {
        let mut table = InterfaceTable::new();
        for site in self.lattice.sites() {
            let owner = self.owner_of(site);
            for nb in self.interface_sites(site) {
                if nb == site {
                    continue;
                }
                let other = self.owner_of(nb);
                if other != owner {
                    *table.entry(owner).or_default().entry(other).or_insert(0) += 1;
                }
            }
        }
        table
    }

    /// Center of a cell recomputed from its nodes.
    pub fn recomputed_center(&self, id: CellId) -> Result<Vec3, RegistryError> {
        let record = self.cell(id)?;
        Ok(full_center(&self.lattice, record).1)
    }

    /// FNV-1a hash over site ownership and cell types.
    pub fn state_hash(&self) -> u64 {
        let mut hash = FNV_OFFSET;
        for owner in &self.owners {
            hash = fnv1a_u32(hash, owner.0);
        }
        for record in self.cells() {
            hash = fnv1a_u32(hash, record.id.0);
            hash = fnv1a_u32(hash, record.cell_type.0);
            hash = fnv1a_u64(hash, record.nodes.len() as u64);
        }
        hash
    }
}

fn bump(map: &mut IndexMap<CellId, u32>, key: CellId, delta: i64) {
    let current = i64::from(map.get(&key).copied().unwrap_or(0));
    let next = current + delta;
    debug_assert!(next >= 0, "interface with {key} went negative");
    if next <= 0 {
        map.shift_remove(&key);
    } else {
        map.insert(key, next as u32);
    }
}

/// Node sum and center after adding or removing `site`.
///
/// The site is unwrapped to the image nearest the current center, so a
/// cell straddling a periodic face keeps a contiguous sum. The result is
/// folded back into the box and the sum shifted to match.
fn moved_center(
    lattice: &LatticeDescriptor,
    node_sum: Vec3,
    center: Vec3,
    count_before: usize,
    site: Site,
    gains: bool,
) -> (Vec3, Vec3) {
    let point = if count_before == 0 {
        site.to_vec3()
    } else {
        center + lattice.node_distance(site.to_vec3(), center)
    };
    let (sum, count) = if gains {
        (node_sum + point, count_before + 1)
    } else {
        (node_sum - point, count_before.saturating_sub(1))
    };
    if count == 0 {
        return (Vec3::ZERO, Vec3::ZERO);
    }
    fold(lattice, sum, count)
}

fn fold(lattice: &LatticeDescriptor, sum: Vec3, count: usize) -> (Vec3, Vec3) {
    let raw = sum / count as f64;
    let wrapped = lattice.wrap_point(raw);
    (sum + (wrapped - raw) * count as f64, wrapped)
}

fn full_center(lattice: &LatticeDescriptor, record: &CellRecord) -> (Vec3, Vec3) {
    let count = record.nodes.len();
    if count == 0 {
        return (Vec3::ZERO, Vec3::ZERO);
    }
    let anchor = record.center;
    let sum = record.nodes.iter().fold(Vec3::ZERO, |acc, s| {
        acc + anchor + lattice.node_distance(s.to_vec3(), anchor)
    });
    fold(lattice, sum, count)
}

fn tick_recompute(lattice: &LatticeDescriptor, record: &mut CellRecord, interval: u32) {
    if interval == 0 {
        return;
    }
    record.since_recompute += 1;
    if record.since_recompute >= interval {
        (record.node_sum, record.center) = full_center(lattice, record);
        record.since_recompute = 0;
    }
}

/// Node-weighted mean of chained member centers. Empty members are
/// skipped; each center is unwrapped against the previous non-empty one.
fn chain_center(lattice: &LatticeDescriptor, parts: &[(Vec3, usize)]) -> Vec3 {
    let mut prev: Option<Vec3> = None;
    let mut sum = Vec3::ZERO;
    let mut total = 0usize;
    for &(center, count) in parts {
        if count == 0 {
            continue;
        }
        let unwrapped = match prev {
            Some(p) => p + lattice.node_distance(center, p),
            None => center,
        };
        sum += unwrapped * count as f64;
        total += count;
        prev = Some(unwrapped);
    }
    if total == 0 {
        return Vec3::ZERO;
    }
    lattice.wrap_point(sum / total as f64)
}
