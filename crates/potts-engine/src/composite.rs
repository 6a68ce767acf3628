//! Chain integrity and geometry of composite cells.
//!
//! A composite's members form a chain in declaration order. A proposal
//! may not cut the contact between two consecutive members, and after
//! every commit that touches a member the composite's orientations and
//! center are recomputed from the member centers.

use potts_cells::{CellClass, CellRegistry, UpdateProposal};
use potts_core::{CellId, RegistryError, Vec3};

/// Result of [`CompositeCellCoordinator::update_check`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompositeVerdict {
    /// No chain contact is cut.
    Valid,
    /// The proposal would remove the last contact between two
    /// consecutive members.
    Severs {
        /// The composite whose chain would break.
        composite: CellId,
        /// The acting member.
        member: CellId,
        /// Its chain neighbor that would lose contact.
        neighbor: CellId,
    },
}

/// Enforces chain connectivity and maintains composite geometry.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompositeCellCoordinator;

impl CompositeCellCoordinator {
    /// Check every acting sub-cell against its chain neighbors.
    ///
    /// A contact that is absent before and after is not a violation.
    pub fn update_check(
        &self,
        proposal: &UpdateProposal,
        registry: &CellRegistry,
    ) -> Result<CompositeVerdict, RegistryError> {
        for member in [proposal.losing(), proposal.gaining()] {
            let Some(composite) = registry.composite_of(member) else {
                continue;
            };
            let members = registry.members(composite)?;
            let Some(pos) = members.iter().position(|&m| m == member) else {
                continue;
            };
            let prev = pos.checked_sub(1).map(|i| members[i]);
            let next = members.get(pos + 1).copied();
            for neighbor in [prev, next].into_iter().flatten() {
                if proposal.interface_before(registry, member, neighbor) > 0
                    && proposal.interface_after(registry, member, neighbor) == 0
                {
                    return Ok(CompositeVerdict::Severs {
                        composite,
                        member,
                        neighbor,
                    });
                }
            }
        }
        Ok(CompositeVerdict::Valid)
    }

    /// Refresh the geometry of every composite `proposal` touched.
    /// Call after the proposal was committed.
    pub fn after_commit(
        &self,
        proposal: &UpdateProposal,
        registry: &mut CellRegistry,
    ) -> Result<(), RegistryError> {
        for composite in proposal.parents() {
            self.refresh(registry, composite)?;
        }
        Ok(())
    }

    /// Recompute orientations and center of one composite.
    pub fn refresh(&self, registry: &mut CellRegistry, composite: CellId) -> Result<(), RegistryError> {
        let orientations = orientations(registry, composite)?;
        let center = registry.member_weighted_center(composite)?;
        registry.update_composite_geometry(composite, center, orientations)
    }

    /// Refresh every composite in the registry.
    pub fn refresh_all(&self, registry: &mut CellRegistry) -> Result<(), RegistryError> {
        let composites: Vec<CellId> = registry
            .cells()
            .filter(|r| r.class() == CellClass::Composite)
            .map(|r| r.id())
            .collect();
        for composite in composites {
            self.refresh(registry, composite)?;
        }
        Ok(())
    }
}

/// Member orientations from the current member centers, in orthogonal
/// space.
///
/// Two members share `norm(c0 − c1)`. With more, interior member `i`
/// points along `norm(c[i−1] − c[i+1])` and each end copies its only
/// neighbor. A reversed chain flips every vector.
pub fn orientations(registry: &CellRegistry, composite: CellId) -> Result<Vec<Vec3>, RegistryError> {
    let lattice = registry.lattice();
    let members = registry.members(composite)?;
    let reversed = registry
        .cell(composite)?
        .composite()
        .is_some_and(|info| info.reversed);
    let centers = members
        .iter()
        .map(|&m| registry.center(m))
        .collect::<Result<Vec<_>, _>>()?;
    let axis = |a: usize, b: usize| {
        lattice
            .to_orth(lattice.node_distance(centers[a], centers[b]))
            .normalized()
    };

    let n = centers.len();
    let mut out = vec![Vec3::ZERO; n];
    match n {
        0 | 1 => {}
        2 => {
            let d = axis(0, 1);
            out[0] = d;
            out[1] = d;
        }
        _ => {
            for i in 1..n - 1 {
                out[i] = axis(i - 1, i + 1);
            }
            out[0] = out[1];
            out[n - 1] = out[n - 2];
        }
    }
    if reversed {
        for o in &mut out {
            *o = -*o;
        }
    }
    Ok(out)
}
