//! Chain mechanics of composite (segmented) cells.
//!
//! Treats the member centers of a composite as the joints of an elastic
//! rod and penalizes three deformations:
//!
//! - **axial**: spacing of consecutive centers away from the segment
//!   size, `Σ (σ − |c_i − c_{i+1}|)²`;
//! - **bending**: curvature at every interior joint, shaped by a
//!   [`BendingModel`] over `κ = |n(c_{i} − c_{i+1}) + n(c_{i+2} − c_{i+1})|²`,
//!   where `n` normalizes;
//! - **interface**: the contact between consecutive segments away from
//!   the target length `L`, `(i − L)²`, with `i` measured in boundary
//!   units (interface relations over half the neighborhood size).
//!
//! `σ` is the expected extent of a segment of volume `V`: `V` in 1D,
//! `√V` in 2D, `1.2·∛V` in 3D. `L` is `factor` in 1D, `√(V·factor)` in
//! 2D and `V^{2/3}·factor` in 3D. `V` is the node count of the segment
//! gaining (or, for pure removals, losing) the focus.
//!
//! `H = strength · (axial · σ · H_axial + bending · σ · H_bend)`. Deltas
//! only revisit the joints within reach of the segments that change.

use potts_cells::{CellClass, CellRegistry, CellRole, UpdateProposal};
use potts_core::{CellId, CellTypeId, EnergyError, RegistryError, Vec3};
use potts_energy::{EnergyContext, EnergyContributor, Plugin, PluginError};

use crate::types::CellTypes;

/// Shape of the bending potential over `x = κ / σ²`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BendingModel {
    /// `ln(p·x + 1)`: soft for large bends.
    Tube,
    /// `x`.
    Solid,
    /// `x^p`.
    Exponential,
}

/// Elastic rod energy over the member chain of a composite.
#[derive(Clone, Debug)]
pub struct RodMechanics {
    name: String,
    types: CellTypes,
    model: BendingModel,
    bending_parameter: f64,
    axial: f64,
    bending: f64,
    interface_strength: f64,
    interface_length_factor: f64,
    strength: f64,
}

/// Builder for [`RodMechanics`].
pub struct RodMechanicsBuilder {
    inner: RodMechanics,
}

impl RodMechanics {
    /// Create a builder: tube model with parameter 1.0, all stiffnesses
    /// 0.0, interface length factor 1.0, strength 1.0.
    pub fn builder() -> RodMechanicsBuilder {
        RodMechanicsBuilder {
            inner: RodMechanics {
                name: "rod_mechanics".to_string(),
                types: CellTypes::all(),
                model: BendingModel::Tube,
                bending_parameter: 1.0,
                axial: 0.0,
                bending: 0.0,
                interface_strength: 0.0,
                interface_length_factor: 1.0,
                strength: 1.0,
            },
        }
    }

    fn size_scale(dims: usize, volume: f64) -> f64 {
        match dims {
            1 => volume,
            2 => volume.sqrt(),
            _ => volume.cbrt() * 1.2,
        }
    }

    fn interface_target(&self, dims: usize, volume: f64) -> f64 {
        match dims {
            1 => self.interface_length_factor,
            2 => (volume * self.interface_length_factor).sqrt(),
            _ => volume.powf(2.0 / 3.0) * self.interface_length_factor,
        }
    }

    fn bend(&self, curvature: f64) -> f64 {
        match self.model {
            BendingModel::Tube => (self.bending_parameter * curvature + 1.0).ln(),
            BendingModel::Solid => curvature,
            BendingModel::Exponential => curvature.powf(self.bending_parameter),
        }
    }

    /// Mechanical energy of the joints touching segments `first..=last`.
    fn chain_energy(&self, centers: &[Vec3], first: usize, last: usize, size: f64) -> f64 {
        let n = centers.len();
        let mut axial = 0.0;
        if n > 1 {
            for i in first.saturating_sub(1)..=last.min(n - 2) {
                axial += (size - (centers[i] - centers[i + 1]).length()).powi(2);
            }
        }
        let mut bending = 0.0;
        if n > 2 && size > 0.0 {
            for i in first.saturating_sub(2)..=last.min(n - 3) {
                bending += self.bend(curve3(&centers[i..i + 3]) / (size * size));
            }
        }
        self.axial * size * axial + self.bending * size * bending
    }

    /// Squared interface mismatch between `segment` and `neighbor`, before
    /// and after the proposal.
    fn interface_term(
        &self,
        registry: &CellRegistry,
        proposal: &UpdateProposal,
        segment: CellId,
        neighbor: CellId,
        target: f64,
        per_node: f64,
    ) -> f64 {
        let before = f64::from(proposal.interface_before(registry, segment, neighbor)) / per_node;
        let after = f64::from(proposal.interface_after(registry, segment, neighbor)) / per_node;
        (after - target).powi(2) - (before - target).powi(2)
    }
}

/// `|n(p0 − p1) + n(p2 − p1)|²`: zero for a straight joint, 4 for a
/// full fold.
fn curve3(p: &[Vec3]) -> f64 {
    let s = (p[0] - p[1]).normalized() + (p[2] - p[1]).normalized();
    s.dot(s)
}

/// Member centers in orthogonal coordinates, unwrapped along the chain.
fn chain_points(registry: &CellRegistry, centers: &[Vec3]) -> Vec<Vec3> {
    let lattice = registry.lattice();
    let mut out: Vec<Vec3> = Vec::with_capacity(centers.len());
    let mut prev: Option<(Vec3, Vec3)> = None;
    for &c in centers {
        let p = match prev {
            Some((raw, unwrapped)) => unwrapped + lattice.to_orth(lattice.node_distance(c, raw)),
            None => lattice.to_orth(c),
        };
        out.push(p);
        prev = Some((c, p));
    }
    out
}

fn position(members: &[CellId], cell: CellId) -> Result<usize, RegistryError> {
    members
        .iter()
        .position(|&m| m == cell)
        .ok_or(RegistryError::NotFound { cell })
}

impl RodMechanicsBuilder {
    /// Instance name (default `"rod_mechanics"`).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.inner.name = name.into();
        self
    }

    /// Attach to composites of `cell_type`. Without any call, every
    /// composite type is selected.
    pub fn cell_type(mut self, cell_type: CellTypeId) -> Self {
        self.inner.types.push(cell_type);
        self
    }

    /// Bending potential and its parameter.
    pub fn bending_model(mut self, model: BendingModel, parameter: f64) -> Self {
        self.inner.model = model;
        self.inner.bending_parameter = parameter;
        self
    }

    /// Axial (spacing) stiffness.
    pub fn axial(mut self, stiffness: f64) -> Self {
        self.inner.axial = stiffness;
        self
    }

    /// Bending stiffness.
    pub fn bending(mut self, stiffness: f64) -> Self {
        self.inner.bending = stiffness;
        self
    }

    /// Interface constraint between consecutive segments.
    pub fn interface(mut self, strength: f64, length_factor: f64) -> Self {
        self.inner.interface_strength = strength;
        self.inner.interface_length_factor = length_factor;
        self
    }

    /// Global multiplier (default 1.0).
    pub fn strength(mut self, strength: f64) -> Self {
        self.inner.strength = strength;
        self
    }

    /// Build the plugin.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any coefficient is negative or not finite.
    pub fn build(self) -> Result<RodMechanics, PluginError> {
        let r = &self.inner;
        let checks = [
            ("axial", r.axial),
            ("bending", r.bending),
            ("bending_parameter", r.bending_parameter),
            ("interface_strength", r.interface_strength),
            ("interface_length_factor", r.interface_length_factor),
            ("strength", r.strength),
        ];
        for (parameter, value) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(PluginError::invalid(
                    &r.name,
                    parameter,
                    format!("must be finite and >= 0, got {value}"),
                ));
            }
        }
        Ok(self.inner)
    }
}

impl Plugin for RodMechanics {
    fn name(&self) -> &str {
        &self.name
    }
}

impl EnergyContributor for RodMechanics {
    fn applies_to(&self, class: CellClass, cell_type: CellTypeId) -> bool {
        class == CellClass::Composite && self.types.admits(cell_type)
    }

    fn delta(
        &self,
        cell: CellId,
        proposal: &UpdateProposal,
        ctx: &EnergyContext<'_>,
    ) -> Result<f64, EnergyError> {
        if self.strength == 0.0 {
            return Ok(0.0);
        }
        let Some(role) = proposal.role_of(cell) else {
            return Ok(0.0);
        };
        let registry = ctx.registry();
        let members = registry.members(cell)?;
        let dims = registry.lattice().dims();
        let per_node = (registry.interface_neighborhood().len() / 2).max(1) as f64;

        let (segment, first, last) = match role {
            CellRole::Gains | CellRole::Shifts => {
                let g = position(members, proposal.gaining())?;
                match role {
                    CellRole::Shifts => {
                        let l = position(members, proposal.losing())?;
                        (proposal.gaining(), g.min(l), g.max(l))
                    }
                    _ => (proposal.gaining(), g, g),
                }
            }
            CellRole::Loses => {
                let l = position(members, proposal.losing())?;
                (proposal.losing(), l, l)
            }
        };
        let volume = registry.node_count(segment)? as f64;
        let size = Self::size_scale(dims, volume);

        let mut de = 0.0;
        if self.interface_strength != 0.0 {
            let target = self.interface_target(dims, volume);
            let mut pairs: Vec<(CellId, CellId)> = Vec::with_capacity(2);
            if role == CellRole::Shifts {
                if last - first == 1 {
                    pairs.push((proposal.gaining(), proposal.losing()));
                }
            } else {
                if first > 0 {
                    pairs.push((segment, members[first - 1]));
                }
                if first + 1 < members.len() {
                    pairs.push((segment, members[first + 1]));
                }
            }
            for (a, b) in pairs {
                de += self.interface_strength
                    * self.interface_term(registry, proposal, a, b, target, per_node);
            }
        }

        if self.axial != 0.0 || self.bending != 0.0 {
            let mut pre = Vec::with_capacity(members.len());
            let mut post = Vec::with_capacity(members.len());
            for &m in members {
                pre.push(registry.center(m)?);
                post.push(proposal.center_after(registry, m)?);
            }
            let pre = chain_points(registry, &pre);
            let post = chain_points(registry, &post);
            de += self.chain_energy(&post, first, last, size) - self.chain_energy(&pre, first, last, size);
        }
        Ok(self.strength * de)
    }

    fn hamiltonian(&self, cell: CellId, ctx: &EnergyContext<'_>) -> Result<f64, EnergyError> {
        if self.strength == 0.0 {
            return Ok(0.0);
        }
        let registry = ctx.registry();
        let members = registry.members(cell)?;
        let Some(&head) = members.first() else {
            return Ok(0.0);
        };
        let size = Self::size_scale(registry.lattice().dims(), registry.node_count(head)? as f64);
        let mut centers = Vec::with_capacity(members.len());
        for &m in members {
            centers.push(registry.center(m)?);
        }
        let points = chain_points(registry, &centers);
        Ok(self.strength * self.chain_energy(&points, 0, members.len() - 1, size))
    }
}
