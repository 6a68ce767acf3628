//! Harmonic surface constraint.
//!
//! `H = s · (S_target − S)²` per cell, where `S` is the cell's total
//! interface length: the number of neighbor relations, over the
//! registry's interface neighborhood, between the cell's sites and sites
//! of other cells (medium included).

use potts_cells::{CellClass, UpdateProposal};
use potts_core::{CellId, CellTypeId, EnergyError, Focus};
use potts_energy::{EnergyContext, EnergyContributor, Parameter, Plugin, PluginError};

use crate::types::{center_focus, CellTypes};
use crate::volume::check_non_negative;

/// Penalizes deviation of a cell's surface from its target.
#[derive(Clone, Debug)]
pub struct SurfaceConstraint {
    name: String,
    types: CellTypes,
    target: Parameter,
    strength: Parameter,
}

/// Builder for [`SurfaceConstraint`].
///
/// Required: `target`.
pub struct SurfaceConstraintBuilder {
    name: String,
    types: CellTypes,
    target: Option<Parameter>,
    strength: Parameter,
}

impl SurfaceConstraint {
    /// Create a builder. Strength defaults to 1.0.
    pub fn builder() -> SurfaceConstraintBuilder {
        SurfaceConstraintBuilder {
            name: "surface".to_string(),
            types: CellTypes::all(),
            target: None,
            strength: Parameter::Constant(1.0),
        }
    }

    fn energy(&self, focus: &Focus, ctx: &EnergyContext<'_>, surface: f64) -> Result<f64, EnergyError> {
        let s = self.strength.resolve(ctx.symbols(), focus)?;
        if s == 0.0 {
            return Ok(0.0);
        }
        let t = self.target.resolve(ctx.symbols(), focus)?;
        Ok(s * (t - surface).powi(2))
    }
}

impl SurfaceConstraintBuilder {
    /// Instance name (default `"surface"`).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Attach to `cell_type`. Without any call, every type is selected.
    pub fn cell_type(mut self, cell_type: CellTypeId) -> Self {
        self.types.push(cell_type);
        self
    }

    /// Target interface length.
    pub fn target(mut self, target: impl Into<Parameter>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Penalty strength.
    pub fn strength(mut self, strength: impl Into<Parameter>) -> Self {
        self.strength = strength.into();
        self
    }

    /// Build the plugin.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `target` is missing, or a constant target or
    /// strength is negative or not finite.
    pub fn build(self) -> Result<SurfaceConstraint, PluginError> {
        let target = self
            .target
            .ok_or_else(|| PluginError::invalid(&self.name, "target", "target is required"))?;
        check_non_negative(&self.name, "target", &target)?;
        check_non_negative(&self.name, "strength", &self.strength)?;
        Ok(SurfaceConstraint {
            name: self.name,
            types: self.types,
            target,
            strength: self.strength,
        })
    }
}

impl Plugin for SurfaceConstraint {
    fn name(&self) -> &str {
        &self.name
    }
}

impl EnergyContributor for SurfaceConstraint {
    fn applies_to(&self, class: CellClass, cell_type: CellTypeId) -> bool {
        matches!(class, CellClass::Atomic | CellClass::SubCell) && self.types.admits(cell_type)
    }

    fn delta(
        &self,
        cell: CellId,
        proposal: &UpdateProposal,
        ctx: &EnergyContext<'_>,
    ) -> Result<f64, EnergyError> {
        if self.strength.is_zero() || proposal.role_of(cell).is_none() {
            return Ok(0.0);
        }
        let registry = ctx.registry();
        let before = f64::from(registry.interface_total(cell)?);
        let after = f64::from(proposal.interface_total_after(registry, cell)?);
        if before == after {
            return Ok(0.0);
        }
        let focus = Focus::new(proposal.focus(), cell);
        Ok(self.energy(&focus, ctx, after)? - self.energy(&focus, ctx, before)?)
    }

    fn hamiltonian(&self, cell: CellId, ctx: &EnergyContext<'_>) -> Result<f64, EnergyError> {
        if self.strength.is_zero() {
            return Ok(0.0);
        }
        let surface = f64::from(ctx.registry().interface_total(cell)?);
        self.energy(&center_focus(ctx.registry(), cell), ctx, surface)
    }
}
