//! Harmonic volume constraint.
//!
//! `H = s · (V_target − V)²` per cell, where `V` is the node count.
//! Constructed via the builder pattern: [`VolumeConstraint::builder`].

use potts_cells::{CellClass, UpdateProposal};
use potts_core::{CellId, CellTypeId, EnergyError, Focus};
use potts_energy::{EnergyContext, EnergyContributor, Parameter, Plugin, PluginError};

use crate::types::{center_focus, CellTypes};

/// Penalizes deviation of a cell's node count from its target.
#[derive(Clone, Debug)]
pub struct VolumeConstraint {
    name: String,
    types: CellTypes,
    target: Parameter,
    strength: Parameter,
}

/// Builder for [`VolumeConstraint`].
///
/// Required: `target`.
pub struct VolumeConstraintBuilder {
    name: String,
    types: CellTypes,
    target: Option<Parameter>,
    strength: Parameter,
}

impl VolumeConstraint {
    /// Create a builder. Strength defaults to 1.0.
    pub fn builder() -> VolumeConstraintBuilder {
        VolumeConstraintBuilder {
            name: "volume".to_string(),
            types: CellTypes::all(),
            target: None,
            strength: Parameter::Constant(1.0),
        }
    }

    fn energy(&self, focus: &Focus, ctx: &EnergyContext<'_>, volume: f64) -> Result<f64, EnergyError> {
        let s = self.strength.resolve(ctx.symbols(), focus)?;
        if s == 0.0 {
            return Ok(0.0);
        }
        let t = self.target.resolve(ctx.symbols(), focus)?;
        Ok(s * (t - volume).powi(2))
    }
}

impl VolumeConstraintBuilder {
    /// Instance name (default `"volume"`).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Attach to `cell_type`. Without any call, every type is selected.
    pub fn cell_type(mut self, cell_type: CellTypeId) -> Self {
        self.types.push(cell_type);
        self
    }

    /// Target node count.
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
    pub fn build(self) -> Result<VolumeConstraint, PluginError> {
        let target = self
            .target
            .ok_or_else(|| PluginError::invalid(&self.name, "target", "target is required"))?;
        check_non_negative(&self.name, "target", &target)?;
        check_non_negative(&self.name, "strength", &self.strength)?;
        Ok(VolumeConstraint {
            name: self.name,
            types: self.types,
            target,
            strength: self.strength,
        })
    }
}

pub(crate) fn check_non_negative(plugin: &str, parameter: &str, value: &Parameter) -> Result<(), PluginError> {
    match value.constant() {
        Some(v) if !v.is_finite() || v < 0.0 => Err(PluginError::invalid(
            plugin,
            parameter,
            format!("must be finite and >= 0, got {v}"),
        )),
        _ => Ok(()),
    }
}

impl Plugin for VolumeConstraint {
    fn name(&self) -> &str {
        &self.name
    }
}

impl EnergyContributor for VolumeConstraint {
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
        let before = registry.node_count(cell)? as f64;
        let after = proposal.node_count_after(registry, cell)? as f64;
        let focus = Focus::new(proposal.focus(), cell);
        Ok(self.energy(&focus, ctx, after)? - self.energy(&focus, ctx, before)?)
    }

    fn hamiltonian(&self, cell: CellId, ctx: &EnergyContext<'_>) -> Result<f64, EnergyError> {
        if self.strength.is_zero() {
            return Ok(0.0);
        }
        let volume = ctx.registry().node_count(cell)? as f64;
        self.energy(&center_focus(ctx.registry(), cell), ctx, volume)
    }
}
