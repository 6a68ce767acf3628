//! Active cell motion.
//!
//! Both plugins reward center displacement along a preferred direction:
//! `ΔE = −s · N · (Δc · d)`, where `N` is the cell's node count, `Δc` the
//! center shift the proposal would cause (orthogonal coordinates,
//! minimum image) and `d` the direction.
//!
//! The term is gated per operation: `protrusion` enables it for a cell
//! gaining the focus, `retraction` for a cell losing it. A composite
//! whose members trade the focus counts as either.
//!
//! A chain moves either segment by segment (the default) or as a whole
//! (`whole_chains(true)`), never both, so one copy is charged once.
//!
//! - [`DirectedMotion`] follows an externally supplied direction,
//!   normalized before use.
//! - [`PersistentMotion`] follows a per-cell direction it remembers
//!   itself. Between sweeps it blends the remembered direction toward
//!   the cell's latest displacement, with weight
//!   `min(interval / decay_time, 1)`. The memory lives in
//!   [`CellProperties`] so the energy term stays read-only.

use potts_cells::{CellClass, CellProperties, CellRegistry, CellRole, PropertyValue, UpdateProposal};
use potts_core::{CellId, CellTypeId, EnergyError, Focus, Vec3};
use potts_energy::{
    EnergyContext, EnergyContributor, Parameter, Plugin, PluginError, Report, ReportSink,
    ReportValue, StateReporter, TimeStep, TimeStepListener, VectorParameter,
};
use tracing::warn;

use crate::types::{center_focus, CellTypes};
use crate::volume::check_non_negative;

/// Which operations the motion term responds to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Gates {
    protrusion: bool,
    retraction: bool,
}

impl Gates {
    fn open(self, role: CellRole) -> bool {
        match role {
            CellRole::Gains => self.protrusion,
            CellRole::Loses => self.retraction,
            CellRole::Shifts => self.protrusion || self.retraction,
        }
    }

    fn warn_if_closed(self, plugin: &str) {
        if !self.protrusion && !self.retraction {
            warn!(
                plugin,
                "protrusion and retraction are both disabled; the motion term has no effect"
            );
        }
    }
}

fn motile(class: CellClass, whole_chains: bool) -> bool {
    match class {
        CellClass::Atomic => true,
        CellClass::SubCell => !whole_chains,
        CellClass::Composite => whole_chains,
        CellClass::Medium => false,
    }
}

/// Center shift of `cell` under `proposal`, in orthogonal coordinates.
fn center_shift(registry: &CellRegistry, cell: CellId, proposal: &UpdateProposal) -> Result<Vec3, EnergyError> {
    let lattice = registry.lattice();
    let before = registry.center(cell)?;
    let after = proposal.center_after(registry, cell)?;
    Ok(lattice.to_orth(lattice.node_distance(after, before)))
}

// ── DirectedMotion ──────────────────────────────────────────────

/// Motion along an external direction field.
#[derive(Clone, Debug)]
pub struct DirectedMotion {
    name: String,
    types: CellTypes,
    direction: VectorParameter,
    strength: Parameter,
    gates: Gates,
    whole_chains: bool,
}

/// Builder for [`DirectedMotion`].
///
/// Required: `direction`.
pub struct DirectedMotionBuilder {
    name: String,
    types: CellTypes,
    direction: Option<VectorParameter>,
    strength: Parameter,
    gates: Gates,
    whole_chains: bool,
}

impl DirectedMotion {
    /// Create a builder. Strength defaults to 1.0; protrusion and
    /// retraction both default to enabled.
    pub fn builder() -> DirectedMotionBuilder {
        DirectedMotionBuilder {
            name: "directed_motion".to_string(),
            types: CellTypes::all(),
            direction: None,
            strength: Parameter::Constant(1.0),
            gates: Gates {
                protrusion: true,
                retraction: true,
            },
            whole_chains: false,
        }
    }
}

impl DirectedMotionBuilder {
    /// Instance name (default `"directed_motion"`).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Attach to `cell_type`. Without any call, every type is selected.
    pub fn cell_type(mut self, cell_type: CellTypeId) -> Self {
        self.types.push(cell_type);
        self
    }

    /// Preferred direction. Only its orientation matters.
    pub fn direction(mut self, direction: impl Into<VectorParameter>) -> Self {
        self.direction = Some(direction.into());
        self
    }

    /// Motion strength.
    pub fn strength(mut self, strength: impl Into<Parameter>) -> Self {
        self.strength = strength.into();
        self
    }

    /// Respond when a cell gains a site (default `true`).
    pub fn protrusion(mut self, on: bool) -> Self {
        self.gates.protrusion = on;
        self
    }

    /// Respond when a cell loses a site (default `true`).
    pub fn retraction(mut self, on: bool) -> Self {
        self.gates.retraction = on;
        self
    }

    /// Move composites as a whole instead of segment by segment
    /// (default `false`).
    pub fn whole_chains(mut self, on: bool) -> Self {
        self.whole_chains = on;
        self
    }

    /// Build the plugin. Logs a warning when both gates are closed.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `direction` is missing or a constant strength is
    /// negative or not finite.
    pub fn build(self) -> Result<DirectedMotion, PluginError> {
        let direction = self
            .direction
            .ok_or_else(|| PluginError::invalid(&self.name, "direction", "direction is required"))?;
        check_non_negative(&self.name, "strength", &self.strength)?;
        self.gates.warn_if_closed(&self.name);
        Ok(DirectedMotion {
            name: self.name,
            types: self.types,
            direction,
            strength: self.strength,
            gates: self.gates,
            whole_chains: self.whole_chains,
        })
    }
}

impl Plugin for DirectedMotion {
    fn name(&self) -> &str {
        &self.name
    }
}

impl EnergyContributor for DirectedMotion {
    fn applies_to(&self, class: CellClass, cell_type: CellTypeId) -> bool {
        motile(class, self.whole_chains) && self.types.admits(cell_type)
    }

    fn delta(
        &self,
        cell: CellId,
        proposal: &UpdateProposal,
        ctx: &EnergyContext<'_>,
    ) -> Result<f64, EnergyError> {
        let Some(role) = proposal.role_of(cell) else {
            return Ok(0.0);
        };
        if !self.gates.open(role) || self.strength.is_zero() {
            return Ok(0.0);
        }
        let registry = ctx.registry();
        let focus = Focus::new(proposal.focus(), cell);
        let s = self.strength.resolve(ctx.symbols(), &focus)?;
        if s == 0.0 {
            return Ok(0.0);
        }
        let direction = self.direction.resolve(ctx.symbols(), &focus)?.normalized();
        let nodes = registry.node_count(cell)? as f64;
        Ok(-s * nodes * center_shift(registry, cell, proposal)?.dot(direction))
    }

    fn hamiltonian(&self, _cell: CellId, _ctx: &EnergyContext<'_>) -> Result<f64, EnergyError> {
        Ok(0.0)
    }
}

// ── PersistentMotion ────────────────────────────────────────────

/// Motion along each cell's own remembered direction.
#[derive(Clone, Debug)]
pub struct PersistentMotion {
    name: String,
    types: CellTypes,
    decay_time: Parameter,
    strength: Parameter,
    gates: Gates,
    whole_chains: bool,
    interval: u32,
    direction_key: String,
    center_key: String,
}

/// Builder for [`PersistentMotion`].
///
/// Required: `decay_time`.
pub struct PersistentMotionBuilder {
    name: String,
    types: CellTypes,
    decay_time: Option<Parameter>,
    strength: Parameter,
    gates: Gates,
    whole_chains: bool,
    interval: u32,
}

impl PersistentMotion {
    /// Create a builder. Strength defaults to 1.0, protrusion to enabled,
    /// retraction to disabled, the update interval to every step.
    pub fn builder() -> PersistentMotionBuilder {
        PersistentMotionBuilder {
            name: "persistent_motion".to_string(),
            types: CellTypes::all(),
            decay_time: None,
            strength: Parameter::Constant(1.0),
            gates: Gates {
                protrusion: true,
                retraction: false,
            },
            whole_chains: false,
            interval: 1,
        }
    }

    /// Property key of the remembered direction.
    pub fn direction_key(&self) -> &str {
        &self.direction_key
    }

    /// Property key of the center recorded at the last update.
    pub fn center_key(&self) -> &str {
        &self.center_key
    }

    fn admits(&self, registry: &CellRegistry, cell: CellId) -> bool {
        registry
            .cell(cell)
            .map(|r| self.applies_to(r.class(), r.cell_type()))
            .unwrap_or(false)
    }
}

impl PersistentMotionBuilder {
    /// Instance name (default `"persistent_motion"`). Also prefixes the
    /// property keys.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Attach to `cell_type`. Without any call, every type is selected.
    pub fn cell_type(mut self, cell_type: CellTypeId) -> Self {
        self.types.push(cell_type);
        self
    }

    /// Memory decay time, in Monte Carlo steps.
    pub fn decay_time(mut self, decay_time: impl Into<Parameter>) -> Self {
        self.decay_time = Some(decay_time.into());
        self
    }

    /// Motion strength.
    pub fn strength(mut self, strength: impl Into<Parameter>) -> Self {
        self.strength = strength.into();
        self
    }

    /// Respond when a cell gains a site (default `true`).
    pub fn protrusion(mut self, on: bool) -> Self {
        self.gates.protrusion = on;
        self
    }

    /// Respond when a cell loses a site (default `false`).
    pub fn retraction(mut self, on: bool) -> Self {
        self.gates.retraction = on;
        self
    }

    /// Move composites as a whole instead of segment by segment
    /// (default `false`).
    pub fn whole_chains(mut self, on: bool) -> Self {
        self.whole_chains = on;
        self
    }

    /// Steps between direction updates (default 1).
    pub fn interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    /// Build the plugin. Logs a warning when both gates are closed.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `decay_time` is missing or a non-positive
    /// constant, the strength is a negative constant, or the interval
    /// is 0.
    pub fn build(self) -> Result<PersistentMotion, PluginError> {
        let decay_time = self
            .decay_time
            .ok_or_else(|| PluginError::invalid(&self.name, "decay_time", "decay_time is required"))?;
        if let Some(t) = decay_time.constant() {
            if !t.is_finite() || t <= 0.0 {
                return Err(PluginError::invalid(
                    &self.name,
                    "decay_time",
                    format!("must be finite and > 0, got {t}"),
                ));
            }
        }
        check_non_negative(&self.name, "strength", &self.strength)?;
        if self.interval == 0 {
            return Err(PluginError::ZeroInterval { name: self.name });
        }
        self.gates.warn_if_closed(&self.name);
        Ok(PersistentMotion {
            direction_key: format!("{}.direction", self.name),
            center_key: format!("{}.stored_center", self.name),
            name: self.name,
            types: self.types,
            decay_time,
            strength: self.strength,
            gates: self.gates,
            whole_chains: self.whole_chains,
            interval: self.interval,
        })
    }
}

impl Plugin for PersistentMotion {
    fn name(&self) -> &str {
        &self.name
    }
}

impl EnergyContributor for PersistentMotion {
    fn applies_to(&self, class: CellClass, cell_type: CellTypeId) -> bool {
        motile(class, self.whole_chains) && self.types.admits(cell_type)
    }

    fn delta(
        &self,
        cell: CellId,
        proposal: &UpdateProposal,
        ctx: &EnergyContext<'_>,
    ) -> Result<f64, EnergyError> {
        let Some(role) = proposal.role_of(cell) else {
            return Ok(0.0);
        };
        if !self.gates.open(role) || self.strength.is_zero() {
            return Ok(0.0);
        }
        let Some(direction) = ctx.properties().vector(cell, &self.direction_key) else {
            return Ok(0.0);
        };
        let registry = ctx.registry();
        let s = self
            .strength
            .resolve(ctx.symbols(), &Focus::new(proposal.focus(), cell))?;
        if s == 0.0 {
            return Ok(0.0);
        }
        let nodes = registry.node_count(cell)? as f64;
        Ok(-s * nodes * center_shift(registry, cell, proposal)?.dot(direction))
    }

    fn hamiltonian(&self, _cell: CellId, _ctx: &EnergyContext<'_>) -> Result<f64, EnergyError> {
        Ok(0.0)
    }
}

impl TimeStepListener for PersistentMotion {
    fn interval(&self) -> u32 {
        self.interval
    }

    fn on_time_step(
        &self,
        step: &TimeStep<'_>,
        properties: &mut CellProperties,
    ) -> Result<(), EnergyError> {
        let registry = step.registry;
        let lattice = registry.lattice();
        let cells: Vec<CellId> = registry
            .cells()
            .filter(|r| self.applies_to(r.class(), r.cell_type()))
            .map(|r| r.id())
            .collect();
        for cell in cells {
            let center = registry.center(cell)?;
            // A cell seen for the first time only records its position.
            if let Some(stored) = properties.vector(cell, &self.center_key) {
                let decay_time = self
                    .decay_time
                    .resolve(step.symbols, &center_focus(registry, cell))?;
                let rate = (f64::from(self.interval) / decay_time).clamp(0.0, 1.0);
                let shift = lattice.to_orth(lattice.node_distance(center, stored));
                let old = properties
                    .vector(cell, &self.direction_key)
                    .unwrap_or_default();
                let direction = old * (1.0 - rate) + shift.normalized() * rate;
                if !direction.is_finite() {
                    return Err(EnergyError::NonFinite { value: rate });
                }
                properties.set(cell, &self.direction_key, PropertyValue::Vector(direction));
            }
            properties.set(cell, &self.center_key, PropertyValue::Vector(center));
        }
        Ok(())
    }
}

impl StateReporter for PersistentMotion {
    fn report(&self, ctx: &EnergyContext<'_>, sink: &mut dyn ReportSink) -> Result<(), EnergyError> {
        let properties = ctx.properties();
        for cell in properties.cells() {
            if !self.admits(ctx.registry(), cell) {
                continue;
            }
            for key in [&self.direction_key, &self.center_key] {
                if let Some(v) = properties.vector(cell, key) {
                    sink.record(Report {
                        cell,
                        name: key.clone(),
                        value: ReportValue::Vector(v),
                    });
                }
            }
        }
        Ok(())
    }
}
