//! Typed capability lists and deterministic aggregation.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexSet;
use potts_cells::{CellClass, UpdateProposal};
use potts_core::{CellId, CellTypeId, EnergyError, StepError};
use smallvec::SmallVec;

use crate::context::EnergyContext;
use crate::contributor::{EnergyContributor, Plugin};
use crate::error::PluginError;
use crate::listener::{is_due, TimeStep, TimeStepListener};
use crate::reporter::{ReportSink, StateReporter};
use potts_cells::CellProperties;

/// The registered plugins, one list per capability.
///
/// Registration order is evaluation order. Deltas are summed plugin by
/// plugin, and within a plugin over the acting cells in proposal order
/// (losing, gaining, composite parents), so identical inputs give
/// bit-identical sums.
#[derive(Clone, Default)]
pub struct PluginSet {
    energy: Vec<Arc<dyn EnergyContributor>>,
    reporters: Vec<Arc<dyn StateReporter>>,
    listeners: Vec<Arc<dyn TimeStepListener>>,
}

impl PluginSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an energy term.
    pub fn with_energy(mut self, plugin: Arc<dyn EnergyContributor>) -> Self {
        self.energy.push(plugin);
        self
    }

    /// Register a reporter.
    pub fn with_reporter(mut self, plugin: Arc<dyn StateReporter>) -> Self {
        self.reporters.push(plugin);
        self
    }

    /// Register a time-step listener.
    pub fn with_listener(mut self, plugin: Arc<dyn TimeStepListener>) -> Self {
        self.listeners.push(plugin);
        self
    }

    /// Energy terms in registration order.
    pub fn energy(&self) -> &[Arc<dyn EnergyContributor>] {
        &self.energy
    }

    /// Reporters in registration order.
    pub fn reporters(&self) -> &[Arc<dyn StateReporter>] {
        &self.reporters
    }

    /// Listeners in registration order.
    pub fn listeners(&self) -> &[Arc<dyn TimeStepListener>] {
        &self.listeners
    }

    /// Check names are unique per capability and intervals positive.
    pub fn validate(&self) -> Result<(), PluginError> {
        unique_names(self.energy.iter().map(|p| p.name()))?;
        unique_names(self.reporters.iter().map(|p| p.name()))?;
        unique_names(self.listeners.iter().map(|p| p.name()))?;
        for listener in &self.listeners {
            if listener.interval() == 0 {
                return Err(PluginError::ZeroInterval {
                    name: listener.name().to_string(),
                });
            }
        }
        Ok(())
    }

    // ── Evaluation ──────────────────────────────────────────────

    /// Total energy change of `proposal` across every applicable term.
    pub fn delta(&self, proposal: &UpdateProposal, ctx: &EnergyContext<'_>) -> Result<f64, StepError> {
        let registry = ctx.registry();
        let mut acting: SmallVec<[(CellId, CellClass, CellTypeId); 4]> = SmallVec::new();
        for cell in proposal.acting_cells() {
            let record = registry.cell(cell)?;
            acting.push((cell, record.class(), record.cell_type()));
        }
        let mut total = 0.0;
        for plugin in &self.energy {
            for &(cell, class, cell_type) in &acting {
                if plugin.applies_to(class, cell_type) {
                    total += checked(plugin.as_ref(), plugin.delta(cell, proposal, ctx))?;
                }
            }
        }
        Ok(total)
    }

    /// Absolute energy of one cell across every applicable term.
    pub fn hamiltonian(&self, cell: CellId, ctx: &EnergyContext<'_>) -> Result<f64, StepError> {
        let record = ctx.registry().cell(cell)?;
        let (class, cell_type) = (record.class(), record.cell_type());
        let mut total = 0.0;
        for plugin in &self.energy {
            if plugin.applies_to(class, cell_type) {
                total += checked(plugin.as_ref(), plugin.hamiltonian(cell, ctx))?;
            }
        }
        Ok(total)
    }

    /// Absolute energy of the whole system.
    pub fn total_hamiltonian(&self, ctx: &EnergyContext<'_>) -> Result<f64, StepError> {
        let mut total = 0.0;
        for record in ctx.registry().cells() {
            total += self.hamiltonian(record.id(), ctx)?;
        }
        Ok(total)
    }

    /// Run every reporter into `sink`.
    pub fn report(&self, ctx: &EnergyContext<'_>, sink: &mut dyn ReportSink) -> Result<(), StepError> {
        for reporter in &self.reporters {
            reporter
                .report(ctx, sink)
                .map_err(|reason| StepError::PluginFailed {
                    name: reporter.name().to_string(),
                    reason,
                })?;
        }
        Ok(())
    }

    /// Fire the listeners due after `step.mcs`. Returns how many fired.
    pub fn fire_listeners(
        &self,
        step: &TimeStep<'_>,
        properties: &mut CellProperties,
    ) -> Result<usize, StepError> {
        let mut fired = 0;
        for listener in &self.listeners {
            if !is_due(listener.interval(), step.mcs) {
                continue;
            }
            listener
                .on_time_step(step, properties)
                .map_err(|reason| StepError::ListenerFailed {
                    name: listener.name().to_string(),
                    reason,
                })?;
            fired += 1;
        }
        Ok(fired)
    }
}

fn unique_names<'a>(names: impl Iterator<Item = &'a str>) -> Result<(), PluginError> {
    let mut seen = IndexSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(PluginError::DuplicateName {
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

fn checked<P: Plugin + ?Sized>(plugin: &P, value: Result<f64, EnergyError>) -> Result<f64, StepError> {
    let fail = |reason| StepError::PluginFailed {
        name: plugin.name().to_string(),
        reason,
    };
    let value = value.map_err(fail)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(fail(EnergyError::NonFinite { value }))
    }
}

impl fmt::Debug for PluginSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginSet")
            .field("energy", &self.energy.iter().map(|p| p.name()).collect::<Vec<_>>())
            .field("reporters", &self.reporters.iter().map(|p| p.name()).collect::<Vec<_>>())
            .field("listeners", &self.listeners.iter().map(|p| p.name()).collect::<Vec<_>>())
            .finish()
    }
}
