//! Reusable plugin test fixtures.
//!
//! - [`ConstantDelta`]: fixed energy change per gained or lost site.
//! - [`FailingContributor`]: fails deterministically after N calls.
//! - [`RecordingListener`]: records the steps it fired at.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use potts_cells::{CellClass, CellProperties, CellRole, UpdateProposal};
use potts_core::{CellId, CellTypeId, EnergyError, McsId, SymbolError};
use potts_energy::{EnergyContext, EnergyContributor, Plugin, TimeStep, TimeStepListener};

/// Charges `on_gain` to a cell gaining the focus and `on_loss` to one
/// losing it. Applies to every site-owning cell except the medium.
pub struct ConstantDelta {
    pub name: String,
    pub on_gain: f64,
    pub on_loss: f64,
}

impl ConstantDelta {
    pub fn new(name: impl Into<String>, on_gain: f64, on_loss: f64) -> Self {
        Self {
            name: name.into(),
            on_gain,
            on_loss,
        }
    }
}

impl Plugin for ConstantDelta {
    fn name(&self) -> &str {
        &self.name
    }
}

impl EnergyContributor for ConstantDelta {
    fn applies_to(&self, class: CellClass, _cell_type: CellTypeId) -> bool {
        matches!(class, CellClass::Atomic | CellClass::SubCell)
    }

    fn delta(
        &self,
        cell: CellId,
        proposal: &UpdateProposal,
        _ctx: &EnergyContext<'_>,
    ) -> Result<f64, EnergyError> {
        Ok(match proposal.role_of(cell) {
            Some(CellRole::Gains) => self.on_gain,
            Some(CellRole::Loses) => self.on_loss,
            _ => 0.0,
        })
    }

    fn hamiltonian(&self, _cell: CellId, _ctx: &EnergyContext<'_>) -> Result<f64, EnergyError> {
        Ok(0.0)
    }
}

/// Succeeds `succeed_count` times with ΔE = 0, then fails with a symbol
/// resolution error.
pub struct FailingContributor {
    pub name: String,
    pub succeed_count: usize,
    calls: AtomicUsize,
}

impl FailingContributor {
    pub fn new(name: impl Into<String>, succeed_count: usize) -> Self {
        Self {
            name: name.into(),
            succeed_count,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Plugin for FailingContributor {
    fn name(&self) -> &str {
        &self.name
    }
}

impl EnergyContributor for FailingContributor {
    fn applies_to(&self, class: CellClass, _cell_type: CellTypeId) -> bool {
        class != CellClass::Medium
    }

    fn delta(
        &self,
        _cell: CellId,
        _proposal: &UpdateProposal,
        _ctx: &EnergyContext<'_>,
    ) -> Result<f64, EnergyError> {
        let n = self.calls.fetch_add(1, Ordering::Relaxed);
        if n < self.succeed_count {
            Ok(0.0)
        } else {
            Err(SymbolError::Unknown {
                symbol: "missing".to_string(),
            }
            .into())
        }
    }

    fn hamiltonian(&self, _cell: CellId, _ctx: &EnergyContext<'_>) -> Result<f64, EnergyError> {
        Ok(0.0)
    }
}

/// Records the step numbers it fired at.
pub struct RecordingListener {
    pub name: String,
    pub interval: u32,
    fired: Mutex<Vec<McsId>>,
}

impl RecordingListener {
    pub fn new(name: impl Into<String>, interval: u32) -> Self {
        Self {
            name: name.into(),
            interval,
            fired: Mutex::new(Vec::new()),
        }
    }

    pub fn fired(&self) -> Vec<McsId> {
        self.fired.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Plugin for RecordingListener {
    fn name(&self) -> &str {
        &self.name
    }
}

impl TimeStepListener for RecordingListener {
    fn interval(&self) -> u32 {
        self.interval
    }

    fn on_time_step(
        &self,
        step: &TimeStep<'_>,
        _properties: &mut CellProperties,
    ) -> Result<(), EnergyError> {
        if let Ok(mut fired) = self.fired.lock() {
            fired.push(step.mcs);
        }
        Ok(())
    }
}
