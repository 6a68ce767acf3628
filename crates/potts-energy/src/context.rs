//! Read-only state handed to energy terms and reporters.

use potts_cells::{CellProperties, CellRegistry};
use potts_core::{McsId, SymbolSource};
use potts_lattice::LatticeDescriptor;

/// Everything an energy term may read while evaluating.
///
/// All borrows are shared: evaluation never mutates simulation state, so
/// several workers can hold contexts over the same registry at once.
#[derive(Clone, Copy)]
pub struct EnergyContext<'a> {
    registry: &'a CellRegistry,
    properties: &'a CellProperties,
    symbols: &'a dyn SymbolSource,
    mcs: McsId,
}

impl<'a> EnergyContext<'a> {
    /// Bundle the read-only views.
    pub fn new(
        registry: &'a CellRegistry,
        properties: &'a CellProperties,
        symbols: &'a dyn SymbolSource,
        mcs: McsId,
    ) -> Self {
        Self {
            registry,
            properties,
            symbols,
            mcs,
        }
    }

    /// The committed cell state.
    pub fn registry(&self) -> &'a CellRegistry {
        self.registry
    }

    /// The lattice geometry.
    pub fn lattice(&self) -> &'a LatticeDescriptor {
        self.registry.lattice()
    }

    /// Per-cell properties written by time-step listeners.
    pub fn properties(&self) -> &'a CellProperties {
        self.properties
    }

    /// External symbol provider.
    pub fn symbols(&self) -> &'a dyn SymbolSource {
        self.symbols
    }

    /// The current Monte Carlo step.
    pub fn mcs(&self) -> McsId {
        self.mcs
    }
}
