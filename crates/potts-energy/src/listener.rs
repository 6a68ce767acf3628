//! The [`TimeStepListener`] capability.

use potts_cells::{CellProperties, CellRegistry};
use potts_core::{EnergyError, McsId, SymbolSource};

use crate::contributor::Plugin;

/// What a listener sees between sweeps.
#[derive(Clone, Copy)]
pub struct TimeStep<'a> {
    /// The step that just finished.
    pub mcs: McsId,
    /// Committed cell state.
    pub registry: &'a CellRegistry,
    /// External symbol provider.
    pub symbols: &'a dyn SymbolSource,
}

/// Bookkeeping that runs between sweeps.
///
/// Listeners are the only writers of [`CellProperties`]. They never
/// touch site ownership.
pub trait TimeStepListener: Plugin {
    /// Fire after every `interval()` completed steps. Must be positive.
    fn interval(&self) -> u32 {
        1
    }

    /// Update per-cell properties.
    fn on_time_step(
        &self,
        step: &TimeStep<'_>,
        properties: &mut CellProperties,
    ) -> Result<(), EnergyError>;
}

/// Whether a listener with `interval` fires after step `mcs`.
pub(crate) fn is_due(interval: u32, mcs: McsId) -> bool {
    interval > 0 && mcs.0 % u64::from(interval) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_every_interval() {
        let fired: Vec<u64> = (1..=10).filter(|&m| is_due(3, McsId(m))).collect();
        assert_eq!(fired, vec![3, 6, 9]);
        assert!(!is_due(0, McsId(5)));
        assert!(is_due(1, McsId(7)));
    }
}
