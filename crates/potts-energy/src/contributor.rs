//! The [`EnergyContributor`] capability.

use potts_cells::{CellClass, UpdateProposal};
use potts_core::{CellId, CellTypeId, EnergyError};

use crate::context::EnergyContext;

/// Common identity of every plugin capability.
pub trait Plugin: Send + Sync {
    /// Name used in diagnostics and fatal error messages. Unique per
    /// capability list.
    fn name(&self) -> &str;
}

/// A term of the total energy.
///
/// # Contract
///
/// - `delta()` is evaluated against the committed registry plus the
///   proposal's precomputed interface changes. It MUST NOT mutate shared
///   state; `&self` and the shared [`EnergyContext`] enforce this.
/// - `delta()` for a cell the term does not apply to is never called;
///   the engine filters with [`applies_to`](Self::applies_to).
/// - A term configured with strength 0 returns exactly 0.0.
/// - `hamiltonian()` is for diagnostics only; acceptance uses deltas.
///
/// # Examples
///
/// A term that charges a fixed cost for every site a cell gains:
///
/// ```
/// use potts_cells::{CellClass, CellRole, UpdateProposal};
/// use potts_core::{CellId, CellTypeId, EnergyError};
/// use potts_energy::{EnergyContext, EnergyContributor, Plugin};
///
/// struct GrowthCost(f64);
///
/// impl Plugin for GrowthCost {
///     fn name(&self) -> &str { "growth_cost" }
/// }
///
/// impl EnergyContributor for GrowthCost {
///     fn applies_to(&self, class: CellClass, _cell_type: CellTypeId) -> bool {
///         class == CellClass::Atomic
///     }
///
///     fn delta(
///         &self,
///         cell: CellId,
///         proposal: &UpdateProposal,
///         _ctx: &EnergyContext<'_>,
///     ) -> Result<f64, EnergyError> {
///         Ok(match proposal.role_of(cell) {
///             Some(CellRole::Gains) => self.0,
///             _ => 0.0,
///         })
///     }
///
///     fn hamiltonian(&self, _cell: CellId, _ctx: &EnergyContext<'_>) -> Result<f64, EnergyError> {
///         Ok(0.0)
///     }
/// }
///
/// assert_eq!(GrowthCost(1.0).name(), "growth_cost");
/// ```
pub trait EnergyContributor: Plugin {
    /// Whether this term applies to cells of `class` and `cell_type`.
    fn applies_to(&self, class: CellClass, cell_type: CellTypeId) -> bool;

    /// Change of this term's energy for `cell` if `proposal` were
    /// committed. `cell` is one of the proposal's acting cells.
    fn delta(
        &self,
        cell: CellId,
        proposal: &UpdateProposal,
        ctx: &EnergyContext<'_>,
    ) -> Result<f64, EnergyError>;

    /// Current absolute energy of this term for `cell`.
    fn hamiltonian(&self, cell: CellId, ctx: &EnergyContext<'_>) -> Result<f64, EnergyError>;
}
