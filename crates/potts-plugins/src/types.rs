//! Cell-type selection shared by the plugins.

use potts_cells::CellRegistry;
use potts_core::{CellId, CellTypeId, Focus, Site};

/// The cell types a plugin instance is attached to.
///
/// An empty selection admits every type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CellTypes(Vec<CellTypeId>);

impl CellTypes {
    /// Admit every type.
    pub fn all() -> Self {
        Self(Vec::new())
    }

    /// Add one type to the selection.
    pub fn push(&mut self, cell_type: CellTypeId) {
        if !self.0.contains(&cell_type) {
            self.0.push(cell_type);
        }
    }

    /// Whether `cell_type` is selected.
    pub fn admits(&self, cell_type: CellTypeId) -> bool {
        self.0.is_empty() || self.0.contains(&cell_type)
    }
}

impl FromIterator<CellTypeId> for CellTypes {
    fn from_iter<I: IntoIterator<Item = CellTypeId>>(iter: I) -> Self {
        let mut out = Self::all();
        for t in iter {
            out.push(t);
        }
        out
    }
}

/// Focus on the lattice site nearest the center of `cell`.
///
/// Used when a parameter is evaluated outside a proposal, e.g. for
/// `hamiltonian()` or between sweeps.
pub(crate) fn center_focus(registry: &CellRegistry, cell: CellId) -> Focus {
    let c = registry.center(cell).unwrap_or_default();
    let site = Site::new(c.x.round() as i32, c.y.round() as i32, c.z.round() as i32);
    Focus::new(site, cell)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selection_admits_everything() {
        let all = CellTypes::all();
        assert!(all.admits(CellTypeId(0)));
        assert!(all.admits(CellTypeId(42)));

        let some: CellTypes = [CellTypeId(2), CellTypeId(2), CellTypeId(5)].into_iter().collect();
        assert!(some.admits(CellTypeId(5)));
        assert!(!some.admits(CellTypeId(1)));
    }
}
