//! Symbol resolution surface.
//!
//! Plugins may bind their parameters to named quantities owned by an
//! external scope (a PDE field, a per-cell property computed elsewhere).
//! The engine never evaluates expressions itself; it asks a
//! [`SymbolSource`] for the value at a [`Focus`].

use crate::error::SymbolError;
use crate::geometry::{Site, Vec3};
use crate::id::CellId;

/// Where a symbol is evaluated: a lattice site and the cell under it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Focus {
    /// The lattice site.
    pub site: Site,
    /// The cell the quantity is requested for.
    pub cell: CellId,
}

impl Focus {
    /// Focus on `cell` at `site`.
    pub fn new(site: Site, cell: CellId) -> Self {
        Self { site, cell }
    }
}

/// External provider of scalar and vector quantities.
///
/// Implementations must be thread-safe: parallel sweeps evaluate plugins
/// from several workers at once.
pub trait SymbolSource: Send + Sync {
    /// Resolve a scalar quantity at `focus`.
    fn scalar(&self, symbol: &str, focus: &Focus) -> Result<f64, SymbolError>;

    /// Resolve a vector quantity at `focus`.
    fn vector(&self, symbol: &str, focus: &Focus) -> Result<Vec3, SymbolError>;
}

/// A symbol source that knows no symbols.
///
/// Suitable when every plugin parameter is a constant.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSymbols;

impl SymbolSource for NoSymbols {
    fn scalar(&self, symbol: &str, _focus: &Focus) -> Result<f64, SymbolError> {
        Err(SymbolError::Unknown {
            symbol: symbol.to_string(),
        })
    }

    fn vector(&self, symbol: &str, _focus: &Focus) -> Result<Vec3, SymbolError> {
        Err(SymbolError::Unknown {
            symbol: symbol.to_string(),
        })
    }
}
