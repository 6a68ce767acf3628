//! Strongly-typed identifiers.

use std::fmt;

/// Identifies a cell record in the cell registry.
///
/// Ids are dense arena indices, stable for the lifetime of the cell.
/// `CellId(0)` is reserved for the medium (background) that owns every
/// site not claimed by a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub u32);

impl CellId {
    /// The background pseudo-cell.
    pub const MEDIUM: CellId = CellId(0);

    /// Whether this is the medium id.
    pub fn is_medium(self) -> bool {
        self == Self::MEDIUM
    }

    /// Arena index of this id.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for CellId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a cell type.
///
/// Cell types select which energy contributors apply to a cell and key
/// the contact-energy table. `CellTypeId(0)` is the medium's type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellTypeId(pub u32);

impl CellTypeId {
    /// The type carried by the medium.
    pub const MEDIUM: CellTypeId = CellTypeId(0);
}

impl fmt::Display for CellTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for CellTypeId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Monotonically increasing Monte Carlo step counter.
///
/// One MCS is one sweep of copy attempts over the lattice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct McsId(pub u64);

impl McsId {
    /// The following step.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for McsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for McsId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
