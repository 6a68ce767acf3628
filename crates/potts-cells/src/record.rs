//! Per-cell records stored in the registry arena.

use indexmap::{IndexMap, IndexSet};
use potts_core::{CellId, CellTypeId, Site, Vec3};

/// Membership data of a composite cell.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeInfo {
    /// Sub-cells in chain order.
    pub members: Vec<CellId>,
    /// One orientation vector per member, in orthogonal space.
    pub orientations: Vec<Vec3>,
    /// Flips the sign of every orientation.
    pub reversed: bool,
}

/// What a cell record represents.
#[derive(Clone, Debug, PartialEq)]
pub enum CellKind {
    /// The background pseudo-cell.
    Medium,
    /// A stand-alone cell owning sites.
    Atomic,
    /// A segment of a composite cell; owns sites.
    SubCell {
        /// The owning composite.
        parent: CellId,
    },
    /// A chain of sub-cells; owns no sites itself.
    Composite(CompositeInfo),
}

impl CellKind {
    /// The fieldless class of this kind.
    pub fn class(&self) -> CellClass {
        match self {
            Self::Medium => CellClass::Medium,
            Self::Atomic => CellClass::Atomic,
            Self::SubCell { .. } => CellClass::SubCell,
            Self::Composite(_) => CellClass::Composite,
        }
    }
}

/// Fieldless cell classification, used to filter energy terms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellClass {
    /// The background.
    Medium,
    /// A stand-alone cell.
    Atomic,
    /// A composite segment.
    SubCell,
    /// A composite cell.
    Composite,
}

/// One cell in the registry arena.
#[derive(Clone, Debug)]
pub struct CellRecord {
    pub(crate) id: CellId,
    pub(crate) cell_type: CellTypeId,
    pub(crate) kind: CellKind,
    pub(crate) nodes: IndexSet<Site>,
    /// Sum of unwrapped node positions; `center * node count` up to
    /// rounding. Shifted whenever the center is folded back into the box.
    pub(crate) node_sum: Vec3,
    pub(crate) center: Vec3,
    pub(crate) interfaces: IndexMap<CellId, u32>,
    pub(crate) since_recompute: u32,
}

impl CellRecord {
    pub(crate) fn new(id: CellId, cell_type: CellTypeId, kind: CellKind) -> Self {
        Self {
            id,
            cell_type,
            kind,
            nodes: IndexSet::new(),
            node_sum: Vec3::ZERO,
            center: Vec3::ZERO,
            interfaces: IndexMap::new(),
            since_recompute: 0,
        }
    }

    /// The cell's id.
    pub fn id(&self) -> CellId {
        self.id
    }

    /// The cell's type.
    pub fn cell_type(&self) -> CellTypeId {
        self.cell_type
    }

    /// What the record represents.
    pub fn kind(&self) -> &CellKind {
        &self.kind
    }

    /// Fieldless classification.
    pub fn class(&self) -> CellClass {
        self.kind.class()
    }

    /// Directly owned sites, in insertion order. Empty for composites.
    pub fn nodes(&self) -> &IndexSet<Site> {
        &self.nodes
    }

    /// Cached center in lattice coordinates.
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Interface lengths to every neighboring cell.
    pub fn interfaces(&self) -> &IndexMap<CellId, u32> {
        &self.interfaces
    }

    /// Sum of all interface lengths.
    pub fn interface_total(&self) -> u32 {
        self.interfaces.values().sum()
    }

    /// The composite this cell belongs to, if any.
    pub fn parent(&self) -> Option<CellId> {
        match self.kind {
            CellKind::SubCell { parent } => Some(parent),
            _ => None,
        }
    }

    /// Composite membership data, if this is a composite.
    pub fn composite(&self) -> Option<&CompositeInfo> {
        match &self.kind {
            CellKind::Composite(info) => Some(info),
            _ => None,
        }
    }
}
