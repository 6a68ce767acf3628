//! Cell registry and update proposals.
//!
//! The [`CellRegistry`] is the authoritative site-to-cell map. It keeps
//! per-cell node sets, interface lengths, and centers up to date
//! incrementally as [`UpdateProposal`]s are committed. Proposals are
//! immutable snapshots of one candidate copy attempt, built against the
//! committed state so energy terms can evaluate them without mutating
//! anything.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod hash;
pub mod properties;
pub mod proposal;
pub mod record;
pub mod registry;

pub use properties::{CellProperties, PropertyValue};
pub use proposal::{CellRole, InterfaceChange, InterfaceEntry, OperationKind, UpdateProposal};
pub use record::{CellClass, CellKind, CellRecord, CompositeInfo};
pub use registry::CellRegistry;
