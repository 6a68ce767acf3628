//! Core types and traits for the Potts lattice engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the identifiers, lattice coordinates, vector arithmetic, error types,
//! and the symbol-resolution trait shared by every other crate in the
//! workspace.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod geometry;
pub mod id;
pub mod symbol;

pub use error::{EnergyError, RegistryError, StepError, SymbolError};
pub use geometry::{Site, Vec3};
pub use id::{CellId, CellTypeId, McsId};
pub use symbol::{Focus, NoSymbols, SymbolSource};
