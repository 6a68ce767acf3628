//! Static lattice geometry for the Potts engine.
//!
//! A [`LatticeDescriptor`] fixes the structure (linear, square,
//! hexagonal, cubic), the extent, the boundary type of each of the six
//! half-axes, the node spacing, and a default [`Neighborhood`]. It is
//! immutable after construction and freely shared between workers.
//!
//! # Neighborhoods
//!
//! Neighborhoods are slices of each structure's canonical direction
//! table, selected by topological order, Euclidean distance, or a named
//! template (see [`NeighborhoodSpec`]).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod boundary;
pub mod descriptor;
pub mod error;
pub mod neighborhood;
pub mod structure;

#[cfg(test)]
pub(crate) mod compliance;

pub use boundary::{Boundary, HalfAxis};
pub use descriptor::{LatticeConfig, LatticeDescriptor};
pub use error::LatticeError;
pub use neighborhood::{Neighborhood, NeighborhoodSpec, Neighbors};
pub use structure::Structure;
