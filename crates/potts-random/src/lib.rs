//! Deterministic random streams.
//!
//! Every worker owns one [`RandomSource`]; streams are never shared. A
//! [`RandomPool`] seeds all of them from a single master seed so a run is
//! reproducible for a fixed seed and a fixed worker count.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod pool;
pub mod source;

pub use pool::RandomPool;
pub use source::RandomSource;
