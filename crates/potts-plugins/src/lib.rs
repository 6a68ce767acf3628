//! Reference energy plugins for the Potts engine.
//!
//! Each plugin is constructed through a builder that validates its
//! configuration and returns [`PluginError`](potts_energy::PluginError)
//! on bad input.
//!
//! | plugin                  | capabilities                        | acts on                 |
//! |-------------------------|-------------------------------------|-------------------------|
//! | [`InteractionEnergy`]   | energy                              | medium, cells, segments |
//! | [`VolumeConstraint`]    | energy                              | cells, segments         |
//! | [`SurfaceConstraint`]   | energy                              | cells, segments         |
//! | [`DirectedMotion`]      | energy                              | cells, segments or chains |
//! | [`PersistentMotion`]    | energy, time-step listener, reporter| cells, segments or chains |
//! | [`RodMechanics`]        | energy                              | composites              |
//!
//! Every plugin returns exactly 0.0 when its strength is 0.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod interaction;
pub mod motility;
pub mod rod;
pub mod surface;
pub mod types;
pub mod volume;

pub use interaction::{InteractionEnergy, InteractionEnergyBuilder};
pub use motility::{
    DirectedMotion, DirectedMotionBuilder, PersistentMotion, PersistentMotionBuilder,
};
pub use rod::{BendingModel, RodMechanics, RodMechanicsBuilder};
pub use surface::{SurfaceConstraint, SurfaceConstraintBuilder};
pub use types::CellTypes;
pub use volume::{VolumeConstraint, VolumeConstraintBuilder};
