//! Potts: a lattice Metropolis engine for Cellular Potts tissue models.
//!
//! This is the facade crate that re-exports the public API of the Potts
//! sub-crates. For most users, adding `potts` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use potts::prelude::*;
//!
//! let contact = InteractionEnergy::builder()
//!     .contact(CellTypeId(1), CellTypeId::MEDIUM, 12.0)
//!     .build()
//!     .unwrap();
//! let volume = VolumeConstraint::builder().target(25.0).build().unwrap();
//! let plugins = PluginSet::new()
//!     .with_energy(Arc::new(contact))
//!     .with_energy(Arc::new(volume));
//!
//! let config = EngineConfig {
//!     lattice: LatticeConfig::new(Structure::Square, [32, 32, 1]),
//!     temperature: 5.0,
//!     seed: 42,
//!     ..EngineConfig::default()
//! };
//! let mut engine = MetropolisEngine::new(config, plugins).unwrap();
//! engine
//!     .layout(|reg, _| {
//!         let cell = reg.create_cell(CellTypeId(1));
//!         for x in 12..17 {
//!             for y in 12..17 {
//!                 reg.assign(Site::new(x, y, 0), cell)?;
//!             }
//!         }
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! let metrics = engine.run_mcs(2).unwrap();
//! assert_eq!(metrics.attempts, 2 * 32 * 32);
//! assert_eq!(engine.mcs(), McsId(2));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `potts-core` | ids, sites, vectors, errors, symbol resolution |
//! | [`lattice`] | `potts-lattice` | lattice descriptor, boundaries, neighborhoods |
//! | [`random`] | `potts-random` | seeded per-worker random streams |
//! | [`cells`] | `potts-cells` | cell registry, proposals, per-cell properties |
//! | [`energy`] | `potts-energy` | plugin capabilities and the plugin set |
//! | [`plugins`] | `potts-plugins` | reference energy plugins |
//! | [`engine`] | `potts-engine` | Metropolis engine, composite coordinator, sweeps |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core ids, geometry, errors, and symbol resolution (`potts-core`).
pub use potts_core as types;

/// Lattice geometry and neighborhoods (`potts-lattice`).
///
/// [`lattice::LatticeDescriptor`] is immutable once built and shared by
/// every other component.
pub use potts_lattice as lattice;

/// Seeded random streams (`potts-random`).
pub use potts_random as random;

/// Cell registry and update proposals (`potts-cells`).
pub use potts_cells as cells;

/// Plugin capabilities (`potts-energy`).
///
/// Implement [`energy::EnergyContributor`], [`energy::StateReporter`],
/// or [`energy::TimeStepListener`] to extend the model.
pub use potts_energy as energy;

/// Reference energy plugins (`potts-plugins`).
pub use potts_plugins as plugins;

/// The Metropolis engine (`potts-engine`).
pub use potts_engine as engine;

/// Common imports for typical Potts usage.
///
/// ```rust
/// use potts::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use potts_core::{CellId, CellTypeId, Focus, McsId, Site, SymbolSource, Vec3};

    // Errors
    pub use potts_core::{EnergyError, RegistryError, StepError, SymbolError};

    // Lattice
    pub use potts_lattice::{Boundary, HalfAxis, LatticeConfig, NeighborhoodSpec, Structure};

    // Cells
    pub use potts_cells::{CellClass, CellProperties, CellRegistry, PropertyValue, UpdateProposal};

    // Plugin capabilities
    pub use potts_energy::{
        EnergyContext, EnergyContributor, Parameter, Plugin, PluginSet, ReportSink,
        StateReporter, TimeStepListener,
    };

    // Plugins
    pub use potts_plugins::{
        DirectedMotion, InteractionEnergy, PersistentMotion, RodMechanics, SurfaceConstraint,
        VolumeConstraint,
    };

    // Engine
    pub use potts_engine::{
        ConfigError, EngineConfig, MetropolisEngine, StepOutcome, Stepper, SweepMetrics,
    };
}
