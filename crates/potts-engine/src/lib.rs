//! Metropolis engine for Cellular Potts models.
//!
//! Provides [`MetropolisEngine`], which drives copy attempts over a
//! [`CellRegistry`](potts_cells::CellRegistry), aggregates energy deltas
//! from the registered plugins, enforces composite-cell chain
//! connectivity through the [`CompositeCellCoordinator`], and runs
//! sweeps either serially or partitioned across worker threads.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod composite;
pub mod config;
pub mod edge;
pub mod metrics;
pub mod metropolis;
pub mod sweep;

pub use composite::{CompositeCellCoordinator, CompositeVerdict};
pub use config::{ConfigError, EngineConfig, Stepper};
pub use edge::EdgeTracker;
pub use metrics::SweepMetrics;
pub use metropolis::{EngineState, MetropolisEngine, StepOutcome};
pub use sweep::ROUND_BATCH;
