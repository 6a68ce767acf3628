//! Plugin capabilities for the Potts engine.
//!
//! A plugin implements any subset of three small capabilities:
//!
//! - [`EnergyContributor`]: energy deltas for proposals, plus an absolute
//!   per-cell energy for diagnostics;
//! - [`StateReporter`]: read-only per-cell values pushed to a sink;
//! - [`TimeStepListener`]: bookkeeping between sweeps.
//!
//! A [`PluginSet`] holds one typed list per capability, in registration
//! order. The same plugin may sit in several lists.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod context;
pub mod contributor;
pub mod error;
pub mod listener;
pub mod parameter;
pub mod plugin_set;
pub mod reporter;

pub use context::EnergyContext;
pub use contributor::{EnergyContributor, Plugin};
pub use error::PluginError;
pub use listener::{TimeStep, TimeStepListener};
pub use parameter::{Parameter, VectorParameter};
pub use plugin_set::PluginSet;
pub use reporter::{Report, ReportSink, ReportValue, StateReporter};
