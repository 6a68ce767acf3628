//! Engine configuration, validation, and error types.
//!
//! [`EngineConfig`] is the single entry point for setting up a
//! [`MetropolisEngine`](crate::MetropolisEngine). It is supplied already
//! resolved by an external loader; [`EngineConfig::validate`] checks the
//! structural invariants before the engine allocates anything.

use std::error::Error;
use std::fmt;

use potts_core::RegistryError;
use potts_energy::PluginError;
use potts_lattice::{LatticeConfig, LatticeError, NeighborhoodSpec, Structure};

// ── Stepper ──────────────────────────────────────────────────────

/// How the focus site of a copy attempt is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Stepper {
    /// Uniformly over every lattice site.
    #[default]
    Random,
    /// Uniformly over sites that touch another cell through the update
    /// neighborhood. Requires a single worker.
    EdgeList,
}

// ── ConfigError ──────────────────────────────────────────────────

/// Errors detected while validating or applying an [`EngineConfig`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The lattice or one of the neighborhoods is invalid.
    Lattice(LatticeError),
    /// Plugin registration failed validation.
    Plugin(PluginError),
    /// Temperature is NaN, zero, or negative.
    InvalidTemperature {
        /// The invalid value.
        value: f64,
    },
    /// `workers` is zero.
    ZeroWorkers,
    /// `updates_per_mcs` is `Some(0)`.
    ZeroUpdates,
    /// The edge-list stepper was combined with a parallel sweep.
    EdgeListNeedsSingleWorker {
        /// The configured worker count.
        workers: usize,
    },
    /// The initial layout could not be applied.
    Layout(RegistryError),
    /// Layout changes were attempted after the engine started stepping.
    AlreadyRunning,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lattice(e) => write!(f, "lattice: {e}"),
            Self::Plugin(e) => write!(f, "plugin: {e}"),
            Self::InvalidTemperature { value } => {
                write!(f, "temperature must be positive, got {value}")
            }
            Self::ZeroWorkers => write!(f, "workers must be at least 1"),
            Self::ZeroUpdates => write!(f, "updates_per_mcs must be at least 1"),
            Self::EdgeListNeedsSingleWorker { workers } => {
                write!(f, "edge-list stepping needs 1 worker, got {workers}")
            }
            Self::Layout(e) => write!(f, "initial layout: {e}"),
            Self::AlreadyRunning => write!(f, "layout is fixed once the engine has stepped"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Lattice(e) => Some(e),
            Self::Plugin(e) => Some(e),
            Self::Layout(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LatticeError> for ConfigError {
    fn from(e: LatticeError) -> Self {
        Self::Lattice(e)
    }
}

impl From<PluginError> for ConfigError {
    fn from(e: PluginError) -> Self {
        Self::Plugin(e)
    }
}

impl From<RegistryError> for ConfigError {
    fn from(e: RegistryError) -> Self {
        Self::Layout(e)
    }
}

// ── EngineConfig ─────────────────────────────────────────────────

/// Complete configuration for a [`MetropolisEngine`](crate::MetropolisEngine).
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Lattice geometry and boundaries.
    pub lattice: LatticeConfig,
    /// Metropolis temperature. `f64::INFINITY` accepts every proposal
    /// that passes the composite check.
    pub temperature: f64,
    /// Master seed. Worker 0 uses it directly; the other workers draw
    /// their seeds from worker 0.
    pub seed: u64,
    /// Number of workers. More than one selects the partitioned sweep.
    pub workers: usize,
    /// Copy attempts per Monte Carlo step. `None` means one per site.
    pub updates_per_mcs: Option<usize>,
    /// Neighborhood the copy source is drawn from.
    pub update_neighborhood: NeighborhoodSpec,
    /// Neighborhood used for interface lengths.
    pub interface_neighborhood: NeighborhoodSpec,
    /// Commits between full center recomputes per cell. 0 disables them.
    pub center_recompute_interval: u32,
    /// Focus sampling strategy.
    pub stepper: Stepper,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lattice: LatticeConfig::new(Structure::Square, [100, 100, 1]),
            temperature: 1.0,
            seed: 0,
            workers: 1,
            updates_per_mcs: None,
            update_neighborhood: NeighborhoodSpec::Order(1),
            interface_neighborhood: NeighborhoodSpec::Order(1),
            center_recompute_interval: 10_000,
            stepper: Stepper::Random,
        }
    }
}

impl EngineConfig {
    /// Check the scalar invariants. Lattice and neighborhood checks run
    /// when the engine resolves them.
    ///
    /// Checks:
    /// 1. temperature is positive (infinity allowed);
    /// 2. at least one worker;
    /// 3. at least one update per step when given explicitly;
    /// 4. the edge-list stepper runs on one worker.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Temperature.
        if self.temperature.is_nan() || self.temperature <= 0.0 {
            return Err(ConfigError::InvalidTemperature {
                value: self.temperature,
            });
        }
        // 2. Workers.
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        // 3. Updates per step.
        if self.updates_per_mcs == Some(0) {
            return Err(ConfigError::ZeroUpdates);
        }
        // 4. Stepper.
        if self.stepper == Stepper::EdgeList && self.workers > 1 {
            return Err(ConfigError::EdgeListNeedsSingleWorker {
                workers: self.workers,
            });
        }
        Ok(())
    }
}
