//! Error types for the Potts lattice engine.
//!
//! Organized by subsystem: cell registry, symbol resolution, energy
//! evaluation, and the per-step engine error that wraps them.

use std::error::Error;
use std::fmt;

use crate::geometry::Site;
use crate::id::CellId;

/// Errors from the cell registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// The id is unknown or the cell was destroyed.
    NotFound {
        /// The requested id.
        cell: CellId,
    },
    /// A proposal no longer matches the committed state of its focus.
    ///
    /// Recoverable: the engine discards the proposal and continues.
    StaleProposal {
        /// Focus site of the proposal.
        site: Site,
        /// Owner recorded when the proposal was built.
        expected: CellId,
        /// Owner found at commit time.
        found: CellId,
    },
    /// The site does not lie on the lattice.
    SiteOutOfLattice {
        /// The offending site.
        site: Site,
    },
    /// A composite cell was requested with no members.
    EmptyComposite,
    /// The cell is not a composite.
    NotComposite {
        /// The offending id.
        cell: CellId,
    },
    /// The cell cannot become a composite member.
    AlreadyMember {
        /// The offending id.
        cell: CellId,
    },
    /// Sites can only be assigned to the medium, atomic cells, or sub-cells.
    NotAssignable {
        /// The offending id.
        cell: CellId,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { cell } => write!(f, "cell {cell} not found"),
            Self::StaleProposal {
                site,
                expected,
                found,
            } => write!(
                f,
                "stale proposal at {site}: expected owner {expected}, found {found}"
            ),
            Self::SiteOutOfLattice { site } => write!(f, "site {site} is outside the lattice"),
            Self::EmptyComposite => write!(f, "composite cell needs at least one member"),
            Self::NotComposite { cell } => write!(f, "cell {cell} is not a composite"),
            Self::AlreadyMember { cell } => {
                write!(f, "cell {cell} cannot join a composite")
            }
            Self::NotAssignable { cell } => write!(f, "cell {cell} cannot own sites"),
        }
    }
}

impl Error for RegistryError {}

/// Failure reported by an external symbol source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SymbolError {
    /// No symbol of that name is known.
    Unknown {
        /// The requested symbol.
        symbol: String,
    },
    /// The symbol exists but could not be evaluated at the focus.
    Evaluation {
        /// The requested symbol.
        symbol: String,
        /// Description of the failure.
        reason: String,
    },
}

impl fmt::Display for SymbolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown { symbol } => write!(f, "unknown symbol '{symbol}'"),
            Self::Evaluation { symbol, reason } => {
                write!(f, "cannot evaluate '{symbol}': {reason}")
            }
        }
    }
}

impl Error for SymbolError {}

/// Errors from energy, reporter, or listener evaluation.
#[derive(Clone, Debug, PartialEq)]
pub enum EnergyError {
    /// A referenced symbol could not be resolved. Always fatal.
    SymbolResolution(SymbolError),
    /// A contribution evaluated to NaN or infinity.
    NonFinite {
        /// The offending value.
        value: f64,
    },
    /// Registry lookup failed while evaluating.
    Registry(RegistryError),
}

impl fmt::Display for EnergyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SymbolResolution(e) => write!(f, "symbol resolution failed: {e}"),
            Self::NonFinite { value } => write!(f, "non-finite energy contribution {value}"),
            Self::Registry(e) => write!(f, "registry: {e}"),
        }
    }
}

impl Error for EnergyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::SymbolResolution(e) => Some(e),
            Self::Registry(e) => Some(e),
            Self::NonFinite { .. } => None,
        }
    }
}

impl From<SymbolError> for EnergyError {
    fn from(e: SymbolError) -> Self {
        Self::SymbolResolution(e)
    }
}

impl From<RegistryError> for EnergyError {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

/// Fatal errors that terminate a run.
///
/// Recoverable per-step outcomes (stale proposals, severed composites,
/// energetic rejections) never surface here; they only show up in the
/// sweep statistics.
#[derive(Clone, Debug, PartialEq)]
pub enum StepError {
    /// A plugin failed during evaluation.
    PluginFailed {
        /// Name of the failing plugin.
        name: String,
        /// The underlying error.
        reason: EnergyError,
    },
    /// A time-step listener failed between sweeps.
    ListenerFailed {
        /// Name of the failing listener.
        name: String,
        /// The underlying error.
        reason: EnergyError,
    },
    /// The registry rejected a mutation for a reason other than staleness.
    Registry(RegistryError),
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PluginFailed { name, reason } => write!(f, "plugin '{name}' failed: {reason}"),
            Self::ListenerFailed { name, reason } => {
                write!(f, "listener '{name}' failed: {reason}")
            }
            Self::Registry(e) => write!(f, "registry: {e}"),
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::PluginFailed { reason, .. } | Self::ListenerFailed { reason, .. } => Some(reason),
            Self::Registry(e) => Some(e),
        }
    }
}

impl From<RegistryError> for StepError {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_failure_chains_symbol_error() {
        let err = StepError::PluginFailed {
            name: "directed_motion".into(),
            reason: SymbolError::Unknown {
                symbol: "chemotaxis".into(),
            }
            .into(),
        };
        assert_eq!(
            err.to_string(),
            "plugin 'directed_motion' failed: symbol resolution failed: unknown symbol 'chemotaxis'"
        );
        let source = err.source().and_then(|s| s.source());
        assert!(source.is_some());
    }

    #[test]
    fn stale_proposal_message_names_site() {
        let err = RegistryError::StaleProposal {
            site: Site::new(1, 2, 0),
            expected: CellId(4),
            found: CellId(0),
        };
        assert!(err.to_string().contains("(1, 2, 0)"));
    }
}
