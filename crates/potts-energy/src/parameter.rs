//! Plugin parameters that are either constants or external symbols.

use potts_core::{EnergyError, Focus, SymbolSource, Vec3};

/// A scalar parameter.
#[derive(Clone, Debug, PartialEq)]
pub enum Parameter {
    /// A fixed value.
    Constant(f64),
    /// A quantity resolved by the symbol source at the focus.
    Symbol(String),
}

impl Parameter {
    /// Evaluate at `focus`.
    pub fn resolve(&self, symbols: &dyn SymbolSource, focus: &Focus) -> Result<f64, EnergyError> {
        match self {
            Self::Constant(v) => Ok(*v),
            Self::Symbol(name) => Ok(symbols.scalar(name, focus)?),
        }
    }

    /// Whether this is the constant 0, letting callers skip evaluation.
    pub fn is_zero(&self) -> bool {
        matches!(self, Self::Constant(v) if *v == 0.0)
    }

    /// The constant value, if any.
    pub fn constant(&self) -> Option<f64> {
        match self {
            Self::Constant(v) => Some(*v),
            Self::Symbol(_) => None,
        }
    }
}

impl From<f64> for Parameter {
    fn from(v: f64) -> Self {
        Self::Constant(v)
    }
}

impl From<&str> for Parameter {
    fn from(name: &str) -> Self {
        Self::Symbol(name.to_string())
    }
}

/// A vector parameter.
#[derive(Clone, Debug, PartialEq)]
pub enum VectorParameter {
    /// A fixed vector.
    Constant(Vec3),
    /// A quantity resolved by the symbol source at the focus.
    Symbol(String),
}

impl VectorParameter {
    /// Evaluate at `focus`.
    pub fn resolve(&self, symbols: &dyn SymbolSource, focus: &Focus) -> Result<Vec3, EnergyError> {
        match self {
            Self::Constant(v) => Ok(*v),
            Self::Symbol(name) => Ok(symbols.vector(name, focus)?),
        }
    }
}

impl From<Vec3> for VectorParameter {
    fn from(v: Vec3) -> Self {
        Self::Constant(v)
    }
}

impl From<&str> for VectorParameter {
    fn from(name: &str) -> Self {
        Self::Symbol(name.to_string())
    }
}
