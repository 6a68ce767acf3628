//! Error types for lattice construction.

use std::fmt;

/// Errors arising from lattice or neighborhood construction.
///
/// All of these are configuration errors: they are detected at setup and
/// abort initialization.
#[derive(Debug, Clone, PartialEq)]
pub enum LatticeError {
    /// An axis used by the structure has zero extent.
    EmptyAxis {
        /// Index of the axis.
        axis: usize,
    },
    /// An axis extent does not fit the coordinate type.
    AxisTooLarge {
        /// Index of the axis.
        axis: usize,
        /// The configured extent.
        value: u32,
    },
    /// Node spacing is not a finite positive number.
    InvalidNodeSpacing {
        /// The configured spacing.
        value: f64,
    },
    /// A neighborhood order of zero was requested.
    ZeroOrder,
    /// The requested order exceeds the structure's direction table.
    OrderTooLarge {
        /// The requested order.
        requested: u32,
        /// Largest order the structure supports.
        max: u32,
    },
    /// A neighborhood distance was zero, negative, or not finite.
    InvalidDistance {
        /// The requested distance.
        value: f64,
    },
    /// Distances of 4 node lengths and beyond are not tabulated.
    DistanceTooLarge {
        /// The requested distance.
        value: f64,
    },
    /// A distance selected no neighbors at all.
    EmptyNeighborhood,
    /// No template of this name exists for the structure.
    UnknownNeighborhood {
        /// The requested name.
        name: String,
    },
}

impl fmt::Display for LatticeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyAxis { axis } => write!(f, "lattice axis {axis} has zero extent"),
            Self::AxisTooLarge { axis, value } => {
                write!(f, "lattice axis {axis} extent {value} exceeds i32::MAX")
            }
            Self::InvalidNodeSpacing { value } => {
                write!(f, "node spacing must be finite and positive, got {value}")
            }
            Self::ZeroOrder => write!(f, "neighborhood order must be greater than 0"),
            Self::OrderTooLarge { requested, max } => write!(
                f,
                "maximum neighborhood order for this lattice is {max}, requested {requested}"
            ),
            Self::InvalidDistance { value } => {
                write!(f, "neighborhood distance must be greater than 0, got {value}")
            }
            Self::DistanceTooLarge { value } => write!(
                f,
                "neighborhood distances of 4 or more are not supported, got {value}"
            ),
            Self::EmptyNeighborhood => write!(f, "neighborhood selects no neighbors"),
            Self::UnknownNeighborhood { name } => {
                write!(f, "unknown neighborhood '{name}'")
            }
        }
    }
}

impl std::error::Error for LatticeError {}
