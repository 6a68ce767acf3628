//! Setup-time plugin validation errors.

use std::error::Error;
use std::fmt;

/// A plugin was configured or registered incorrectly.
#[derive(Clone, Debug, PartialEq)]
pub enum PluginError {
    /// Two plugins of the same capability share a name.
    DuplicateName {
        /// The repeated name.
        name: String,
    },
    /// A parameter is out of range or missing.
    InvalidParameter {
        /// The plugin being built.
        plugin: String,
        /// The offending parameter.
        parameter: String,
        /// What is wrong with it.
        reason: String,
    },
    /// A time-step listener asked to fire every 0 steps.
    ZeroInterval {
        /// The listener.
        name: String,
    },
}

impl PluginError {
    /// Shorthand for [`PluginError::InvalidParameter`].
    pub fn invalid(plugin: &str, parameter: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            plugin: plugin.to_string(),
            parameter: parameter.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for PluginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateName { name } => write!(f, "plugin name '{name}' registered twice"),
            Self::InvalidParameter {
                plugin,
                parameter,
                reason,
            } => write!(f, "plugin '{plugin}': invalid {parameter}: {reason}"),
            Self::ZeroInterval { name } => {
                write!(f, "listener '{name}' has a zero time-step interval")
            }
        }
    }
}

impl Error for PluginError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_plugin_and_parameter() {
        let err = PluginError::invalid("volume", "target", "must be finite");
        assert_eq!(err.to_string(), "plugin 'volume': invalid target: must be finite");
    }
}
