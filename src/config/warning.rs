//! User-visible warnings raised by the configuration store

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A renamed option was read or written under its old name
    DeprecatedOption {
        option: String,
        since: String,
        replacement: String,
    },
    /// The resource monitor was requested but the sampler is unusable
    ResourceMonitorUnavailable,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeprecatedOption {
                option,
                since,
                replacement,
            } => write!(
                f,
                "Config option \"{}\" has been deprecated as of nipype {}. Please use \"{}\" instead.",
                option, since, replacement
            ),
            Self::ResourceMonitorUnavailable => write!(
                f,
                "Could not enable the resource monitor: psutil>=5.0 could not be imported."
            ),
        }
    }
}
