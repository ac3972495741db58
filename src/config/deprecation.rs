//! Renamed configuration options
//!
//! Old option names keep working on both the read and the write path; the
//! store substitutes the replacement and emits a warning.

/// An option that was renamed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deprecation {
    /// Old option name
    pub option: &'static str,
    /// Current option name
    pub replacement: &'static str,
    /// Release that deprecated the old name
    pub since: &'static str,
}

pub const CONFIG_DEPRECATIONS: &[Deprecation] = &[
    Deprecation {
        option: "profile_runtime",
        replacement: "resource_monitor",
        since: "1.0",
    },
    Deprecation {
        option: "filemanip_level",
        replacement: "utils_level",
        since: "1.0",
    },
];

/// Look up a deprecated option name
pub fn find_deprecation(option: &str) -> Option<&'static Deprecation> {
    CONFIG_DEPRECATIONS.iter().find(|d| d.option == option)
}
