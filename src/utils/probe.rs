//! Resource sampler detection
//!
//! The resource monitor depends on an optional runtime library (psutil)
//! being importable by the Python interpreter that runs pipeline nodes.
//! Only its presence and version are queried here.

use semver::Version;
use std::process::Command;
use tracing::debug;

/// Lowest sampler version the resource monitor works with
pub const MIN_SAMPLER_VERSION: Version = Version::new(5, 0, 0);

/// Source of the resource sampler's version string
#[cfg_attr(test, mockall::automock)]
pub trait ResourceProbe {
    /// Version reported by the sampler, or `None` when it is not installed
    fn sampler_version(&self) -> Option<String>;
}

/// Probe that asks a Python interpreter for `psutil.__version__`
#[derive(Debug, Clone)]
pub struct PsutilProbe {
    interpreter: String,
}

impl PsutilProbe {
    pub fn new() -> Self {
        Self {
            interpreter: "python3".to_string(),
        }
    }

    /// Use a specific interpreter instead of `python3` on PATH
    pub fn with_interpreter<S: Into<String>>(interpreter: S) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }
}

impl Default for PsutilProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceProbe for PsutilProbe {
    fn sampler_version(&self) -> Option<String> {
        let output = Command::new(&self.interpreter)
            .args(["-c", "import psutil; print(psutil.__version__)"])
            .output()
            .ok()?;

        if !output.status.success() {
            debug!("psutil is not importable by {}", self.interpreter);
            return None;
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if version.is_empty() {
            return None;
        }

        debug!("Found psutil {} via {}", version, self.interpreter);
        Some(version)
    }
}

/// Parse a loosely formatted version such as `5.9`, `5.9.0` or `5.4.8.post1`
///
/// Leading numeric components are kept (at most three) and missing ones
/// are padded with zero.
pub fn parse_loose_version(raw: &str) -> Option<Version> {
    let numbers: Vec<u64> = raw
        .trim()
        .split('.')
        .map_while(|part| {
            let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().ok()
        })
        .take(3)
        .collect();

    let major = *numbers.first()?;
    Some(Version::new(
        major,
        numbers.get(1).copied().unwrap_or(0),
        numbers.get(2).copied().unwrap_or(0),
    ))
}

/// Whether the probe reports a usable sampler
pub fn sampler_available(probe: &dyn ResourceProbe) -> bool {
    probe
        .sampler_version()
        .and_then(|raw| parse_loose_version(&raw))
        .map(|version| version >= MIN_SAMPLER_VERSION)
        .unwrap_or(false)
}
