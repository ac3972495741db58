//! General utility helper functions
//!
//! Boolean spelling recognition for settings values and directory creation
//! that tolerates concurrent creators.

use crate::error::{NipypeConfigError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Parse a boolean the way INI settings spell it
///
/// Accepts `1`/`yes`/`true`/`on` and `0`/`no`/`false`/`off`, case-insensitive.
pub fn parse_setting_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Ok(true),
        "0" | "no" | "false" | "off" => Ok(false),
        _ => Err(NipypeConfigError::invalid_boolean(value)),
    }
}

/// Permissive string-to-bool coercion used for feature flags
///
/// Accepts `yes`/`true`/`t`/`1` and `no`/`false`/`n`/`f`/`0`, case-insensitive.
pub fn str2bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "yes" | "true" | "t" | "1" => Ok(true),
        "no" | "false" | "n" | "f" | "0" => Ok(false),
        _ => Err(NipypeConfigError::invalid_boolean(format!(
            "{} cannot be converted to bool",
            value
        ))),
    }
}

/// Canonical string form of a boolean setting
pub fn bool_to_setting(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Create a directory and its parents
///
/// A directory that appears concurrently is not an error; any other
/// creation failure is returned.
pub fn mkdir_p(path: &Path) -> Result<()> {
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_setting_bool() {
        for spelling in ["1", "yes", "true", "on", "TRUE", "Yes", "On", "True"] {
            assert!(parse_setting_bool(spelling).unwrap(), "{spelling}");
        }
        for spelling in ["0", "no", "false", "off", "FALSE", "No", "Off", "False"] {
            assert!(!parse_setting_bool(spelling).unwrap(), "{spelling}");
        }

        assert!(parse_setting_bool("t").is_err());
        assert!(parse_setting_bool("").is_err());
        assert!(matches!(
            parse_setting_bool("maybe"),
            Err(NipypeConfigError::InvalidBoolean { .. })
        ));
    }

    #[test]
    fn test_str2bool() {
        assert!(str2bool("t").unwrap());
        assert!(str2bool("YES").unwrap());
        assert!(!str2bool("f").unwrap());
        assert!(!str2bool("N").unwrap());
        assert!(str2bool("on").is_err());
    }

    #[test]
    fn test_bool_round_trip_through_setting_form() {
        assert!(parse_setting_bool(bool_to_setting(true)).unwrap());
        assert!(!parse_setting_bool(bool_to_setting(false)).unwrap());
    }

    #[test]
    fn test_mkdir_p_existing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");

        mkdir_p(&nested).unwrap();
        assert!(nested.is_dir());

        // Second call is a no-op
        mkdir_p(&nested).unwrap();
    }

    #[test]
    fn test_mkdir_p_blocked_by_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        assert!(mkdir_p(&blocker.join("child")).is_err());
    }
}
