//! nipype-config - configuration for the nipype pipeline framework
//!
//! Loads layered INI settings, exposes typed accessors with support for
//! renamed options, and keeps a small JSON data file for cached values.

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod utils;

// Re-export commonly used types
pub use config::{ConfigPaths, ConfigStore, ConfigWarning, MonitorState};
pub use error::{NipypeConfigError, Result};
