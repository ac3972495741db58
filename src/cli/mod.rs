//! CLI module for nipype-config
//!
//! Command definitions and execution for inspecting the effective
//! configuration and the cached data file.

pub mod commands;

pub use commands::*;
