//! Utility functions module
//!
//! Boolean parsing, directory helpers and the resource sampler probe.

pub mod helpers;
pub mod probe;

pub use helpers::*;
pub use probe::*;
