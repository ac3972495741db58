//! Configuration management module
//!
//! Layered INI settings (built-in defaults, `~/.nipype/nipype.cfg`, a
//! `nipype.cfg` in the working directory), renamed-option handling and the
//! resource monitor capability flag.

pub mod defaults;
pub mod deprecation;
pub mod paths;
pub mod settings;
pub mod store;
pub mod warning;

pub use deprecation::{Deprecation, CONFIG_DEPRECATIONS};
pub use paths::ConfigPaths;
pub use settings::{Section, Settings};
pub use store::{ConfigStore, MonitorState, SettingValue};
pub use warning::ConfigWarning;
