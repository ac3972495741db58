//! The configuration store
//!
//! Holds the settings tree built from the defaults and the on-disk overlays,
//! resolves renamed options, tracks the resource monitor capability and
//! fronts the JSON data file. Stores are plain values: construct one and pass
//! it to whatever needs configuration.

use crate::config::defaults::{
    ALIASED_SECTIONS, CRASHDUMP_DIR, DEFAULT_CONFIG, LOG_DIRECTORY, UPDATABLE_SECTIONS,
};
use crate::config::deprecation::{find_deprecation, CONFIG_DEPRECATIONS};
use crate::config::paths::ConfigPaths;
use crate::config::settings::{Section, Settings};
use crate::config::warning::ConfigWarning;
use crate::data::DataFile;
use crate::error::{NipypeConfigError, Result};
use crate::utils::helpers::{bool_to_setting, str2bool};
use crate::utils::probe::{sampler_available, PsutilProbe, ResourceProbe};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::process::Command;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

/// Values that can be written with [`ConfigStore::set`]
///
/// Booleans are stored as `True`/`False`, which `getboolean` reads back.
pub trait SettingValue {
    fn into_setting(self) -> String;
}

impl SettingValue for bool {
    fn into_setting(self) -> String {
        bool_to_setting(self).to_string()
    }
}

impl SettingValue for &str {
    fn into_setting(self) -> String {
        self.to_string()
    }
}

impl SettingValue for String {
    fn into_setting(self) -> String {
        self
    }
}

impl SettingValue for &String {
    fn into_setting(self) -> String {
        self.clone()
    }
}

macro_rules! integer_setting_value {
    ($($t:ty),*) => {
        $(
            impl SettingValue for $t {
                fn into_setting(self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

integer_setting_value!(i32, i64, u32, u64, usize);

/// Resolution state of the resource monitor flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonitorState {
    /// Not resolved yet
    #[default]
    Unset,
    Disabled,
    Enabled,
}

impl MonitorState {
    pub fn resolved(self) -> Option<bool> {
        match self {
            Self::Unset => None,
            Self::Disabled => Some(false),
            Self::Enabled => Some(true),
        }
    }

    pub fn is_enabled(self) -> bool {
        self == Self::Enabled
    }
}

pub struct ConfigStore {
    settings: Settings,
    paths: ConfigPaths,
    data: DataFile,
    resource_monitor: MonitorState,
    probe: Box<dyn ResourceProbe + Send>,
    warnings: Mutex<Vec<ConfigWarning>>,
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigStore")
            .field("settings", &self.settings)
            .field("paths", &self.paths)
            .field("data", &self.data)
            .field("resource_monitor", &self.resource_monitor)
            .finish_non_exhaustive()
    }
}

impl ConfigStore {
    /// Build a store for this process's home and working directories
    pub fn load() -> Result<Self> {
        Self::with_paths(ConfigPaths::from_environment()?)
    }

    pub fn with_paths(paths: ConfigPaths) -> Result<Self> {
        Self::with_probe(paths, PsutilProbe::new())
    }

    /// Build a store with a specific resource sampler probe
    ///
    /// Defaults are overlaid by `~/.nipype/nipype.cfg` and then by
    /// `nipype.cfg` in the working directory, both only when `~/.nipype`
    /// exists.
    pub fn with_probe<P>(paths: ConfigPaths, probe: P) -> Result<Self>
    where
        P: ResourceProbe + Send + 'static,
    {
        let mut settings = default_settings(&paths)?;

        if paths.config_dir().exists() {
            let user_file = paths.user_config_file();
            let local_file = paths.local_config_file();
            settings.read_files([user_file.as_path(), local_file.as_path()])?;
        } else {
            debug!(
                "No config directory at {}, using defaults",
                paths.config_dir().display()
            );
        }

        let mut store = Self {
            settings,
            data: DataFile::new(paths.data_file()),
            paths,
            resource_monitor: MonitorState::Unset,
            probe: Box::new(probe),
            warnings: Mutex::new(Vec::new()),
        };
        store.migrate_deprecated_options();

        Ok(store)
    }

    /// Copy values set under old option names to their replacements
    ///
    /// Runs silently; warnings are only raised when callers use old names.
    fn migrate_deprecated_options(&mut self) {
        for deprecation in CONFIG_DEPRECATIONS {
            for section in ALIASED_SECTIONS {
                if self.settings.has_option(section, deprecation.replacement) {
                    continue;
                }
                if let Some(value) = self.settings.get(section, deprecation.option) {
                    let value = value.to_string();
                    debug!(
                        "Migrating [{}] {} to {}",
                        section, deprecation.option, deprecation.replacement
                    );
                    self.settings
                        .insert(section, deprecation.replacement, value);
                }
            }
        }
    }

    /// Re-apply the built-in defaults over the current settings
    pub fn set_default_config(&mut self) -> Result<()> {
        let defaults = default_settings(&self.paths)?;
        self.settings.merge(defaults);
        Ok(())
    }

    /// Substitute the replacement for a renamed option, warning when it was renamed
    fn resolve_alias<'a>(&self, section: &str, option: &'a str) -> (&'a str, bool) {
        match find_deprecation(option) {
            Some(deprecation) => {
                self.emit(ConfigWarning::DeprecatedOption {
                    option: deprecation.option.to_string(),
                    since: deprecation.since.to_string(),
                    replacement: deprecation.replacement.to_string(),
                });
                debug!(
                    "Resolved [{}] {} to {}",
                    section, option, deprecation.replacement
                );
                (deprecation.replacement, true)
            }
            None => (option, false),
        }
    }

    /// Stored value, or `None` when the section or option is absent
    pub fn get(&self, section: &str, option: &str) -> Option<&str> {
        let (option, _) = self.resolve_alias(section, option);
        self.settings.get(section, option)
    }

    /// Stored value, or `default` when the section or option is absent
    pub fn get_or<'a>(&'a self, section: &str, option: &str, default: &'a str) -> &'a str {
        self.get(section, option).unwrap_or(default)
    }

    /// Store a value under an existing section
    pub fn set<V: SettingValue>(&mut self, section: &str, option: &str, value: V) -> Result<()> {
        let value = value.into_setting();
        let (option, _) = self.resolve_alias(section, option);
        self.settings.set(section, option, value)
    }

    /// Parse an option as a boolean; the option must exist under its current name
    pub fn getboolean(&self, section: &str, option: &str) -> Result<bool> {
        self.settings.getboolean(section, option)
    }

    /// Parse an option as an integer; the option must exist under its current name
    pub fn getint(&self, section: &str, option: &str) -> Result<i64> {
        self.settings.getint(section, option)
    }

    pub fn has_option(&self, section: &str, option: &str) -> bool {
        self.settings.has_option(section, option)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn sections(&self) -> &BTreeMap<String, Section> {
        self.settings.sections()
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    pub fn enable_debug_mode(&mut self) {
        self.settings
            .insert("execution", "stop_on_first_crash", "true".to_string());
        self.settings
            .insert("execution", "remove_unnecessary_outputs", "false".to_string());
        self.settings
            .insert("execution", "keep_inputs", "true".to_string());
        self.settings
            .insert("logging", "workflow_level", "DEBUG".to_string());
        self.settings
            .insert("logging", "interface_level", "DEBUG".to_string());
    }

    /// Set the logging directory
    ///
    /// Nothing is notified of the change: call this before any logging that
    /// reads `logging.log_directory` is set up.
    pub fn set_log_dir<P: AsRef<Path>>(&mut self, log_dir: P) {
        let (section, option) = LOG_DIRECTORY;
        self.settings.insert(
            section,
            option,
            log_dir.as_ref().to_string_lossy().into_owned(),
        );
    }

    /// Bulk overlay from a `{section: {option: value}}` JSON object
    ///
    /// Only `execution`, `logging` and `check` are read. Options starting
    /// with `__` are metadata and skipped. Values are stringified without
    /// alias resolution.
    pub fn update_config(&mut self, config: &Value) -> Result<()> {
        let sections = config.as_object().ok_or_else(|| {
            NipypeConfigError::invalid_argument("configuration update must be a JSON object")
        })?;

        for section in UPDATABLE_SECTIONS {
            let Some(options) = sections.get(section) else {
                continue;
            };
            let options = options.as_object().ok_or_else(|| {
                NipypeConfigError::invalid_argument(format!(
                    "section '{}' must be a JSON object",
                    section
                ))
            })?;

            for (option, value) in options {
                if option.starts_with("__") {
                    continue;
                }
                self.settings.set(section, option, stringify(value))?;
            }
        }

        Ok(())
    }

    pub fn enable_provenance(&mut self) {
        self.settings
            .insert("execution", "write_provenance", "true".to_string());
        self.settings
            .insert("execution", "hash_method", "content".to_string());
    }

    /// Configured plotting backend name
    pub fn matplotlib_backend(&self) -> Option<&str> {
        self.settings.get("execution", "matplotlib_backend")
    }

    /// Forward the configured plotting backend to a child process
    pub fn update_matplotlib(&self, command: &mut Command) {
        if let Some(backend) = self.matplotlib_backend() {
            command.env("MPLBACKEND", backend);
        }
    }

    pub fn monitor_state(&self) -> MonitorState {
        self.resource_monitor
    }

    /// Whether resource monitoring is enabled and usable
    ///
    /// The first call resolves `execution.resource_monitor` through
    /// [`set_resource_monitor`](Self::set_resource_monitor); later calls
    /// return the cached answer.
    pub fn resource_monitor(&mut self) -> Result<bool> {
        if let Some(enabled) = self.resource_monitor.resolved() {
            return Ok(enabled);
        }

        let requested = match self.settings.get("execution", "resource_monitor") {
            Some(raw) if !raw.is_empty() => str2bool(raw)?,
            _ => false,
        };
        self.set_resource_monitor(requested);

        Ok(self.resource_monitor.is_enabled())
    }

    /// Request resource monitoring on or off
    ///
    /// Turning it off only updates the cached state. Turning it on probes
    /// for the sampler (unless already enabled), warns when it is unusable
    /// and writes the outcome to `execution.resource_monitor`.
    pub fn set_resource_monitor(&mut self, enabled: bool) {
        if !enabled {
            self.resource_monitor = MonitorState::Disabled;
            return;
        }

        if self.resource_monitor.is_enabled() {
            return;
        }

        let available = sampler_available(&*self.probe);
        self.resource_monitor = if available {
            MonitorState::Enabled
        } else {
            MonitorState::Disabled
        };

        if !available {
            self.emit(ConfigWarning::ResourceMonitorUnavailable);
        }
        self.settings
            .insert("execution", "resource_monitor", available.to_string());

        debug!("Resource monitor resolved to {}", available);
    }

    /// String form of [`set_resource_monitor`](Self::set_resource_monitor)
    pub fn set_resource_monitor_str(&mut self, value: &str) -> Result<()> {
        let enabled = str2bool(value)?;
        self.set_resource_monitor(enabled);
        Ok(())
    }

    pub fn enable_resource_monitor(&mut self) {
        self.set_resource_monitor(true);
    }

    pub fn data_file(&self) -> &Path {
        self.data.path()
    }

    /// Value cached under `key` in the data file
    pub fn get_data(&self, key: &str) -> Result<Option<Value>> {
        self.data.get(key)
    }

    /// Typed variant of [`get_data`](Self::get_data)
    pub fn get_data_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.data.get(key)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Cache `value` under `key` in the data file
    pub fn save_data<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.data.save(key, value)
    }

    /// Drain the warnings raised since the last call
    pub fn take_warnings(&self) -> Vec<ConfigWarning> {
        let mut warnings = self.warnings.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *warnings)
    }

    fn emit(&self, warning: ConfigWarning) {
        warn!("{}", warning);
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(warning);
    }
}

fn default_settings(paths: &ConfigPaths) -> Result<Settings> {
    let mut settings = Settings::from_ini_str(DEFAULT_CONFIG)?;

    let (section, option) = LOG_DIRECTORY;
    settings.insert(section, option, paths.home_dir.to_string_lossy().into_owned());

    let (section, option) = CRASHDUMP_DIR;
    settings.insert(
        section,
        option,
        paths.working_dir.to_string_lossy().into_owned(),
    );

    Ok(settings)
}

/// Render a JSON value the way a settings writer expects it
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => bool_to_setting(*b).to_string(),
        Value::Null => "None".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::probe::MockResourceProbe;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn store_with(probe: MockResourceProbe) -> (TempDir, ConfigStore) {
        let temp_dir = TempDir::new().unwrap();
        let paths = ConfigPaths::new(temp_dir.path().join("home"), temp_dir.path().join("work"));
        let store = ConfigStore::with_probe(paths, probe).unwrap();
        (temp_dir, store)
    }

    fn unused_probe() -> MockResourceProbe {
        let mut probe = MockResourceProbe::new();
        probe.expect_sampler_version().times(0);
        probe
    }

    #[test]
    fn test_disable_never_probes() {
        let (_temp_dir, mut store) = store_with(unused_probe());

        store.set_resource_monitor(false);

        assert_eq!(store.monitor_state(), MonitorState::Disabled);
        assert!(!store.resource_monitor().unwrap());
        assert!(store.take_warnings().is_empty());
    }

    #[test]
    fn test_default_flag_resolves_without_probe() {
        let (_temp_dir, mut store) = store_with(unused_probe());

        assert_eq!(store.monitor_state(), MonitorState::Unset);
        assert!(!store.resource_monitor().unwrap());
        assert_eq!(store.monitor_state(), MonitorState::Disabled);
    }

    #[test]
    fn test_enable_probes_once() {
        let mut probe = MockResourceProbe::new();
        probe
            .expect_sampler_version()
            .times(1)
            .returning(|| Some("5.9.0".to_string()));
        let (_temp_dir, mut store) = store_with(probe);

        store.enable_resource_monitor();
        store.enable_resource_monitor();

        assert!(store.resource_monitor().unwrap());
        assert_eq!(store.get("execution", "resource_monitor"), Some("true"));
        assert!(store.take_warnings().is_empty());
    }

    #[test]
    fn test_enable_without_sampler_warns_and_persists_false() {
        let mut probe = MockResourceProbe::new();
        probe.expect_sampler_version().times(1).returning(|| None);
        let (_temp_dir, mut store) = store_with(probe);

        store.set("execution", "resource_monitor", true).unwrap();
        assert!(!store.resource_monitor().unwrap());

        assert_eq!(
            store.take_warnings(),
            vec![ConfigWarning::ResourceMonitorUnavailable]
        );
        assert_eq!(store.get("execution", "resource_monitor"), Some("false"));
    }

    #[test]
    fn test_lazy_read_of_enabled_setting() {
        let mut probe = MockResourceProbe::new();
        probe
            .expect_sampler_version()
            .times(1)
            .returning(|| Some("5.0".to_string()));
        let (_temp_dir, mut store) = store_with(probe);

        store.set("execution", "resource_monitor", "Yes").unwrap();

        assert!(store.resource_monitor().unwrap());
        assert!(store.resource_monitor().unwrap());
        assert_eq!(store.monitor_state(), MonitorState::Enabled);
    }

    #[test]
    fn test_string_requests() {
        let (_temp_dir, mut store) = store_with(unused_probe());

        store.set_resource_monitor_str("F").unwrap();
        assert_eq!(store.monitor_state(), MonitorState::Disabled);
        assert!(store.set_resource_monitor_str("sometimes").is_err());
    }

    #[test]
    fn test_unparsable_stored_flag_is_an_error() {
        let (_temp_dir, mut store) = store_with(unused_probe());

        store.set("execution", "resource_monitor", "sometimes").unwrap();
        assert!(store.resource_monitor().is_err());
        assert_eq!(store.monitor_state(), MonitorState::Unset);
    }

    #[test]
    fn test_deprecated_name_warns_on_get_and_set() {
        let (_temp_dir, mut store) = store_with(unused_probe());

        store.set("logging", "filemanip_level", "DEBUG").unwrap();
        assert_eq!(store.get("logging", "utils_level"), Some("DEBUG"));
        assert_eq!(store.get("logging", "filemanip_level"), Some("DEBUG"));
        assert!(!store.has_option("logging", "filemanip_level"));

        let warnings = store.take_warnings();
        assert_eq!(warnings.len(), 2);
        assert_eq!(
            warnings[0].to_string(),
            "Config option \"filemanip_level\" has been deprecated as of nipype 1.0. \
             Please use \"utils_level\" instead."
        );
    }

    #[test]
    fn test_migration_runs_silently() {
        let temp_dir = TempDir::new().unwrap();
        let home = temp_dir.path().join("home");
        let work = temp_dir.path().join("work");
        fs::create_dir_all(home.join(".nipype")).unwrap();
        fs::create_dir_all(&work).unwrap();
        fs::write(
            home.join(".nipype").join("nipype.cfg"),
            "[execution]\nprofile_runtime = true\n\n[logging]\nprofile_runtime = true\n",
        )
        .unwrap();

        let store = ConfigStore::with_probe(ConfigPaths::new(home, work), unused_probe()).unwrap();

        // Defaults already carry execution.resource_monitor, so nothing is copied there
        assert_eq!(store.get("execution", "resource_monitor"), Some("false"));
        assert_eq!(store.get("logging", "resource_monitor"), Some("true"));
        assert!(store.has_option("logging", "profile_runtime"));
        assert!(store.take_warnings().is_empty());
    }

    #[test]
    fn test_update_config_stringifies() {
        let (_temp_dir, mut store) = store_with(unused_probe());

        store
            .update_config(&json!({
                "execution": {
                    "poll_sleep_duration": 5,
                    "stop_on_first_crash": true,
                    "__meta": "skipped",
                    "remove_node_directories": null,
                },
                "logging": {"workflow_level": "DEBUG"},
                "other": {"ignored": 1},
            }))
            .unwrap();

        assert_eq!(store.get("execution", "poll_sleep_duration"), Some("5"));
        assert!(store.getboolean("execution", "stop_on_first_crash").unwrap());
        assert_eq!(store.get("execution", "remove_node_directories"), Some("None"));
        assert!(!store.has_option("execution", "__meta"));
        assert!(!store.has_option("other", "ignored"));
        assert_eq!(store.get("logging", "workflow_level"), Some("DEBUG"));
    }

    #[test]
    fn test_update_config_rejects_non_objects() {
        let (_temp_dir, mut store) = store_with(unused_probe());

        assert!(store.update_config(&json!([1, 2])).is_err());
        assert!(store.update_config(&json!({"execution": "plugin"})).is_err());
    }

    #[test]
    fn test_update_matplotlib_forwards_backend() {
        let (_temp_dir, mut store) = store_with(unused_probe());
        store.set("execution", "matplotlib_backend", "pdf").unwrap();

        let mut command = Command::new("python3");
        store.update_matplotlib(&mut command);

        let backend = command
            .get_envs()
            .find(|(key, _)| *key == "MPLBACKEND")
            .and_then(|(_, value)| value)
            .map(|value| value.to_string_lossy().into_owned());
        assert_eq!(backend.as_deref(), Some("pdf"));
    }
}
