//! CLI commands and argument parsing
//!
//! The binary is a read-mostly view of what the pipeline framework sees:
//! settings changes are not written back to any `nipype.cfg`.

use crate::config::{ConfigPaths, ConfigStore};
use crate::error::{NipypeConfigError, Result};
use crate::utils::probe::PsutilProbe;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tabled::{settings::Style, Table, Tabled};

/// Get the full version string with build information
fn get_version() -> &'static str {
    env!("VERSION_WITH_GIT")
}

#[derive(Parser)]
#[command(name = "nipype-config")]
#[command(about = "Inspect nipype configuration and cached data")]
#[command(version = get_version(), author)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Python interpreter used to look for psutil
    #[arg(long, global = true, env = "NIPYPE_PYTHON", default_value = "python3")]
    pub python: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the effective settings
    Show {
        /// Only show one section
        #[arg(short, long)]
        section: Option<String>,
        /// Apply debug mode before showing
        #[arg(long)]
        debug_mode: bool,
        /// Apply provenance settings before showing
        #[arg(long)]
        provenance: bool,
    },
    /// Print a single setting
    Get {
        /// Section name
        section: String,
        /// Option name
        option: String,
        /// Printed when the option is not set
        #[arg(short, long)]
        default: Option<String>,
    },
    /// Print a single setting parsed as a boolean
    GetBool {
        /// Section name
        section: String,
        /// Option name
        option: String,
    },
    /// Show configuration and data file locations
    Paths,
    /// Cached data commands
    Data {
        #[command(subcommand)]
        command: DataCommands,
    },
    /// Check whether resource monitoring can be enabled
    ResourceMonitor,
}

#[derive(Subcommand)]
pub enum DataCommands {
    /// Print the value cached under a key
    Get {
        /// Data key
        key: String,
    },
    /// Cache a value under a key
    Save {
        /// Data key
        key: String,
        /// JSON value (stored as a string if it does not parse)
        value: String,
    },
}

#[derive(Tabled)]
struct SettingRow {
    #[tabled(rename = "Section")]
    section: String,
    #[tabled(rename = "Option")]
    option: String,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct PathRow {
    #[tabled(rename = "File")]
    name: &'static str,
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Exists")]
    exists: bool,
}

impl Cli {
    pub fn execute(self) -> Result<()> {
        let paths = ConfigPaths::from_environment()?;
        let mut store = ConfigStore::with_probe(paths, PsutilProbe::with_interpreter(self.python))?;

        match self.command {
            Commands::Show {
                section,
                debug_mode,
                provenance,
            } => {
                if debug_mode {
                    store.enable_debug_mode();
                }
                if provenance {
                    store.enable_provenance();
                }
                execute_show(&store, section.as_deref())
            }
            Commands::Get {
                section,
                option,
                default,
            } => execute_get(&store, &section, &option, default.as_deref()),
            Commands::GetBool { section, option } => {
                println!("{}", store.getboolean(&section, &option)?);
                Ok(())
            }
            Commands::Paths => execute_paths(&store),
            Commands::Data { command } => execute_data_command(command, &store),
            Commands::ResourceMonitor => {
                store.enable_resource_monitor();
                let enabled = store.resource_monitor()?;
                println!(
                    "Resource monitor: {}",
                    if enabled { "available" } else { "unavailable" }
                );
                Ok(())
            }
        }
    }
}

fn execute_show(store: &ConfigStore, section: Option<&str>) -> Result<()> {
    if let Some(name) = section {
        if !store.settings().has_section(name) {
            return Err(NipypeConfigError::no_section(name));
        }
    }

    let rows: Vec<SettingRow> = store
        .settings()
        .iter()
        .filter(|(name, _, _)| section.map_or(true, |wanted| wanted == *name))
        .map(|(section, option, value)| SettingRow {
            section: section.to_string(),
            option: option.to_string(),
            value: value.to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
    Ok(())
}

fn execute_get(
    store: &ConfigStore,
    section: &str,
    option: &str,
    default: Option<&str>,
) -> Result<()> {
    match store.get(section, option).or(default) {
        Some(value) => {
            println!("{}", value);
            Ok(())
        }
        None => Err(NipypeConfigError::no_option(section, option)),
    }
}

fn execute_paths(store: &ConfigStore) -> Result<()> {
    let paths = store.paths();
    let entries = [
        ("config directory", paths.config_dir()),
        ("user config", paths.user_config_file()),
        ("local config", paths.local_config_file()),
        ("data file", paths.data_file()),
    ];

    let rows: Vec<PathRow> = entries
        .into_iter()
        .map(|(name, path)| PathRow {
            name,
            exists: path.exists(),
            path: path.display().to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
    Ok(())
}

fn execute_data_command(command: DataCommands, store: &ConfigStore) -> Result<()> {
    match command {
        DataCommands::Get { key } => match store.get_data(&key)? {
            Some(value) => {
                println!("{}", serde_json::to_string_pretty(&value)?);
                Ok(())
            }
            None => Err(NipypeConfigError::data_file(format!(
                "no value cached under '{}'",
                key
            ))),
        },
        DataCommands::Save { key, value } => {
            let value = parse_data_value(value);
            store.save_data(&key, &value)?;
            println!("Saved '{}' to {}", key, store.data_file().display());
            Ok(())
        }
    }
}

/// Interpret a command-line value as JSON, falling back to a plain string
fn parse_data_value(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}
