//! Locations of the configuration and data files

use crate::error::{NipypeConfigError, Result};
use std::path::PathBuf;

const CONFIG_DIR_NAME: &str = ".nipype";
const CONFIG_FILE_NAME: &str = "nipype.cfg";
const DATA_FILE_NAME: &str = "nipype.json";

/// Directories a store reads from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    /// User home directory
    pub home_dir: PathBuf,
    /// Working directory at construction time
    pub working_dir: PathBuf,
}

impl ConfigPaths {
    pub fn new<H: Into<PathBuf>, W: Into<PathBuf>>(home_dir: H, working_dir: W) -> Self {
        Self {
            home_dir: home_dir.into(),
            working_dir: working_dir.into(),
        }
    }

    /// Resolve the home directory and current working directory of this process
    pub fn from_environment() -> Result<Self> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| NipypeConfigError::config("Unable to determine home directory"))?;
        let working_dir = std::env::current_dir()?;
        Ok(Self::new(home_dir, working_dir))
    }

    /// `~/.nipype`
    pub fn config_dir(&self) -> PathBuf {
        self.home_dir.join(CONFIG_DIR_NAME)
    }

    /// `~/.nipype/nipype.cfg`
    pub fn user_config_file(&self) -> PathBuf {
        self.config_dir().join(CONFIG_FILE_NAME)
    }

    /// `nipype.cfg` in the working directory
    pub fn local_config_file(&self) -> PathBuf {
        self.working_dir.join(CONFIG_FILE_NAME)
    }

    /// `~/.nipype/nipype.json`
    pub fn data_file(&self) -> PathBuf {
        self.config_dir().join(DATA_FILE_NAME)
    }
}
