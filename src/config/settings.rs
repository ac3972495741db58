//! Settings tree
//!
//! Sections map option names to string values. Typed interpretation happens
//! at read time. INI text is parsed with `rust-ini` with quote and escape
//! handling turned off, so names keep their case and values are stored
//! exactly as written. Reading a file overlays it onto the tree without
//! deleting anything.

use crate::error::{NipypeConfigError, Result};
use crate::utils::helpers::parse_setting_bool;
use ini::{Ini, ParseOption};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Options of one section
pub type Section = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings {
    sections: BTreeMap<String, Section>,
}

impl Settings {
    /// Parse INI text into a standalone tree
    pub fn from_ini_str(text: &str) -> Result<Self> {
        let parsed = Ini::load_from_str_opt(text, verbatim_options())?;

        let mut settings = Self::default();
        for (name, properties) in parsed.iter() {
            let Some(name) = name else {
                if let Some((option, _)) = properties.iter().next() {
                    return Err(NipypeConfigError::config(format!(
                        "option '{}' appears before any section header",
                        option
                    )));
                }
                continue;
            };

            let options = settings.sections.entry(name.to_string()).or_default();
            for (option, value) in properties.iter() {
                options.insert(option.to_string(), value.to_string());
            }
        }
        Ok(settings)
    }

    /// Parse an INI file into a standalone tree
    pub fn from_ini_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_ini_str(&text)
    }

    /// Overlay each existing file in order, later files winning
    ///
    /// Missing files are skipped. Returns the files that were applied.
    pub fn read_files<'a, I>(&mut self, paths: I) -> Result<Vec<&'a Path>>
    where
        I: IntoIterator<Item = &'a Path>,
    {
        let mut applied = Vec::new();
        for path in paths {
            if !path.is_file() {
                debug!("Skipping missing config file: {}", path.display());
                continue;
            }

            let overlay = Self::from_ini_file(path)?;
            self.merge(overlay);
            debug!("Applied config file: {}", path.display());
            applied.push(path);
        }
        Ok(applied)
    }

    /// Add or overwrite every option of `other`
    pub fn merge(&mut self, other: Settings) {
        for (name, options) in other.sections {
            self.sections.entry(name).or_default().extend(options);
        }
    }

    pub fn sections(&self) -> &BTreeMap<String, Section> {
        &self.sections
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    pub fn has_option(&self, section: &str, option: &str) -> bool {
        self.sections
            .get(section)
            .is_some_and(|options| options.contains_key(option))
    }

    pub fn get(&self, section: &str, option: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|options| options.get(option))
            .map(String::as_str)
    }

    /// Store a value under an existing section
    pub fn set(&mut self, section: &str, option: &str, value: String) -> Result<()> {
        let options = self
            .sections
            .get_mut(section)
            .ok_or_else(|| NipypeConfigError::no_section(section))?;
        options.insert(option.to_string(), value);
        Ok(())
    }

    /// Store a value, creating the section if needed
    pub fn insert(&mut self, section: &str, option: &str, value: String) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(option.to_string(), value);
    }

    /// Value of an option that must exist
    fn require(&self, section: &str, option: &str) -> Result<&str> {
        let options = self
            .sections
            .get(section)
            .ok_or_else(|| NipypeConfigError::no_section(section))?;
        options
            .get(option)
            .map(String::as_str)
            .ok_or_else(|| NipypeConfigError::no_option(section, option))
    }

    pub fn getboolean(&self, section: &str, option: &str) -> Result<bool> {
        parse_setting_bool(self.require(section, option)?)
    }

    pub fn getint(&self, section: &str, option: &str) -> Result<i64> {
        let value = self.require(section, option)?;
        value
            .trim()
            .parse()
            .map_err(|_| NipypeConfigError::invalid_integer(value))
    }

    /// Every `(section, option, value)` in sorted order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.sections.iter().flat_map(|(section, options)| {
            options
                .iter()
                .map(move |(option, value)| (section.as_str(), option.as_str(), value.as_str()))
        })
    }
}

/// Keep backslashes and quotes as literal characters
fn verbatim_options() -> ParseOption {
    ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    }
}
