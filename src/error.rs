use thiserror::Error;

/// Main error type for nipype-config operations
#[derive(Debug, Error)]
pub enum NipypeConfigError {
    #[error("No section: '{section}'")]
    NoSection { section: String },

    #[error("No option '{option}' in section: '{section}'")]
    NoOption { section: String, option: String },

    #[error("Not a boolean: {value}")]
    InvalidBoolean { value: String },

    #[error("Not an integer: {value}")]
    InvalidInteger { value: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Data file error: {0}")]
    DataFileError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration parse error: {0}")]
    IniParseError(#[from] ini::ParseError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl NipypeConfigError {
    pub fn no_section<S: Into<String>>(section: S) -> Self {
        Self::NoSection {
            section: section.into(),
        }
    }

    pub fn no_option<S: Into<String>>(section: S, option: S) -> Self {
        Self::NoOption {
            section: section.into(),
            option: option.into(),
        }
    }

    pub fn invalid_boolean<S: Into<String>>(value: S) -> Self {
        Self::InvalidBoolean {
            value: value.into(),
        }
    }

    pub fn invalid_integer<S: Into<String>>(value: S) -> Self {
        Self::InvalidInteger {
            value: value.into(),
        }
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn data_file<S: Into<String>>(msg: S) -> Self {
        Self::DataFileError(msg.into())
    }

    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Result type alias for nipype-config operations
pub type Result<T> = std::result::Result<T, NipypeConfigError>;
