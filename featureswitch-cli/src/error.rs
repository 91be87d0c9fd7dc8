//! Error types for the featureswitch CLI.

use std::fmt;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types.
#[derive(Debug)]
pub enum CliError {
    /// IO error (reading sources, writing output)
    Io(std::io::Error),

    /// Feature or options file could not be loaded
    Config(String),

    /// Strip rules could not be built
    Strip(String),

    /// Directory traversal failed
    Walk(String),

    /// Output could not be serialized
    Serialization(String),

    /// Invalid argument
    InvalidArgument(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Strip(msg) => write!(f, "Strip error: {}", msg),
            CliError::Walk(msg) => write!(f, "Walk error: {}", msg),
            CliError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<featureswitch_config::ConfigError> for CliError {
    fn from(e: featureswitch_config::ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<featureswitch_strip::StripError> for CliError {
    fn from(e: featureswitch_strip::StripError) -> Self {
        CliError::Strip(e.to_string())
    }
}

impl From<walkdir::Error> for CliError {
    fn from(e: walkdir::Error) -> Self {
        CliError::Walk(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}
