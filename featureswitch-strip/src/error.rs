//! Error types for stripping

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StripError {
    #[error("Invalid pattern for feature '{feature}': {source}")]
    Pattern {
        feature: String,
        #[source]
        source: regex::Error,
    },

    #[error("Unknown dialect: {0}")]
    UnknownDialect(String),
}

pub type Result<T> = std::result::Result<T, StripError>;
