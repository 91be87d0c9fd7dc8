//! Feature set loading for featureswitch
//!
//! Reads raw feature input from JSON, TOML or `KEY=value` files and from
//! prefixed environment variables, and strip options from JSON or TOML.
//!
//! ```no_run
//! use featureswitch_config::{load_features, load_strip_options};
//!
//! let features = load_features("features.toml")?;
//! let options = load_strip_options("strip.json")?;
//! # Ok::<(), featureswitch_config::ConfigError>(())
//! ```

pub mod env;
pub mod error;
pub mod loader;

pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{FeatureLoader, FileFormat};

use featureswitch_core::{Features, as_features};
use featureswitch_strip::StripOptions;
use serde_json::Value;
use std::path::Path;

/// Load raw feature input from a file, auto-detecting its format.
///
/// The document must be an object mapping feature names to values.
pub fn load_raw_features(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let raw = FeatureLoader::auto(path)?.load_file(path)?;

    if !raw.is_object() {
        return Err(ConfigError::InvalidFeatures(format!(
            "{} must contain a map of feature names to values",
            path.display()
        )));
    }
    Ok(raw)
}

/// Load a feature set, normalized with the default truthiness rule.
pub fn load_features(path: impl AsRef<Path>) -> Result<Features> {
    Ok(as_features(&load_raw_features(path)?))
}

/// Load strip options from a JSON or TOML file. Omitted fields keep defaults.
pub fn load_strip_options(path: impl AsRef<Path>) -> Result<StripOptions> {
    let path = path.as_ref();
    let loader = FeatureLoader::auto(path)?;
    if loader.format() == FileFormat::Env {
        return Err(ConfigError::UnsupportedFormat(
            "strip options must be JSON or TOML".to_string(),
        ));
    }

    let raw = loader.load_file(path)?;
    serde_json::from_value(raw).map_err(|e| ConfigError::DeserializationError(e.to_string()))
}

/// Overlay raw feature input: entries in `overlay` replace those in `base`.
///
/// Non-object inputs contribute nothing.
pub fn overlay(base: Value, overlay: Value) -> Value {
    let mut merged = match base {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    if let Value::Object(map) = overlay {
        merged.extend(map);
    }
    Value::Object(merged)
}
