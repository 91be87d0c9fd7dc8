//! CLI command implementations

pub mod features;
pub mod strip;

use featureswitch_config::{EnvLoader, load_raw_features, overlay};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Raw feature input from `file`, overlaid with prefixed environment variables.
pub(crate) fn load_raw(file: &Path, env_prefix: Option<&str>) -> crate::error::CliResult<Value> {
    let raw = load_raw_features(file)?;

    match env_prefix {
        Some(prefix) => {
            debug!(prefix, "overlaying environment features");
            Ok(overlay(raw, EnvLoader::new(prefix).load()))
        }
        None => Ok(raw),
    }
}
