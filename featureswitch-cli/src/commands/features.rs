//! Feature set inspection command

use super::load_raw;
use crate::error::CliResult;
use featureswitch_core::as_features;
use std::path::Path;

/// Print the normalized feature set as pretty JSON on stdout.
pub fn run(file: &Path, env_prefix: Option<&str>) -> CliResult<()> {
    let features = as_features(&load_raw(file, env_prefix)?);
    println!("{}", serde_json::to_string_pretty(&features)?);
    Ok(())
}
