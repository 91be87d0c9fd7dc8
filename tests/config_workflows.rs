//! Integration tests for file-driven workflows.

#![cfg(feature = "config")]

use featureswitch::featureswitch_config::{EnvLoader, load_raw_features, overlay};
use featureswitch::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_store_from_feature_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("features.toml");
    fs::write(&path, "search = true\nbeta = \"false\"\n").unwrap();

    let store = FeatureStore::from_features(&load_features(&path).unwrap());

    assert!(store.is_enabled("search"));
    assert!(store.is_disabled("beta"));
    assert!(store.enable("beta"));
}

#[test]
fn test_file_and_environment_drive_stripping() {
    let dir = TempDir::new().unwrap();
    let features_path = dir.path().join("features.json");
    let options_path = dir.path().join("strip.json");
    fs::write(&features_path, r#"{"search": true, "beta": true}"#).unwrap();
    fs::write(&options_path, r#"{"slashComments": {"replace": "// -${FEATURE}-"}}"#).unwrap();

    let env = EnvLoader::new("APP").load_from(vec![("APP_BETA".to_string(), "false".to_string())]);
    let features = as_features(&overlay(load_raw_features(&features_path).unwrap(), env));
    let options = load_strip_options(&options_path).unwrap();

    let source = "a();\n// FEATURE.start(beta)\nb();\n// FEATURE.end(beta)\n";
    assert_eq!(strip(source, &features, &options).unwrap(), "a();\n// -beta-\n");
}
