// Feature file loaders

use crate::{ConfigError, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Supported feature file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
    Env,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            "env" => Some(FileFormat::Env),
            _ => None,
        }
    }

    /// Detect the format of `path`. A bare `.env` file counts as [`FileFormat::Env`].
    pub fn from_path(path: &Path) -> Result<Self> {
        if path.file_name().and_then(|s| s.to_str()) == Some(".env") {
            return Ok(FileFormat::Env);
        }

        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                ConfigError::LoadError(format!("No file extension found: {}", path.display()))
            })?;

        FileFormat::from_extension(ext)
            .ok_or_else(|| ConfigError::UnsupportedFormat(ext.to_string()))
    }
}

/// Reads raw feature input from files
pub struct FeatureLoader {
    format: FileFormat,
}

impl FeatureLoader {
    pub fn new(format: FileFormat) -> Self {
        Self { format }
    }

    /// Auto-detect format from file extension
    pub fn auto(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(FileFormat::from_path(path.as_ref())?))
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    /// Load raw values from file
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Value> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::LoadError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), format = ?self.format, "loading feature file");
        self.parse(&content)
    }

    /// Parse raw values from string
    pub fn parse(&self, content: &str) -> Result<Value> {
        match self.format {
            FileFormat::Json => self.parse_json(content),
            FileFormat::Toml => self.parse_toml(content),
            FileFormat::Env => Ok(self.parse_env(content)),
        }
    }

    fn parse_json(&self, content: &str) -> Result<Value> {
        serde_json::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("JSON parse error: {}", e)))
    }

    fn parse_toml(&self, content: &str) -> Result<Value> {
        let toml_value: toml::Value = toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;

        serde_json::to_value(toml_value)
            .map_err(|e| ConfigError::ParseError(format!("TOML to JSON conversion error: {}", e)))
    }

    fn parse_env(&self, content: &str) -> Value {
        let mut map = Map::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim().trim_matches('"').trim_matches('\'');
                map.insert(key.to_string(), Value::String(value.to_string()));
            }
        }

        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json() {
        let loader = FeatureLoader::new(FileFormat::Json);
        let result = loader.parse(r#"{"search": true, "beta": "false"}"#).unwrap();

        assert_eq!(result, json!({"search": true, "beta": "false"}));
    }

    #[test]
    fn test_parse_json_error() {
        let loader = FeatureLoader::new(FileFormat::Json);
        let err = loader.parse("{ not json").unwrap_err();

        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_parse_toml() {
        let loader = FeatureLoader::new(FileFormat::Toml);
        let toml = r#"
            search = true
            beta = "TRUE"
            "dark-mode" = false
        "#;

        let result = loader.parse(toml).unwrap();
        assert_eq!(result, json!({"search": true, "beta": "TRUE", "dark-mode": false}));
    }

    #[test]
    fn test_parse_env() {
        let loader = FeatureLoader::new(FileFormat::Env);
        let env = r#"
            search=true
            # Comment
            beta = "false"
            legacy='TRUE'
            ignored line
        "#;

        let result = loader.parse(env).unwrap();
        assert_eq!(result, json!({"search": "true", "beta": "false", "legacy": "TRUE"}));
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_extension("json"), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_extension("TOML"), Some(FileFormat::Toml));
        assert_eq!(FileFormat::from_extension("env"), Some(FileFormat::Env));
        assert_eq!(FileFormat::from_extension("yaml"), None);

        assert_eq!(
            FileFormat::from_path(Path::new("config/.env")).unwrap(),
            FileFormat::Env
        );
        assert_eq!(
            FileFormat::from_path(Path::new("features.toml")).unwrap(),
            FileFormat::Toml
        );
        assert!(matches!(
            FileFormat::from_path(Path::new("features.yaml")),
            Err(ConfigError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            FileFormat::from_path(Path::new("features")),
            Err(ConfigError::LoadError(_))
        ));
    }
}
