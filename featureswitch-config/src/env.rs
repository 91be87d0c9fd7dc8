// Environment variable loading

use crate::Result;
use serde_json::{Map, Value};
use std::env;
use std::path::Path;
use tracing::{debug, trace};

/// Maps prefixed environment variables to features.
///
/// With prefix `FEATURE`, the variable `FEATURE_DARK_MODE=true` becomes the
/// feature `dark-mode` with raw value `"true"`.
pub struct EnvLoader {
    prefix: String,
}

impl EnvLoader {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Feature name for a variable, or `None` if the variable is not prefixed.
    pub fn feature_name(&self, key: &str) -> Option<String> {
        let rest = key.strip_prefix(&self.prefix)?;
        let rest = if self.prefix.is_empty() {
            rest
        } else {
            rest.strip_prefix('_')?
        };

        if rest.is_empty() {
            return None;
        }
        Some(rest.to_lowercase().replace('_', "-"))
    }

    /// Load features from the process environment
    pub fn load(&self) -> Value {
        // Variables with non-unicode names or values cannot name features
        let vars = env::vars_os().filter_map(|(key, value)| {
            Some((key.into_string().ok()?, value.into_string().ok()?))
        });
        self.load_from(vars)
    }

    /// Load features from a `.env` file without touching the process environment
    pub fn load_dotenv(&self, path: impl AsRef<Path>) -> Result<Value> {
        let mut vars = Vec::new();
        for item in dotenvy::from_path_iter(path.as_ref())? {
            vars.push(item?);
        }
        Ok(self.load_from(vars))
    }

    /// Load features from explicit key/value pairs
    pub fn load_from<I>(&self, vars: I) -> Value
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut features = Map::new();

        for (key, value) in vars {
            if let Some(name) = self.feature_name(&key) {
                trace!(variable = %key, feature = %name, "feature from environment");
                features.insert(name, Value::String(value));
            }
        }

        debug!(prefix = %self.prefix, count = features.len(), "loaded environment features");
        Value::Object(features)
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new("FEATURE")
    }
}
