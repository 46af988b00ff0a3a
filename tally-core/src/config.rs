//! Configuration of the store.
//!
//! ```toml
//! namespace = "myapp"
//! runtime_prefix = "rts"
//! warn_on_overwrite = true
//! ```

use serde::Deserialize;

use crate::errors::ConfigError;

/// Settings of a [`Store`](crate::Store).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// A prefix added (with a dot) to all names registered in the store.
    pub namespace: Option<String>,
    /// A prefix of the metrics registered by
    /// [`Store::register_runtime_metrics`](crate::Store::register_runtime_metrics).
    pub runtime_prefix: String,
    /// Whether to log a warning when a name is registered again.
    pub warn_on_overwrite: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            runtime_prefix: "rts".into(),
            warn_on_overwrite: true,
        }
    }
}

impl StoreConfig {
    /// Checks the config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(namespace) = &self.namespace {
            if !is_valid_prefix(namespace) {
                return Err(ConfigError::InvalidNamespace {
                    value: namespace.clone(),
                });
            }
        }

        if !is_valid_prefix(&self.runtime_prefix) {
            return Err(ConfigError::InvalidRuntimePrefix {
                value: self.runtime_prefix.clone(),
            });
        }

        Ok(())
    }
}

fn is_valid_prefix(prefix: &str) -> bool {
    !prefix.is_empty()
        && !prefix.starts_with('.')
        && !prefix.ends_with('.')
        && !prefix.contains(char::is_whitespace)
}
