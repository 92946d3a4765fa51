use std::fs;
use std::io;
use std::path::Path;

use cast_logging::{cast_debug, cast_warn};
use serde::Deserialize;

/// Placeholder shipped in the sample config; treated as no key at all.
const KEY_PLACEHOLDER: &str = "YOUR_API_KEY_HERE";

/// Runner configuration, loaded once at process start.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunnerConfig {
    #[serde(default)]
    pub api_key: Option<String>,
}

impl RunnerConfig {
    /// Loads the optional JSON config file. Absence is normal; a malformed
    /// file is logged and ignored.
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                cast_debug!("No config at {:?}; using per-request secrets", path);
                return Self::default();
            }
            Err(err) => {
                cast_warn!("Failed to read config from {:?}: {}", path, err);
                return Self::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(config) => {
                cast_debug!("Loaded config from {:?}", path);
                config
            }
            Err(err) => {
                cast_warn!("Failed to parse config from {:?}: {}", path, err);
                Self::default()
            }
        }
    }

    /// The preconfigured key, if set and not the sample placeholder.
    pub fn configured_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty() && *key != KEY_PLACEHOLDER)
    }

    /// Resolves the credential for one start request. The preconfigured key
    /// takes precedence over the per-request secret.
    pub fn resolve_key(&self, passed: Option<&str>) -> Option<String> {
        self.configured_key()
            .or(passed.filter(|secret| !secret.is_empty()))
            .map(str::to_string)
    }
}
