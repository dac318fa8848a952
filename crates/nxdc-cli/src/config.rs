//! # CLI Configuration File
//!
//! Optional YAML settings read from `--config <FILE>`, or from `nxdc.yaml`
//! in the working directory when no flag is given:
//!
//! ```yaml
//! definitions: ../nexus_definitions
//! nxdl: NXmpes
//! ```
//!
//! Command-line flags and environment variables take precedence over the
//! file. Unknown keys are rejected so a misspelt setting is not silently
//! ignored.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "nxdc.yaml";

/// Settings from the YAML config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Root of a NeXus definitions checkout.
    #[serde(default)]
    pub definitions: Option<PathBuf>,

    /// Default application definition, e.g. `NXmpes`.
    #[serde(default)]
    pub nxdl: Option<String>,
}

impl CliConfig {
    /// Load the config named on the command line, or `nxdc.yaml` from the
    /// working directory if it exists, or defaults.
    ///
    /// Relative `definitions` paths are resolved against the config file's
    /// directory.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.is_file() {
                    return Ok(Self::default());
                }
                fallback
            }
        };
        Self::from_file(&path)
    }

    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let mut config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        if let (Some(definitions), Some(dir)) = (&config.definitions, path.parent()) {
            config.definitions = Some(crate::resolve_path(definitions, dir));
        }
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }
}
