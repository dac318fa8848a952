//! # nxdc-cli — NeXus Data Converter Command-Line Interface
//!
//! Provides the `nxdc` binary over the schema engine.
//!
//! ## Subcommands
//!
//! - `nxdc validate` — Validate a JSON or YAML data dictionary against an
//!   application definition.
//! - `nxdc template` — Print the paths an application definition declares,
//!   grouped by requiredness.
//!
//! ```bash
//! nxdc --definitions ./definitions validate --nxdl NXmpes data.json
//! nxdc template --nxdl NXmpes --required-only
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers return exit codes.
//! - Handler functions delegate to `nxdc-schema`; no validation logic here.

pub mod config;
pub mod template;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::config::CliConfig;

/// Definitions root used when neither flag, environment nor config file
/// names one.
pub const DEFAULT_DEFINITIONS_DIR: &str = "definitions";

/// Resolve a path that may be relative to `base`.
///
/// If the path is absolute, returns it as-is. If relative and it exists
/// relative to `base`, uses that. Otherwise returns the path relative to
/// the current directory.
pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let base_relative = base.join(path);
    if base_relative.exists() {
        base_relative
    } else {
        path.to_path_buf()
    }
}

/// Pick the definitions root: the `--definitions` flag (which clap also
/// fills from `NEXUS_DEF_PATH`), then the config file, then
/// `./definitions`.
pub fn resolve_definitions_root(flag: Option<&Path>, config: &CliConfig) -> PathBuf {
    flag.map(Path::to_path_buf)
        .or_else(|| config.definitions.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DEFINITIONS_DIR))
}

/// Pick the application definition: the `--nxdl` flag, then the config
/// file.
pub fn resolve_nxdl(flag: Option<&str>, config: &CliConfig) -> Result<String> {
    match flag.map(str::to_string).or_else(|| config.nxdl.clone()) {
        Some(name) => Ok(name),
        None => bail!("no application definition given: pass --nxdl or set `nxdl` in the config file"),
    }
}
