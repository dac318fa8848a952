//! # Validate Subcommand
//!
//! Validates one data dictionary against an application definition:
//!
//! ```bash
//! nxdc validate --nxdl NXmpes data.json
//! ```
//!
//! The definition is loaded from the definitions root, its template is
//! generated, and the data dictionary (`.json`, or `.yaml`/`.yml`) is
//! checked against it. Prints `OK: <file>` or `FAIL: <file> — <reason>`.
//!
//! Exit codes: 0 valid, 1 invalid. Operational failures (unreadable files,
//! unknown definitions, broken base classes) are returned as errors and
//! exit with 2.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use nxdc_core::Template;
use nxdc_schema::{declared_template, generate_template, DefinitionsDir, TemplateValidator, ValidationError};

use crate::config::CliConfig;
use crate::resolve_nxdl;

/// Arguments for the `nxdc validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Application definition to validate against, e.g. NXmpes.
    #[arg(long)]
    pub nxdl: Option<String>,

    /// Data dictionary to validate (.json, .yaml or .yml).
    #[arg(value_name = "DATA")]
    pub data: PathBuf,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 on success, 1 on validation failure.
pub fn run_validate(args: &ValidateArgs, definitions_root: &Path, config: &CliConfig) -> Result<u8> {
    let nxdl = resolve_nxdl(args.nxdl.as_deref(), config)?;
    let library = DefinitionsDir::new(definitions_root).with_context(|| {
        format!("failed to open definitions root {}", definitions_root.display())
    })?;
    let definition = library
        .load_definition(&nxdl)
        .with_context(|| format!("failed to load application definition {nxdl}"))?;
    let schema_template = declared_template(&generate_template(&definition))
        .context("failed to build schema template")?;
    let data = load_data_dictionary(&args.data)?;

    tracing::info!(
        definition = %nxdl,
        declared = schema_template.len(),
        entries = data.len(),
        "validating data dictionary"
    );

    match TemplateValidator::new(&definition, &library).validate(&schema_template, &data) {
        Ok(_) => {
            println!("OK: {}", args.data.display());
            Ok(0)
        }
        Err(ValidationError::Schema(e)) => Err(e).context("failed to load a base class"),
        Err(e) => {
            println!("FAIL: {} — {}", args.data.display(), e);
            Ok(1)
        }
    }
}

/// Read a data dictionary from JSON, or from YAML when the extension is
/// `.yaml` or `.yml`.
pub fn load_data_dictionary(path: &Path) -> Result<Template> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read data dictionary {}", path.display()))?;
    let document: serde_json::Value = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse YAML in {}", path.display()))?,
        _ => serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON in {}", path.display()))?,
    };
    Template::from_json(&document)
        .with_context(|| format!("invalid data dictionary {}", path.display()))
}
